//! Account balance lookup

use hiero_primitives::{AccountId, Hbar, TransactionId};
use hiero_proto as proto;

use crate::execute::{self, Budget, Execute, ExecuteOptions};
use crate::transport::{NodeRequest, NodeResponse};
use crate::{Client, SdkError, SdkResult, Status, StatusClass};

/// Balance of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalance {
    /// Account looked up
    pub account_id: AccountId,
    /// Balance
    pub hbars: Hbar,
}

/// Free query for an account's hbar balance
#[derive(Debug, Clone, Default)]
pub struct AccountBalanceQuery {
    account_id: Option<AccountId>,
    node_account_ids: Option<Vec<AccountId>>,
}

impl AccountBalanceQuery {
    /// Create a balance query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the account to look up
    pub fn account_id(mut self, id: AccountId) -> Self {
        self.account_id = Some(id);
        self
    }

    /// Restrict the query to these nodes
    pub fn node_account_ids(mut self, ids: Vec<AccountId>) -> Self {
        self.node_account_ids = Some(ids);
        self
    }

    /// Run the query
    pub async fn execute(&self, client: &Client) -> SdkResult<AccountBalance> {
        self.execute_with(client, ExecuteOptions::default()).await
    }

    /// Run the query with explicit options
    pub async fn execute_with(&self, client: &Client, options: ExecuteOptions) -> SdkResult<AccountBalance> {
        if self.account_id.is_none() {
            return Err(SdkError::MissingField("account_id"));
        }
        let budget = Budget::new(client, &options);
        execute::execute(client, self, &budget).await
    }
}

impl Execute for AccountBalanceQuery {
    type Output = AccountBalance;

    fn node_account_ids(&self) -> Option<&[AccountId]> {
        self.node_account_ids.as_deref()
    }

    fn transaction_id(&self) -> Option<TransactionId> {
        None
    }

    fn make_request(&self, _node: AccountId) -> SdkResult<NodeRequest> {
        let query = proto::CryptoGetAccountBalanceQuery {
            header: Some(proto::QueryHeader::default()),
            account_id: self.account_id.map(Into::into),
        };
        Ok(NodeRequest::Query {
            method: proto::services::CRYPTO_GET_BALANCE,
            query: proto::Query { query: Some(proto::query::Query::CryptogetAccountBalance(query)) },
        })
    }

    fn classify(&self, response: &NodeResponse) -> SdkResult<(Status, StatusClass)> {
        let NodeResponse::Query(response) = response else {
            return Err(SdkError::Decode("expected a balance response".into()));
        };
        let status = response
            .header()
            .map_or(Status::Ok, |h| Status::from_code(h.node_transaction_precheck_code));
        Ok((status, status.precheck_class()))
    }

    fn make_output(&self, response: NodeResponse, _node: AccountId) -> SdkResult<AccountBalance> {
        let NodeResponse::Query(proto::Response {
            response: Some(proto::response::Response::CryptogetAccountBalance(response)),
        }) = response
        else {
            return Err(SdkError::Decode("expected a balance response".into()));
        };
        let account_id = match response.account_id {
            Some(id) => AccountId::try_from(id)?,
            None => self.account_id.ok_or(SdkError::MissingField("account_id"))?,
        };
        Ok(AccountBalance { account_id, hbars: Hbar::from_tinybars(response.balance as i64) })
    }
}
