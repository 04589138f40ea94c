//! Submitting frozen transactions, one chunk at a time

use hiero_primitives::{AccountId, TransactionId};
use tracing::{debug, trace};

use super::{Transaction, TransactionData, TransactionHash};
use crate::execute::{self, Budget, Execute, ExecuteOptions};
use crate::receipt::TransactionResponse;
use crate::transport::{NodeRequest, NodeResponse};
use crate::{Client, SdkError, SdkResult, Status, StatusClass};

/// One chunk of a frozen transaction, as seen by the attempt loop
struct ChunkSubmission<'a, D> {
    transaction: &'a Transaction<D>,
    chunk: usize,
}

impl<D: TransactionData> ChunkSubmission<'_, D> {
    fn frozen(&self) -> SdkResult<&super::FrozenState> {
        self.transaction.frozen_state()
    }
}

impl<D: TransactionData> Execute for ChunkSubmission<'_, D> {
    type Output = TransactionResponse;

    fn node_account_ids(&self) -> Option<&[AccountId]> {
        self.transaction.node_account_ids()
    }

    fn transaction_id(&self) -> Option<TransactionId> {
        self.frozen().ok()?.transaction_ids.get(self.chunk).copied()
    }

    fn make_request(&self, node: AccountId) -> SdkResult<NodeRequest> {
        let entry = self
            .frozen()?
            .entry(self.chunk, node)
            .ok_or_else(|| SdkError::InvalidArgument(format!("transaction was not frozen for node {}", node)))?;
        let transaction = match &entry.cached {
            Some(cached) => {
                trace!(node = %node, chunk = self.chunk, "signed payload cache hit");
                cached.clone()
            }
            None => entry.to_proto(),
        };
        Ok(NodeRequest::Transaction { method: self.transaction.data.method(), transaction })
    }

    fn classify(&self, response: &NodeResponse) -> SdkResult<(Status, StatusClass)> {
        match response {
            NodeResponse::Transaction(response) => {
                let status = Status::from_code(response.node_transaction_precheck_code);
                Ok((status, status.precheck_class()))
            }
            NodeResponse::Query(_) => {
                Err(SdkError::Transport("query response to a transaction submission".into()))
            }
        }
    }

    fn make_output(&self, _response: NodeResponse, node: AccountId) -> SdkResult<TransactionResponse> {
        let frozen = self.frozen()?;
        let entry = frozen
            .entry(self.chunk, node)
            .ok_or_else(|| SdkError::InvalidArgument(format!("transaction was not frozen for node {}", node)))?;
        Ok(TransactionResponse {
            node_account_id: node,
            transaction_id: frozen.transaction_ids[self.chunk],
            transaction_hash: TransactionHash::of(&entry.signed_transaction_bytes()),
            validate_status: true,
        })
    }
}

impl<D: TransactionData> Transaction<D> {
    /// Submit the transaction
    ///
    /// Freezes with `client` if needed and signs with the operator when it is
    /// the payer. For a chunked payload every chunk is submitted and the
    /// response of the first chunk is returned.
    pub async fn execute(&mut self, client: &Client) -> SdkResult<TransactionResponse> {
        self.execute_with(client, ExecuteOptions::default()).await
    }

    /// Submit with explicit deadline, cancellation and attempt budget
    pub async fn execute_with(
        &mut self,
        client: &Client,
        options: ExecuteOptions,
    ) -> SdkResult<TransactionResponse> {
        let responses = self.execute_all_with(client, options).await?;
        responses.into_iter().next().ok_or(SdkError::NetworkExhausted { attempts: 0 })
    }

    /// Submit every chunk, returning one response per chunk
    pub async fn execute_all(&mut self, client: &Client) -> SdkResult<Vec<TransactionResponse>> {
        self.execute_all_with(client, ExecuteOptions::default()).await
    }

    /// Submit every chunk with explicit options
    pub async fn execute_all_with(
        &mut self,
        client: &Client,
        options: ExecuteOptions,
    ) -> SdkResult<Vec<TransactionResponse>> {
        self.freeze_with(client)?;
        self.sign_with_operator(client)?;

        let budget = Budget::new(client, &options);
        let result = self.submit_chunks(client, &budget).await;
        if let Some(frozen) = self.frozen.as_mut() {
            frozen.current_chunk = 0;
        }
        result
    }

    /// Submit, then hand the outcome to `callback`
    pub async fn execute_with_callback<F>(&mut self, client: &Client, callback: F)
    where
        F: FnOnce(SdkResult<TransactionResponse>),
    {
        callback(self.execute(client).await);
    }

    async fn submit_chunks(&mut self, client: &Client, budget: &Budget) -> SdkResult<Vec<TransactionResponse>> {
        let total = self.frozen_state()?.chunk_count();
        let wait_for_receipts = self.data.chunk_data().map_or(false, |chunks| chunks.should_get_receipt);

        let mut responses = Vec::with_capacity(total);
        for chunk in 0..total {
            budget.check()?;
            self.prepare_chunk(chunk)?;

            let submission = ChunkSubmission { transaction: &*self, chunk };
            let response = execute::execute(client, &submission, budget).await?;
            debug!(
                transaction_id = %response.transaction_id,
                node = %response.node_account_id,
                chunk = chunk + 1,
                total,
                "chunk accepted"
            );

            if wait_for_receipts {
                response.get_receipt_query().execute_with_budget(client, budget).await?;
            }
            responses.push(response);
        }
        Ok(responses)
    }

    /// Mark `chunk` current and encode its envelopes
    fn prepare_chunk(&mut self, chunk: usize) -> SdkResult<()> {
        let frozen = self.frozen.as_mut().ok_or(SdkError::NotFrozen)?;
        frozen.current_chunk = chunk;
        let nodes = frozen.node_account_ids.len();
        for entry in &mut frozen.entries[chunk * nodes..(chunk + 1) * nodes] {
            if entry.cached.is_none() {
                entry.cached = Some(entry.to_proto());
            }
        }
        Ok(())
    }
}
