//! Topic creation

use std::time::Duration;

use hiero_crypto::PublicKey;
use hiero_primitives::AccountId;
use hiero_proto::{self as proto, transaction_body::Data};

use crate::key::{duration_from_proto, duration_to_proto, key_from_proto, key_to_proto};
use crate::transaction::{ChunkInfo, Transaction, TransactionData};
use crate::{SdkError, SdkResult};

/// Default auto-renew period of a new topic (90 days)
const DEFAULT_AUTO_RENEW_PERIOD: Duration = Duration::from_secs(90 * 24 * 60 * 60);

/// Creates a consensus topic
pub type TopicCreateTransaction = Transaction<TopicCreateTransactionData>;

/// Data of a [`TopicCreateTransaction`]
#[derive(Debug, Clone, PartialEq)]
pub struct TopicCreateTransactionData {
    topic_memo: String,
    admin_key: Option<PublicKey>,
    submit_key: Option<PublicKey>,
    auto_renew_period: Duration,
    auto_renew_account_id: Option<AccountId>,
}

impl Default for TopicCreateTransactionData {
    fn default() -> Self {
        Self {
            topic_memo: String::new(),
            admin_key: None,
            submit_key: None,
            auto_renew_period: DEFAULT_AUTO_RENEW_PERIOD,
            auto_renew_account_id: None,
        }
    }
}

impl TopicCreateTransactionData {
    /// Topic memo
    pub fn topic_memo(&self) -> &str {
        &self.topic_memo
    }

    /// Key allowed to update or delete the topic
    pub fn admin_key(&self) -> Option<&PublicKey> {
        self.admin_key.as_ref()
    }

    /// Key required on message submissions
    pub fn submit_key(&self) -> Option<&PublicKey> {
        self.submit_key.as_ref()
    }

    /// Auto-renew period
    pub fn auto_renew_period(&self) -> Duration {
        self.auto_renew_period
    }

    /// Account charged for auto-renewal
    pub fn auto_renew_account_id(&self) -> Option<AccountId> {
        self.auto_renew_account_id
    }
}

impl TransactionData for TopicCreateTransactionData {
    fn method(&self) -> &'static str {
        proto::services::CONSENSUS_CREATE_TOPIC
    }

    fn to_body_data(&self, _chunk: Option<&ChunkInfo>) -> Data {
        Data::ConsensusCreateTopic(proto::ConsensusCreateTopicTransactionBody {
            memo: self.topic_memo.clone(),
            admin_key: self.admin_key.as_ref().map(key_to_proto),
            submit_key: self.submit_key.as_ref().map(key_to_proto),
            auto_renew_period: Some(duration_to_proto(self.auto_renew_period)),
            auto_renew_account: self.auto_renew_account_id.map(Into::into),
        })
    }

    fn from_body_data(data: Data) -> SdkResult<Self> {
        let Data::ConsensusCreateTopic(body) = data else {
            return Err(SdkError::Decode("expected a topic create body".into()));
        };
        Ok(Self {
            topic_memo: body.memo,
            admin_key: body.admin_key.map(key_from_proto).transpose()?,
            submit_key: body.submit_key.map(key_from_proto).transpose()?,
            auto_renew_period: body.auto_renew_period.map_or(DEFAULT_AUTO_RENEW_PERIOD, duration_from_proto),
            auto_renew_account_id: body.auto_renew_account.map(AccountId::try_from).transpose()?,
        })
    }
}

impl Transaction<TopicCreateTransactionData> {
    /// Set the topic memo
    pub fn set_topic_memo(&mut self, memo: impl Into<String>) -> SdkResult<&mut Self> {
        self.data_mut()?.topic_memo = memo.into();
        Ok(self)
    }

    /// Set the admin key
    pub fn set_admin_key(&mut self, key: PublicKey) -> SdkResult<&mut Self> {
        self.data_mut()?.admin_key = Some(key);
        Ok(self)
    }

    /// Set the submit key
    pub fn set_submit_key(&mut self, key: PublicKey) -> SdkResult<&mut Self> {
        self.data_mut()?.submit_key = Some(key);
        Ok(self)
    }

    /// Set the auto-renew period
    pub fn set_auto_renew_period(&mut self, period: Duration) -> SdkResult<&mut Self> {
        self.data_mut()?.auto_renew_period = period;
        Ok(self)
    }

    /// Set the account charged for auto-renewal
    pub fn set_auto_renew_account_id(&mut self, id: AccountId) -> SdkResult<&mut Self> {
        self.data_mut()?.auto_renew_account_id = Some(id);
        Ok(self)
    }
}
