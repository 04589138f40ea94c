//! Account creation

use std::time::Duration;

use hiero_crypto::PublicKey;
use hiero_primitives::Hbar;
use hiero_proto::{self as proto, transaction_body::Data};

use crate::key::{duration_from_proto, duration_to_proto, key_from_proto, key_to_proto};
use crate::transaction::{ChunkInfo, Transaction, TransactionData};
use crate::{SdkError, SdkResult};

/// Default auto-renew period of a new account (90 days)
const DEFAULT_AUTO_RENEW_PERIOD: Duration = Duration::from_secs(90 * 24 * 60 * 60);

/// Creates a new account
pub type AccountCreateTransaction = Transaction<AccountCreateTransactionData>;

/// Data of an [`AccountCreateTransaction`]
#[derive(Debug, Clone, PartialEq)]
pub struct AccountCreateTransactionData {
    key: Option<PublicKey>,
    initial_balance: Hbar,
    receiver_signature_required: bool,
    auto_renew_period: Duration,
    account_memo: String,
    max_automatic_token_associations: i32,
}

impl Default for AccountCreateTransactionData {
    fn default() -> Self {
        Self {
            key: None,
            initial_balance: Hbar::ZERO,
            receiver_signature_required: false,
            auto_renew_period: DEFAULT_AUTO_RENEW_PERIOD,
            account_memo: String::new(),
            max_automatic_token_associations: 0,
        }
    }
}

impl TransactionData for AccountCreateTransactionData {
    fn method(&self) -> &'static str {
        proto::services::CRYPTO_CREATE_ACCOUNT
    }

    fn to_body_data(&self, _chunk: Option<&ChunkInfo>) -> Data {
        Data::CryptoCreateAccount(proto::CryptoCreateTransactionBody {
            key: self.key.as_ref().map(key_to_proto),
            initial_balance: self.initial_balance.to_tinybars().max(0) as u64,
            receiver_sig_required: self.receiver_signature_required,
            auto_renew_period: Some(duration_to_proto(self.auto_renew_period)),
            memo: self.account_memo.clone(),
            max_automatic_token_associations: self.max_automatic_token_associations,
        })
    }

    fn from_body_data(data: Data) -> SdkResult<Self> {
        let Data::CryptoCreateAccount(body) = data else {
            return Err(SdkError::Decode("expected an account create body".into()));
        };
        Ok(Self {
            key: body.key.map(key_from_proto).transpose()?,
            initial_balance: Hbar::from_tinybars(body.initial_balance as i64),
            receiver_signature_required: body.receiver_sig_required,
            auto_renew_period: body.auto_renew_period.map_or(DEFAULT_AUTO_RENEW_PERIOD, duration_from_proto),
            account_memo: body.memo,
            max_automatic_token_associations: body.max_automatic_token_associations,
        })
    }

    fn validate(&self) -> SdkResult<()> {
        if self.key.is_none() {
            return Err(SdkError::MissingField("key"));
        }
        Ok(())
    }
}

impl AccountCreateTransactionData {
    /// Key of the new account
    pub fn key(&self) -> Option<&PublicKey> {
        self.key.as_ref()
    }

    /// Initial balance moved from the payer
    pub fn initial_balance(&self) -> Hbar {
        self.initial_balance
    }

    /// Whether transfers into the account need its signature
    pub fn receiver_signature_required(&self) -> bool {
        self.receiver_signature_required
    }

    /// Auto-renew period
    pub fn auto_renew_period(&self) -> Duration {
        self.auto_renew_period
    }

    /// Account memo
    pub fn account_memo(&self) -> &str {
        &self.account_memo
    }
}

impl Transaction<AccountCreateTransactionData> {
    /// Set the key of the new account
    pub fn set_key(&mut self, key: PublicKey) -> SdkResult<&mut Self> {
        self.data_mut()?.key = Some(key);
        Ok(self)
    }

    /// Set the initial balance
    pub fn set_initial_balance(&mut self, balance: Hbar) -> SdkResult<&mut Self> {
        if balance < Hbar::ZERO {
            return Err(SdkError::InvalidArgument("initial balance cannot be negative".into()));
        }
        self.data_mut()?.initial_balance = balance;
        Ok(self)
    }

    /// Require the account's signature on incoming transfers
    pub fn set_receiver_signature_required(&mut self, required: bool) -> SdkResult<&mut Self> {
        self.data_mut()?.receiver_signature_required = required;
        Ok(self)
    }

    /// Set the auto-renew period
    pub fn set_auto_renew_period(&mut self, period: Duration) -> SdkResult<&mut Self> {
        self.data_mut()?.auto_renew_period = period;
        Ok(self)
    }

    /// Set the account memo
    pub fn set_account_memo(&mut self, memo: impl Into<String>) -> SdkResult<&mut Self> {
        self.data_mut()?.account_memo = memo.into();
        Ok(self)
    }

    /// Set how many tokens the account associates automatically
    pub fn set_max_automatic_token_associations(&mut self, max: i32) -> SdkResult<&mut Self> {
        self.data_mut()?.max_automatic_token_associations = max;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiero_crypto::PrivateKey;
    use hiero_primitives::{AccountId, TransactionId};

    #[test]
    fn test_key_required() {
        let mut tx = AccountCreateTransaction::new();
        tx.set_node_account_ids(vec![AccountId::from_num(3)])
            .unwrap()
            .set_transaction_id(TransactionId::generate(AccountId::from_num(2)))
            .unwrap();
        assert!(matches!(tx.freeze(), Err(SdkError::MissingField("key"))));
    }

    #[test]
    fn test_body_roundtrip() {
        let key = PrivateKey::generate_ecdsa().public_key();
        let mut tx = AccountCreateTransaction::new();
        tx.set_key(key)
            .unwrap()
            .set_initial_balance(Hbar::new(10))
            .unwrap()
            .set_account_memo("savings")
            .unwrap();

        let data = AccountCreateTransactionData::from_body_data(tx.data().to_body_data(None)).unwrap();
        assert_eq!(&data, tx.data());
        assert_eq!(data.key(), Some(&key));
        assert_eq!(data.initial_balance(), Hbar::new(10));
    }

    #[test]
    fn test_negative_balance_rejected() {
        let mut tx = AccountCreateTransaction::new();
        assert!(tx.set_initial_balance(Hbar::new(-1)).is_err());
    }
}
