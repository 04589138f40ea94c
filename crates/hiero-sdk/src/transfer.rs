//! Hbar transfers

use hiero_primitives::{AccountId, Hbar};
use hiero_proto::{self as proto, transaction_body::Data};

use crate::transaction::{ChunkInfo, Transaction, TransactionData};
use crate::{SdkError, SdkResult};

/// Moves hbar between accounts
pub type TransferTransaction = Transaction<TransferTransactionData>;

/// One account's side of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HbarTransfer {
    /// Account whose balance changes
    pub account_id: AccountId,
    /// Signed change
    pub amount: Hbar,
    /// Whether an allowance is spent
    pub is_approval: bool,
}

/// Data of a [`TransferTransaction`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferTransactionData {
    transfers: Vec<HbarTransfer>,
}

impl TransferTransactionData {
    /// Transfers in insertion order
    pub fn hbar_transfers(&self) -> &[HbarTransfer] {
        &self.transfers
    }

    fn add(&mut self, account_id: AccountId, amount: Hbar, is_approval: bool) {
        match self
            .transfers
            .iter_mut()
            .find(|t| t.account_id == account_id && t.is_approval == is_approval)
        {
            Some(existing) => existing.amount = existing.amount + amount,
            None => self.transfers.push(HbarTransfer { account_id, amount, is_approval }),
        }
    }
}

impl TransactionData for TransferTransactionData {
    fn method(&self) -> &'static str {
        proto::services::CRYPTO_TRANSFER
    }

    fn to_body_data(&self, _chunk: Option<&ChunkInfo>) -> Data {
        let account_amounts = self
            .transfers
            .iter()
            .map(|t| proto::AccountAmount {
                account_id: Some(t.account_id.into()),
                amount: t.amount.to_tinybars(),
                is_approval: t.is_approval,
            })
            .collect();
        Data::CryptoTransfer(proto::CryptoTransferTransactionBody {
            transfers: Some(proto::TransferList { account_amounts }),
        })
    }

    fn from_body_data(data: Data) -> SdkResult<Self> {
        let Data::CryptoTransfer(body) = data else {
            return Err(SdkError::Decode("expected a crypto transfer body".into()));
        };
        let transfers = body
            .transfers
            .map(|list| list.account_amounts)
            .unwrap_or_default()
            .into_iter()
            .map(|amount| {
                let account_id = amount
                    .account_id
                    .ok_or(SdkError::Decode("account amount has no account id".into()))?;
                Ok(HbarTransfer {
                    account_id: AccountId::try_from(account_id)?,
                    amount: Hbar::from_tinybars(amount.amount),
                    is_approval: amount.is_approval,
                })
            })
            .collect::<SdkResult<Vec<_>>>()?;
        Ok(Self { transfers })
    }

    fn validate(&self) -> SdkResult<()> {
        let sum: i64 = self.transfers.iter().map(|t| t.amount.to_tinybars()).sum();
        if sum != 0 {
            return Err(SdkError::InvalidArgument(format!("transfers sum to {} tinybars, not zero", sum)));
        }
        Ok(())
    }
}

impl Transaction<TransferTransactionData> {
    /// Add `amount` to `account_id`; repeated accounts are merged
    pub fn add_hbar_transfer(&mut self, account_id: AccountId, amount: Hbar) -> SdkResult<&mut Self> {
        self.data_mut()?.add(account_id, amount, false);
        Ok(self)
    }

    /// Add a transfer that spends an allowance granted to the payer
    pub fn add_approved_hbar_transfer(&mut self, account_id: AccountId, amount: Hbar) -> SdkResult<&mut Self> {
        self.data_mut()?.add(account_id, amount, true);
        Ok(self)
    }

    /// Transfers in insertion order
    pub fn hbar_transfers(&self) -> &[HbarTransfer] {
        self.data().hbar_transfers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfers_merge_per_account() {
        let mut tx = TransferTransaction::new();
        tx.add_hbar_transfer(AccountId::from_num(2), Hbar::new(-3))
            .unwrap()
            .add_hbar_transfer(AccountId::from_num(1001), Hbar::new(3))
            .unwrap()
            .add_hbar_transfer(AccountId::from_num(2), Hbar::new(-1))
            .unwrap()
            .add_hbar_transfer(AccountId::from_num(1002), Hbar::new(1))
            .unwrap();

        let transfers = tx.hbar_transfers();
        assert_eq!(transfers.len(), 3);
        assert_eq!(transfers[0].account_id, AccountId::from_num(2));
        assert_eq!(transfers[0].amount, Hbar::new(-4));
    }

    #[test]
    fn test_unbalanced_transfers_rejected() {
        let mut data = TransferTransactionData::default();
        data.add(AccountId::from_num(2), Hbar::new(-1), false);
        assert!(matches!(data.validate(), Err(SdkError::InvalidArgument(_))));
        data.add(AccountId::from_num(3), Hbar::new(1), false);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_body_roundtrip() {
        let mut data = TransferTransactionData::default();
        data.add(AccountId::from_num(2), Hbar::from_tinybars(-10), false);
        data.add(AccountId::from_num(7), Hbar::from_tinybars(10), true);
        let restored = TransferTransactionData::from_body_data(data.to_body_data(None)).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_wrong_body_rejected() {
        let data = Data::FileAppend(proto::FileAppendTransactionBody::default());
        assert!(matches!(TransferTransactionData::from_body_data(data), Err(SdkError::Decode(_))));
    }
}
