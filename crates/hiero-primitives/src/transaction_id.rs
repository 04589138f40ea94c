//! Transaction identifiers

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use hiero_proto as proto;

use crate::{AccountId, PrimitiveError, Timestamp};

/// How far generated valid starts lie in the past, absorbing clock skew
/// between the client and the nodes.
const VALID_START_BACKDATE: Duration = Duration::from_secs(5);

/// Last generated valid start, in nanoseconds since the epoch
static LAST_VALID_START: AtomicI64 = AtomicI64::new(0);

/// A transaction identifier: the payer plus the start of the validity window
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId {
    /// Account paying the fee
    pub account_id: AccountId,
    /// Start of the validity window
    pub valid_start: Timestamp,
    /// Whether this refers to a scheduled transaction
    pub scheduled: bool,
    /// Child transaction nonce
    pub nonce: i32,
}

impl TransactionId {
    /// Create an identifier with an explicit valid start
    pub fn with_valid_start(account_id: AccountId, valid_start: Timestamp) -> Self {
        Self { account_id, valid_start, scheduled: false, nonce: 0 }
    }

    /// Generate a fresh identifier for a payer
    ///
    /// The valid start is backdated from the wall clock and strictly increases
    /// across calls in this process, so two generated ids never collide.
    pub fn generate(account_id: AccountId) -> Self {
        let candidate = Timestamp::now().minus(VALID_START_BACKDATE).unix_nanos();
        let mut last = LAST_VALID_START.load(Ordering::Relaxed);
        let nanos = loop {
            let next = candidate.max(last + 1);
            match LAST_VALID_START.compare_exchange_weak(
                last,
                next,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => break next,
                Err(current) => last = current,
            }
        };
        Self::with_valid_start(account_id, Timestamp::from_unix_nanos(nanos))
    }

    /// The identifier `ticks` nanoseconds after this one, same payer
    pub fn plus_ticks(&self, ticks: i64) -> Self {
        Self { valid_start: self.valid_start.plus_nanos(ticks), ..*self }
    }
}

impl From<TransactionId> for proto::TransactionId {
    fn from(id: TransactionId) -> Self {
        proto::TransactionId {
            transaction_valid_start: Some(id.valid_start.into()),
            account_id: Some(id.account_id.into()),
            scheduled: id.scheduled,
            nonce: id.nonce,
        }
    }
}

impl TryFrom<proto::TransactionId> for TransactionId {
    type Error = PrimitiveError;

    fn try_from(id: proto::TransactionId) -> Result<Self, Self::Error> {
        let account_id = id
            .account_id
            .ok_or(PrimitiveError::MissingField("TransactionID.accountID"))?
            .try_into()?;
        let valid_start = id
            .transaction_valid_start
            .ok_or(PrimitiveError::MissingField("TransactionID.transactionValidStart"))?
            .try_into()?;
        Ok(Self { account_id, valid_start, scheduled: id.scheduled, nonce: id.nonce })
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account_id, self.valid_start)?;
        if self.scheduled {
            write!(f, "?scheduled")?;
        }
        if self.nonce != 0 {
            write!(f, "/{}", self.nonce)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self)
    }
}

impl FromStr for TransactionId {
    type Err = PrimitiveError;

    /// Parse `shard.realm.num@seconds.nanos[?scheduled][/nonce]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PrimitiveError::InvalidTransactionId(s.to_string());
        let (account, rest) = s.split_once('@').ok_or_else(invalid)?;
        let (rest, nonce) = match rest.split_once('/') {
            Some((rest, nonce)) => (rest, nonce.parse::<i32>().map_err(|_| invalid())?),
            None => (rest, 0),
        };
        let (rest, scheduled) = match rest.strip_suffix("?scheduled") {
            Some(rest) => (rest, true),
            None => (rest, false),
        };
        let (seconds, nanos) = rest.split_once('.').ok_or_else(invalid)?;
        let seconds = seconds.parse::<i64>().map_err(|_| invalid())?;
        if nanos.is_empty() || nanos.len() > 9 {
            return Err(invalid());
        }
        // right-pad so "5.1" means 100ms
        let nanos = format!("{:0<9}", nanos).parse::<u32>().map_err(|_| invalid())?;

        Ok(Self {
            account_id: account.parse()?,
            valid_start: Timestamp::try_new(seconds, nanos)?,
            scheduled,
            nonce,
        })
    }
}
