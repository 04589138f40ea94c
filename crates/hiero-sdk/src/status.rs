//! Response status codes and their retry classification

use std::fmt;

macro_rules! statuses {
    ($($variant:ident = $code:literal => $name:literal,)*) => {
        /// Status returned by a node at precheck or in a receipt
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Status {
            $(
                #[doc = $name]
                $variant,
            )*
            /// A code this SDK does not know
            Unrecognized(i32),
        }

        impl Status {
            /// Map a wire code to a status
            pub fn from_code(code: i32) -> Self {
                match code {
                    $($code => Status::$variant,)*
                    other => Status::Unrecognized(other),
                }
            }

            /// The wire code
            pub fn code(self) -> i32 {
                match self {
                    $(Status::$variant => $code,)*
                    Status::Unrecognized(code) => code,
                }
            }

            /// The protocol name, e.g. `INVALID_SIGNATURE`
            pub fn name(self) -> &'static str {
                match self {
                    $(Status::$variant => $name,)*
                    Status::Unrecognized(_) => "UNRECOGNIZED",
                }
            }
        }
    };
}

statuses! {
    Ok = 0 => "OK",
    InvalidTransaction = 1 => "INVALID_TRANSACTION",
    PayerAccountNotFound = 2 => "PAYER_ACCOUNT_NOT_FOUND",
    InvalidNodeAccount = 3 => "INVALID_NODE_ACCOUNT",
    TransactionExpired = 4 => "TRANSACTION_EXPIRED",
    InvalidTransactionStart = 5 => "INVALID_TRANSACTION_START",
    InvalidTransactionDuration = 6 => "INVALID_TRANSACTION_DURATION",
    InvalidSignature = 7 => "INVALID_SIGNATURE",
    MemoTooLong = 8 => "MEMO_TOO_LONG",
    InsufficientTxFee = 9 => "INSUFFICIENT_TX_FEE",
    InsufficientPayerBalance = 10 => "INSUFFICIENT_PAYER_BALANCE",
    DuplicateTransaction = 11 => "DUPLICATE_TRANSACTION",
    Busy = 12 => "BUSY",
    NotSupported = 13 => "NOT_SUPPORTED",
    InvalidFileId = 14 => "INVALID_FILE_ID",
    InvalidAccountId = 15 => "INVALID_ACCOUNT_ID",
    InvalidTransactionId = 17 => "INVALID_TRANSACTION_ID",
    ReceiptNotFound = 18 => "RECEIPT_NOT_FOUND",
    RecordNotFound = 19 => "RECORD_NOT_FOUND",
    Unknown = 21 => "UNKNOWN",
    Success = 22 => "SUCCESS",
    FailInvalid = 23 => "FAIL_INVALID",
    FailFee = 24 => "FAIL_FEE",
    FailBalance = 25 => "FAIL_BALANCE",
    KeyRequired = 26 => "KEY_REQUIRED",
    InsufficientAccountBalance = 28 => "INSUFFICIENT_ACCOUNT_BALANCE",
    InvalidAccountAmounts = 48 => "INVALID_ACCOUNT_AMOUNTS",
    PlatformNotActive = 67 => "PLATFORM_NOT_ACTIVE",
    PlatformTransactionNotCreated = 69 => "PLATFORM_TRANSACTION_NOT_CREATED",
    InvalidTopicId = 150 => "INVALID_TOPIC_ID",
    InvalidTopicMessage = 158 => "INVALID_TOPIC_MESSAGE",
    InvalidChunkNumber = 163 => "INVALID_CHUNK_NUMBER",
    InvalidChunkTransactionId = 164 => "INVALID_CHUNK_TRANSACTION_ID",
}

/// How the execution loop reacts to a status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// Accept the response
    Ok,
    /// Sleep, then retry the same node
    RetryableSameNode,
    /// Penalize the node and move to the next candidate
    RetryableDifferentNode,
    /// Surface the status to the caller
    Terminal,
}

impl Status {
    /// Classification of a precheck status on a submitted request
    pub fn precheck_class(self) -> StatusClass {
        match self {
            Status::Ok => StatusClass::Ok,
            Status::Busy | Status::PlatformNotActive | Status::PlatformTransactionNotCreated => {
                StatusClass::RetryableSameNode
            }
            Status::InvalidNodeAccount => StatusClass::RetryableDifferentNode,
            _ => StatusClass::Terminal,
        }
    }

    /// Classification of a consensus status while polling for a receipt
    pub fn receipt_class(self) -> StatusClass {
        match self {
            Status::Ok
            | Status::Busy
            | Status::Unknown
            | Status::ReceiptNotFound
            | Status::RecordNotFound
            | Status::PlatformNotActive => StatusClass::RetryableSameNode,
            _ => StatusClass::Ok,
        }
    }

    /// Whether the status means the node itself is struggling
    pub fn indicates_unhealthy_node(self) -> bool {
        matches!(
            self,
            Status::Busy
                | Status::PlatformNotActive
                | Status::PlatformTransactionNotCreated
                | Status::InvalidNodeAccount
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unrecognized(code) => write!(f, "UNRECOGNIZED({})", code),
            other => f.write_str(other.name()),
        }
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status::from_code(code)
    }
}
