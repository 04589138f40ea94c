//! The attempt loop shared by every transaction and query

use std::time::Duration;

use hiero_primitives::{AccountId, TransactionId};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::transport::{NodeRequest, NodeResponse};
use crate::{Client, SdkError, SdkResult, Status, StatusClass};

/// Base of the per-attempt gRPC deadline
const ATTEMPT_TIMEOUT_BASE: Duration = Duration::from_secs(2);

/// Per-call execution options
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Overall deadline, measured from the start of the call
    pub timeout: Option<Duration>,
    /// Cancellation signal
    pub cancel: Option<CancellationToken>,
    /// Attempt budget per request
    pub max_attempts: Option<usize>,
}

impl ExecuteOptions {
    /// Options that inherit every client setting
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overall deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the cancellation token
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Set the attempt budget
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

/// Deadline, cancellation and attempt budget of one logical call
///
/// A chunked execution and its receipt polls share one budget.
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    deadline: Instant,
    timeout: Duration,
    cancel: Option<CancellationToken>,
    max_attempts: usize,
}

impl Budget {
    pub(crate) fn new(client: &Client, options: &ExecuteOptions) -> Self {
        let timeout = options.timeout.unwrap_or_else(|| client.request_timeout());
        Self {
            deadline: Instant::now() + timeout,
            timeout,
            cancel: options.cancel.clone(),
            max_attempts: options.max_attempts.unwrap_or_else(|| client.max_attempts()).max(1),
        }
    }

    fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Fail if the call was cancelled or its deadline passed
    pub(crate) fn check(&self) -> SdkResult<()> {
        if self.cancel.as_ref().map_or(false, |c| c.is_cancelled()) {
            return Err(SdkError::Cancelled);
        }
        if self.remaining().is_zero() {
            return Err(SdkError::Timeout(self.timeout));
        }
        Ok(())
    }

    async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }

    /// Sleep until `until` or the deadline, whichever is first
    async fn sleep_until(&self, until: Instant) -> SdkResult<()> {
        let wake = until.min(self.deadline);
        tokio::select! {
            biased;
            _ = self.cancelled() => return Err(SdkError::Cancelled),
            _ = tokio::time::sleep_until(wake) => {}
        }
        self.check()
    }
}

/// A request the attempt loop can drive
pub(crate) trait Execute: Sync {
    /// Result of a successful attempt
    type Output;

    /// Explicit node set; the loop only tries these nodes when present
    fn node_account_ids(&self) -> Option<&[AccountId]>;

    /// Transaction the request refers to, for error reporting
    fn transaction_id(&self) -> Option<TransactionId>;

    /// Build the wire request for one node
    fn make_request(&self, node: AccountId) -> SdkResult<NodeRequest>;

    /// Extract the status of a response and how to react to it
    fn classify(&self, response: &NodeResponse) -> SdkResult<(Status, StatusClass)>;

    /// Turn an accepted response into the output
    fn make_output(&self, response: NodeResponse, node: AccountId) -> SdkResult<Self::Output>;

    /// Error for a terminal status
    fn make_error(&self, status: Status) -> SdkError {
        SdkError::PrecheckFailed { status, transaction_id: self.transaction_id() }
    }
}

fn attempt_timeout(attempt: usize, remaining: Duration) -> Duration {
    let exponent = attempt.min(4) as u32;
    (ATTEMPT_TIMEOUT_BASE * (1 << exponent)).min(remaining)
}

fn same_node_delay(client: &Client, attempt: usize) -> Duration {
    let exponent = attempt.min(31) as u32;
    client
        .min_backoff()
        .checked_mul(1 << exponent)
        .unwrap_or(client.max_backoff())
        .min(client.max_backoff())
}

/// Drive `request` across candidate nodes until it succeeds, fails
/// terminally or runs out of budget
pub(crate) async fn execute<E: Execute>(
    client: &Client,
    request: &E,
    budget: &Budget,
) -> SdkResult<E::Output> {
    let registry = client.registry();
    let mut candidates = match request.node_account_ids() {
        Some(ids) if !ids.is_empty() => registry.choose_candidates(ids.len(), Some(ids)),
        _ => registry.choose_candidates(registry.len(), None),
    }
    .map_err(|_| SdkError::NetworkExhausted { attempts: 0 })?;

    let mut index = 0;
    let mut attempt = 0;
    while attempt < budget.max_attempts {
        budget.check()?;
        if candidates.is_empty() {
            break;
        }
        index %= candidates.len();

        // prefer a candidate out of backoff; wait only when all are in backoff
        if let Some(readmit) = registry.readmit_at(candidates[index]) {
            let healthy = (1..candidates.len())
                .map(|offset| (index + offset) % candidates.len())
                .find(|&i| registry.is_healthy(candidates[i]));
            match healthy {
                Some(i) => index = i,
                None => budget.sleep_until(readmit).await?,
            }
        }

        let node = candidates[index];
        let Some(endpoint) = registry.endpoint(node) else {
            debug!(node = %node, "node left the address book, skipping");
            candidates.remove(index);
            continue;
        };

        let request_message = request.make_request(node)?;
        let sub_deadline = attempt_timeout(attempt, budget.remaining());
        debug!(
            node = %node,
            attempt,
            method = request_message.method(),
            timeout_ms = sub_deadline.as_millis() as u64,
            "sending request"
        );

        let call = client.transport().send(node, &endpoint, request_message);
        let outcome = tokio::select! {
            biased;
            _ = budget.cancelled() => return Err(SdkError::Cancelled),
            outcome = tokio::time::timeout(sub_deadline, call) => outcome,
        };
        attempt += 1;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(node = %node, error = %err, "transport failure");
                registry.record_failure(node);
                index += 1;
                continue;
            }
            Err(_) => {
                warn!(node = %node, timeout_ms = sub_deadline.as_millis() as u64, "attempt timed out");
                registry.record_failure(node);
                index += 1;
                continue;
            }
        };

        let (status, class) = request.classify(&response)?;
        match class {
            StatusClass::Ok => {
                registry.record_success(node);
                return request.make_output(response, node);
            }
            StatusClass::RetryableSameNode => {
                if status.indicates_unhealthy_node() {
                    registry.record_failure(node);
                }
                let mut wake = Instant::now() + same_node_delay(client, attempt - 1);
                if let Some(readmit) = registry.readmit_at(node) {
                    wake = wake.max(readmit);
                }
                debug!(node = %node, %status, "retrying on the same node");
                budget.sleep_until(wake).await?;
            }
            StatusClass::RetryableDifferentNode => {
                warn!(node = %node, %status, "rotating to the next node");
                registry.record_failure(node);
                if status == Status::InvalidNodeAccount {
                    client.trigger_address_book_refresh();
                }
                index += 1;
            }
            StatusClass::Terminal => {
                debug!(node = %node, %status, "terminal status");
                return Err(request.make_error(status));
            }
        }
    }

    budget.check()?;
    Err(SdkError::NetworkExhausted { attempts: attempt })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_timeout_grows_and_caps() {
        let plenty = Duration::from_secs(120);
        assert_eq!(attempt_timeout(0, plenty), Duration::from_secs(2));
        assert_eq!(attempt_timeout(1, plenty), Duration::from_secs(4));
        assert_eq!(attempt_timeout(4, plenty), Duration::from_secs(32));
        assert_eq!(attempt_timeout(9, plenty), Duration::from_secs(32));
        assert_eq!(attempt_timeout(3, Duration::from_millis(300)), Duration::from_millis(300));
    }

    #[test]
    fn test_execute_options_builder() {
        let token = CancellationToken::new();
        let options = ExecuteOptions::new()
            .timeout(Duration::from_secs(1))
            .max_attempts(3)
            .cancel_token(token.clone());
        assert_eq!(options.timeout, Some(Duration::from_secs(1)));
        assert_eq!(options.max_attempts, Some(3));
        token.cancel();
        assert!(options.cancel.unwrap().is_cancelled());
    }
}
