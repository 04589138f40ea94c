//! Fee estimation through `/api/v1/network/fees`

use std::fmt;
use std::time::Duration;

use hiero_proto::Message;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::rest_base_url;
use crate::transaction::{Transaction, TransactionData};
use crate::{Client, SdkError, SdkResult};

const RETRY_BASE: Duration = Duration::from_millis(250);
const RETRY_CAP: Duration = Duration::from_secs(8);

/// State the estimate is computed against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FeeEstimateMode {
    /// Use the current ledger state
    #[default]
    State,
    /// Ignore state-dependent costs
    Transient,
}

impl FeeEstimateMode {
    /// Query-string value
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeEstimateMode::State => "STATE",
            FeeEstimateMode::Transient => "TRANSIENT",
        }
    }
}

impl fmt::Display for FeeEstimateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named surcharge on top of a base fee
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeExtra {
    /// Amount in tinybars
    pub amount: u64,
    /// What the surcharge is for
    pub description: String,
}

/// A base fee plus extras, in tinybars
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeEstimate {
    /// Base amount
    pub base: u64,
    /// Surcharges
    pub extras: Vec<FeeExtra>,
}

impl FeeEstimate {
    /// Base plus every extra
    pub fn subtotal(&self) -> u64 {
        self.extras.iter().fold(self.base, |sum, extra| sum.saturating_add(extra.amount))
    }

    fn absorb(&mut self, other: FeeEstimate) {
        self.base = self.base.saturating_add(other.base);
        self.extras.extend(other.extras);
    }
}

/// Network component of the fee
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkFee {
    /// Multiplier applied to the node fee
    pub multiplier: f64,
    /// Resulting amount in tinybars
    pub subtotal: u64,
}

/// Mirror node fee estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeeEstimateResponse {
    /// Fee paid to the submitting node
    pub node_fee: FeeEstimate,
    /// Fee for the service itself
    pub service_fee: FeeEstimate,
    /// Fee paid to the network
    pub network_fee: NetworkFee,
    /// Total in tinybars
    pub total: u64,
    /// Diagnostics
    pub notes: Vec<String>,
}

impl FeeEstimateResponse {
    /// Fold the estimate of another chunk into this one
    fn absorb(&mut self, other: FeeEstimateResponse) {
        self.node_fee.absorb(other.node_fee);
        self.service_fee.absorb(other.service_fee);
        self.network_fee.subtotal = self.network_fee.subtotal.saturating_add(other.network_fee.subtotal);
        if self.network_fee.multiplier == 0.0 {
            self.network_fee.multiplier = other.network_fee.multiplier;
        }
        self.total = self.total.saturating_add(other.total);
        self.notes.extend(other.notes);
    }
}

/// Asks a mirror node what a transaction would cost
#[derive(Debug, Clone, Default)]
pub struct FeeEstimateQuery {
    mode: FeeEstimateMode,
    max_attempts: Option<usize>,
}

impl FeeEstimateQuery {
    /// Create a fee estimate query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the estimate mode
    pub fn mode(mut self, mode: FeeEstimateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the attempt budget (defaults to the client setting)
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Estimate the fee of `transaction`, freezing it with `client` if needed
    ///
    /// Every chunk of a chunked transaction is estimated and the results summed.
    pub async fn execute<D: TransactionData>(
        &self,
        client: &Client,
        transaction: &mut Transaction<D>,
    ) -> SdkResult<FeeEstimateResponse> {
        let url = format!(
            "{}/api/v1/network/fees?mode={}",
            rest_base_url(&client.mirror()?),
            self.mode
        );
        transaction.freeze_with(client)?;

        let bodies: Vec<Vec<u8>> = {
            let frozen = transaction.frozen_state()?;
            (0..frozen.chunk_count())
                .filter_map(|chunk| frozen.chunk_entries(chunk).first())
                .map(|entry| entry.to_proto().encode_to_vec())
                .collect()
        };

        let mut total = FeeEstimateResponse::default();
        for body in bodies {
            total.absorb(self.post(client, &url, body).await?);
        }
        Ok(total)
    }

    async fn post(&self, client: &Client, url: &str, body: Vec<u8>) -> SdkResult<FeeEstimateResponse> {
        let max_attempts = self.max_attempts.unwrap_or_else(|| client.max_attempts()).max(1);
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            if attempt > 0 {
                tokio::time::sleep(retry_delay(attempt - 1)).await;
            }
            let result = client
                .http()
                .post(url)
                .header(CONTENT_TYPE, "application/protobuf")
                .body(body.clone())
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(err) => {
                    warn!(attempt, error = %err, "fee estimate request failed");
                    last_error = err.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                debug!(attempt, "fee estimate received");
                return Ok(response.json().await?);
            }
            let text = response.text().await.unwrap_or_default();
            if !should_retry(status) {
                return Err(SdkError::MirrorRequest(format!("fee estimate returned {}: {}", status, text)));
            }
            warn!(attempt, %status, "fee estimate rejected, retrying");
            last_error = format!("status {}", status);
        }

        Err(SdkError::MirrorRequest(format!(
            "fee estimate failed after {} attempts: {}",
            max_attempts, last_error
        )))
    }
}

fn should_retry(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// 250 ms doubling per attempt, capped at 8 s
fn retry_delay(attempt: usize) -> Duration {
    RETRY_BASE.saturating_mul(1u32 << attempt.min(16)).min(RETRY_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay() {
        assert_eq!(retry_delay(0), Duration::from_millis(250));
        assert_eq!(retry_delay(1), Duration::from_millis(500));
        assert_eq!(retry_delay(5), Duration::from_secs(8));
        assert_eq!(retry_delay(40), Duration::from_secs(8));
    }

    #[test]
    fn test_should_retry() {
        assert!(should_retry(StatusCode::SERVICE_UNAVAILABLE));
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(!should_retry(StatusCode::BAD_REQUEST));
        assert!(!should_retry(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_response_parsing() {
        let response: FeeEstimateResponse = serde_json::from_str(
            r#"{
                "nodeFee": {"base": 100, "extras": [{"amount": 5, "description": "bytes"}]},
                "serviceFee": {"base": 200},
                "networkFee": {"multiplier": 9.0, "subtotal": 945},
                "total": 1250,
                "notes": ["estimated"]
            }"#,
        )
        .unwrap();
        assert_eq!(response.node_fee.subtotal(), 105);
        assert_eq!(response.service_fee.extras, vec![]);
        assert_eq!(response.network_fee.subtotal, 945);
        assert_eq!(response.total, 1250);
        assert_eq!(response.notes, vec!["estimated".to_string()]);
    }

    #[test]
    fn test_chunk_estimates_are_summed() {
        let chunk = FeeEstimateResponse {
            node_fee: FeeEstimate { base: 10, extras: vec![] },
            service_fee: FeeEstimate { base: 20, extras: vec![] },
            network_fee: NetworkFee { multiplier: 2.0, subtotal: 20 },
            total: 50,
            notes: vec!["chunk".into()],
        };
        let mut total = FeeEstimateResponse::default();
        total.absorb(chunk.clone());
        total.absorb(chunk);
        assert_eq!(total.total, 100);
        assert_eq!(total.node_fee.base, 20);
        assert_eq!(total.network_fee.multiplier, 2.0);
        assert_eq!(total.notes.len(), 2);
    }

    #[test]
    fn test_mode_strings() {
        assert_eq!(FeeEstimateMode::default().to_string(), "STATE");
        assert_eq!(FeeEstimateMode::Transient.as_str(), "TRANSIENT");
    }
}
