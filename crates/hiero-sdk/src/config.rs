//! Client configuration
//!
//! A [`ClientConfig`] can be built in code, or loaded from a TOML or JSON
//! document:
//!
//! ```toml
//! network = "testnet"
//! max_attempts = 5
//!
//! [operator]
//! account_id = "0.0.1001"
//! private_key = "302e020100300506032b657004220420..."
//! ```
//!
//! `network` is either a well-known name or a table of `endpoint = "account id"`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use hiero_primitives::{AccountId, Hbar};
use serde::{Deserialize, Serialize};

use crate::{SdkError, SdkResult};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Consensus nodes: a network name or an endpoint map
    #[serde(default = "default_network")]
    pub network: NetworkSpec,
    /// Mirror node hosts; defaults to the named network's mirror
    #[serde(default)]
    pub mirror_network: Option<Vec<String>>,
    /// Account paying for transactions, and its key
    #[serde(default)]
    pub operator: Option<OperatorConfig>,
    /// Overall deadline of one execute, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Attempts before an execute gives up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// First node backoff, in milliseconds
    #[serde(default = "default_min_backoff_ms")]
    pub min_backoff_ms: u64,
    /// Node backoff ceiling, in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Address book refresh period in seconds, 0 disables
    #[serde(default = "default_network_update_period_secs")]
    pub network_update_period_secs: u64,
    /// Max fee of transactions that set none, in tinybars
    #[serde(default = "default_max_transaction_fee_tinybars")]
    pub default_max_transaction_fee_tinybars: i64,
    /// Nodes each transaction is signed for; a third of the network when unset
    #[serde(default)]
    pub max_nodes_per_transaction: Option<usize>,
}

/// Consensus node set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkSpec {
    /// `mainnet`, `testnet`, `previewnet` or `local`
    Named(String),
    /// Endpoint to node account id
    Custom(BTreeMap<String, AccountId>),
}

/// Operator account and key
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Operator account
    pub account_id: AccountId,
    /// DER or raw hex private key
    pub private_key: String,
}

impl fmt::Debug for OperatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorConfig")
            .field("account_id", &self.account_id)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

fn default_network() -> NetworkSpec {
    NetworkSpec::Named("testnet".to_string())
}

fn default_request_timeout_ms() -> u64 {
    120_000
}

fn default_max_attempts() -> usize {
    10
}

fn default_min_backoff_ms() -> u64 {
    250
}

fn default_max_backoff_ms() -> u64 {
    8_000
}

fn default_network_update_period_secs() -> u64 {
    24 * 60 * 60
}

fn default_max_transaction_fee_tinybars() -> i64 {
    Hbar::new(2).to_tinybars()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            mirror_network: None,
            operator: None,
            request_timeout_ms: default_request_timeout_ms(),
            max_attempts: default_max_attempts(),
            min_backoff_ms: default_min_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            network_update_period_secs: default_network_update_period_secs(),
            default_max_transaction_fee_tinybars: default_max_transaction_fee_tinybars(),
            max_nodes_per_transaction: None,
        }
    }
}

impl ClientConfig {
    /// Config for a custom node map with no mirror
    pub fn for_network(nodes: impl IntoIterator<Item = (String, AccountId)>) -> Self {
        Self {
            network: NetworkSpec::Custom(nodes.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Config for a well-known network
    pub fn for_name(name: &str) -> SdkResult<Self> {
        named_network(name)?;
        Ok(Self {
            network: NetworkSpec::Named(name.to_string()),
            ..Self::default()
        })
    }

    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(s: &str) -> SdkResult<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing JSON for `.json` and TOML otherwise
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Save as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> SdkResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SdkError::Config(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Check value ranges
    pub fn validate(&self) -> SdkResult<()> {
        if self.max_attempts == 0 {
            return Err(SdkError::Config("max_attempts must be at least 1".to_string()));
        }
        if self.min_backoff_ms > self.max_backoff_ms {
            return Err(SdkError::Config("min_backoff_ms exceeds max_backoff_ms".to_string()));
        }
        if self.max_nodes_per_transaction == Some(0) {
            return Err(SdkError::Config(
                "max_nodes_per_transaction must be at least 1".to_string(),
            ));
        }
        self.nodes().map(|_| ())
    }

    /// Resolved consensus node list
    pub fn nodes(&self) -> SdkResult<Vec<(String, AccountId)>> {
        match &self.network {
            NetworkSpec::Named(name) => Ok(named_network(name)?.nodes),
            NetworkSpec::Custom(map) => {
                if map.is_empty() {
                    return Err(SdkError::Config("network is empty".to_string()));
                }
                Ok(map.iter().map(|(endpoint, id)| (endpoint.clone(), *id)).collect())
            }
        }
    }

    /// Resolved mirror host list
    pub fn mirrors(&self) -> SdkResult<Vec<String>> {
        if let Some(mirrors) = &self.mirror_network {
            return Ok(mirrors.clone());
        }
        match &self.network {
            NetworkSpec::Named(name) => Ok(named_network(name)?.mirrors),
            NetworkSpec::Custom(_) => Ok(Vec::new()),
        }
    }

    /// Request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Minimum node backoff
    pub fn min_backoff(&self) -> Duration {
        Duration::from_millis(self.min_backoff_ms)
    }

    /// Maximum node backoff
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Address book refresh period, `None` when disabled
    pub fn network_update_period(&self) -> Option<Duration> {
        match self.network_update_period_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

struct NamedNetwork {
    nodes: Vec<(String, AccountId)>,
    mirrors: Vec<String>,
}

fn named_network(name: &str) -> SdkResult<NamedNetwork> {
    let (nodes, mirror): (&[(&str, u64)], &str) = match name {
        "mainnet" => (
            &[
                ("35.237.200.180:50211", 3),
                ("35.186.191.247:50211", 4),
                ("35.192.2.25:50211", 5),
                ("35.199.161.108:50211", 6),
                ("35.203.82.240:50211", 7),
            ],
            "mainnet-public.mirrornode.hedera.com:443",
        ),
        "testnet" => (
            &[
                ("0.testnet.hedera.com:50211", 3),
                ("1.testnet.hedera.com:50211", 4),
                ("2.testnet.hedera.com:50211", 5),
                ("3.testnet.hedera.com:50211", 6),
            ],
            "testnet.mirrornode.hedera.com:443",
        ),
        "previewnet" => (
            &[
                ("0.previewnet.hedera.com:50211", 3),
                ("1.previewnet.hedera.com:50211", 4),
                ("2.previewnet.hedera.com:50211", 5),
                ("3.previewnet.hedera.com:50211", 6),
            ],
            "previewnet.mirrornode.hedera.com:443",
        ),
        "local" | "localhost" => (&[("127.0.0.1:50211", 3)], "127.0.0.1:5600"),
        other => return Err(SdkError::Config(format!("unknown network name: {}", other))),
    };

    Ok(NamedNetwork {
        nodes: nodes
            .iter()
            .map(|(endpoint, num)| (endpoint.to_string(), AccountId::from_num(*num)))
            .collect(),
        mirrors: vec![mirror.to_string()],
    })
}
