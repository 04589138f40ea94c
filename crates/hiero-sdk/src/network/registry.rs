//! Node registry: node identities, endpoints and health

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hiero_primitives::AccountId;
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{SdkError, SdkResult};

/// A consensus node as listed in an address book
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    /// Node account id, the node's identity
    pub account_id: AccountId,
    /// `host:port` of the node's gRPC service
    pub endpoint: String,
}

impl NodeAddress {
    /// Create a node address
    pub fn new(account_id: AccountId, endpoint: impl Into<String>) -> Self {
        Self { account_id, endpoint: endpoint.into() }
    }
}

/// Health state of one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeHealth {
    /// Failures since the last success
    pub consecutive_failures: u32,
    /// Successful submissions
    pub successes: u64,
    /// Failed submissions
    pub failures: u64,
    /// Current backoff interval
    pub backoff: Duration,
    /// Earliest time the node may be tried again
    pub readmit_at: Option<Instant>,
}

impl NodeHealth {
    fn is_healthy(&self, now: Instant) -> bool {
        self.readmit_at.map_or(true, |at| at <= now)
    }
}

struct NodeEntry {
    endpoint: String,
    health: NodeHealth,
}

#[derive(Default)]
struct RegistryState {
    nodes: HashMap<AccountId, NodeEntry>,
    by_endpoint: HashMap<String, AccountId>,
    /// Identities sorted, the base order for round-robin
    order: Vec<AccountId>,
}

impl RegistryState {
    fn from_addresses(addresses: impl IntoIterator<Item = NodeAddress>) -> SdkResult<Self> {
        let mut state = RegistryState::default();
        for address in addresses {
            if address.endpoint.trim().is_empty() {
                return Err(SdkError::InvalidArgument(format!(
                    "node {} has an empty endpoint",
                    address.account_id
                )));
            }
            if let Some(old) = state.nodes.insert(
                address.account_id,
                NodeEntry { endpoint: address.endpoint.clone(), health: NodeHealth::default() },
            ) {
                state.by_endpoint.remove(&old.endpoint);
            }
            state.by_endpoint.insert(address.endpoint, address.account_id);
        }
        state.order = state.nodes.keys().copied().collect();
        state.order.sort();
        Ok(state)
    }
}

/// Node registry shared by every execution of a client
///
/// Every operation takes the lock once, so readers never observe a
/// half-applied address book.
pub struct NodeRegistry {
    state: RwLock<RegistryState>,
    min_backoff: Duration,
    max_backoff: Duration,
    cursor: AtomicUsize,
}

impl NodeRegistry {
    /// Create a registry from a node list
    pub fn new(
        addresses: impl IntoIterator<Item = NodeAddress>,
        min_backoff: Duration,
        max_backoff: Duration,
    ) -> SdkResult<Self> {
        let state = RegistryState::from_addresses(addresses)?;
        if state.nodes.is_empty() {
            return Err(SdkError::InvalidArgument("node registry needs at least one node".into()));
        }
        Ok(Self {
            state: RwLock::new(state),
            min_backoff,
            max_backoff,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Number of known nodes
    pub fn len(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Whether the registry has no nodes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Known node identities, sorted
    pub fn node_account_ids(&self) -> Vec<AccountId> {
        self.state.read().order.clone()
    }

    /// Known nodes, sorted by identity
    pub fn addresses(&self) -> Vec<NodeAddress> {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|id| state.nodes.get(id).map(|n| NodeAddress::new(*id, n.endpoint.clone())))
            .collect()
    }

    /// Endpoint of a node
    pub fn endpoint(&self, id: AccountId) -> Option<String> {
        self.state.read().nodes.get(&id).map(|n| n.endpoint.clone())
    }

    /// Node serving an endpoint
    pub fn node_for_endpoint(&self, endpoint: &str) -> Option<AccountId> {
        self.state.read().by_endpoint.get(endpoint).copied()
    }

    /// Health snapshot of a node
    pub fn health(&self, id: AccountId) -> Option<NodeHealth> {
        self.state.read().nodes.get(&id).map(|n| n.health)
    }

    /// Whether a node is out of backoff
    pub fn is_healthy(&self, id: AccountId) -> bool {
        let now = Instant::now();
        self.state.read().nodes.get(&id).map_or(false, |n| n.health.is_healthy(now))
    }

    /// Earliest retry time of a node still in backoff
    pub fn readmit_at(&self, id: AccountId) -> Option<Instant> {
        let now = Instant::now();
        self.state
            .read()
            .nodes
            .get(&id)
            .and_then(|n| n.health.readmit_at)
            .filter(|at| *at > now)
    }

    /// Number of nodes out of backoff
    pub fn healthy_count(&self) -> usize {
        let now = Instant::now();
        self.state.read().nodes.values().filter(|n| n.health.is_healthy(now)).count()
    }

    /// Pick up to `k` distinct candidates
    ///
    /// Without a preferred list, healthy nodes are returned round-robin across
    /// calls, so every healthy node is handed out once before any is handed out
    /// twice. With a preferred list, only its known members are returned, in
    /// their given order but healthy ones first, then by readmit time.
    pub fn choose_candidates(
        &self,
        k: usize,
        preferred: Option<&[AccountId]>,
    ) -> SdkResult<Vec<AccountId>> {
        let now = Instant::now();
        let state = self.state.read();

        if let Some(preferred) = preferred.filter(|p| !p.is_empty()) {
            let mut known: Vec<(usize, AccountId, Option<Instant>)> = Vec::new();
            for (position, id) in preferred.iter().enumerate() {
                if known.iter().any(|(_, seen, _)| seen == id) {
                    continue;
                }
                if let Some(entry) = state.nodes.get(id) {
                    let ready = entry.health.readmit_at.filter(|at| *at > now);
                    known.push((position, *id, ready));
                }
            }
            if known.is_empty() {
                return Err(SdkError::NoHealthyNodes);
            }
            // None (healthy) sorts before Some(time); ties keep list order
            known.sort_by_key(|(position, _, ready)| (*ready, *position));
            return Ok(known.into_iter().take(k.max(1)).map(|(_, id, _)| id).collect());
        }

        let healthy: Vec<AccountId> = state
            .order
            .iter()
            .copied()
            .filter(|id| state.nodes.get(id).map_or(false, |n| n.health.is_healthy(now)))
            .collect();
        if healthy.is_empty() {
            return Err(SdkError::NoHealthyNodes);
        }

        let take = k.clamp(1, healthy.len());
        let start = self.cursor.fetch_add(take, Ordering::Relaxed) % healthy.len();
        Ok(healthy.iter().cycle().skip(start).take(take).copied().collect())
    }

    /// Record a successful submission: clears backoff
    pub fn record_success(&self, id: AccountId) {
        if let Some(entry) = self.state.write().nodes.get_mut(&id) {
            entry.health.successes += 1;
            entry.health.consecutive_failures = 0;
            entry.health.backoff = Duration::ZERO;
            entry.health.readmit_at = None;
        }
    }

    /// Record a failed submission: doubles backoff up to the ceiling
    pub fn record_failure(&self, id: AccountId) {
        let mut state = self.state.write();
        if let Some(entry) = state.nodes.get_mut(&id) {
            let health = &mut entry.health;
            health.failures += 1;
            health.consecutive_failures = health.consecutive_failures.saturating_add(1);
            health.backoff = self.backoff_for(health.consecutive_failures);
            health.readmit_at = Some(Instant::now() + health.backoff);
            warn!(
                node = %id,
                failures = health.consecutive_failures,
                backoff_ms = health.backoff.as_millis() as u64,
                "node marked unhealthy"
            );
        }
    }

    /// Backoff after `n` consecutive failures: `min(min × 2^(n-1), max)`
    pub fn backoff_for(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return Duration::ZERO;
        }
        let exponent = (consecutive_failures - 1).min(31);
        self.min_backoff
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Swap in a new address book
    ///
    /// Health survives for identities present in both books; removed
    /// identities are dropped and new ones start with no backoff.
    pub fn replace_from_address_book(&self, entries: Vec<NodeAddress>) -> SdkResult<()> {
        let mut next = RegistryState::from_addresses(entries)?;
        if next.nodes.is_empty() {
            return Err(SdkError::InvalidArgument("address book is empty".into()));
        }

        let mut state = self.state.write();
        for (id, entry) in next.nodes.iter_mut() {
            if let Some(old) = state.nodes.get(id) {
                entry.health = old.health;
            }
        }
        let removed = state.nodes.keys().filter(|id| !next.nodes.contains_key(id)).count();
        let added = next.nodes.keys().filter(|id| !state.nodes.contains_key(id)).count();
        *state = next;
        drop(state);

        info!(added, removed, total = self.len(), "address book applied");
        debug!(nodes = ?self.node_account_ids(), "current node set");
        Ok(())
    }
}
