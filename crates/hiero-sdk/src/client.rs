//! Client - shared network context for requests

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use hiero_crypto::{PrivateKey, PublicKey};
use hiero_primitives::{AccountId, Hbar};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::mirror;
use crate::network::{NodeAddress, NodeRegistry};
use crate::transport::{GrpcTransport, Transport};
use crate::{SdkError, SdkResult};

/// Process-wide client used by `freeze()` without an explicit client
static DEFAULT_CLIENT: RwLock<Option<Client>> = parking_lot::const_rwlock(None);

/// The account paying for requests and its signing key
#[derive(Clone)]
pub(crate) struct Operator {
    pub(crate) account_id: AccountId,
    pub(crate) signer: Arc<PrivateKey>,
}

#[derive(Debug, Clone)]
struct ClientSettings {
    request_timeout: Duration,
    max_attempts: usize,
    min_backoff: Duration,
    max_backoff: Duration,
    default_max_transaction_fee: Hbar,
    max_nodes_per_transaction: Option<usize>,
}

struct ClientInner {
    registry: NodeRegistry,
    transport: Arc<dyn Transport>,
    mirrors: RwLock<Vec<String>>,
    operator: RwLock<Option<Operator>>,
    settings: RwLock<ClientSettings>,
    http: reqwest::Client,
    shutdown: CancellationToken,
    refreshing: AtomicBool,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Hiero network client
///
/// Cheap to clone; clones share the node registry, channels and operator.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Create a client over gRPC from a configuration
    pub fn from_config(config: &ClientConfig) -> SdkResult<Self> {
        Self::with_transport(config, GrpcTransport::new())
    }

    /// Create a client with a custom transport
    pub fn with_transport(config: &ClientConfig, transport: impl Transport + 'static) -> SdkResult<Self> {
        config.validate()?;

        let addresses = config
            .nodes()?
            .into_iter()
            .map(|(endpoint, account_id)| NodeAddress::new(account_id, endpoint));
        let registry = NodeRegistry::new(addresses, config.min_backoff(), config.max_backoff())?;

        let operator = match &config.operator {
            Some(op) => Some(Operator {
                account_id: op.account_id,
                signer: Arc::new(PrivateKey::from_str(&op.private_key)?),
            }),
            None => None,
        };

        let settings = ClientSettings {
            request_timeout: config.request_timeout(),
            max_attempts: config.max_attempts,
            min_backoff: config.min_backoff(),
            max_backoff: config.max_backoff(),
            default_max_transaction_fee: Hbar::from_tinybars(
                config.default_max_transaction_fee_tinybars,
            ),
            max_nodes_per_transaction: config.max_nodes_per_transaction,
        };

        let inner = Arc::new(ClientInner {
            registry,
            transport: Arc::new(transport),
            mirrors: RwLock::new(config.mirrors()?),
            operator: RwLock::new(operator),
            settings: RwLock::new(settings),
            http: reqwest::Client::new(),
            shutdown: CancellationToken::new(),
            refreshing: AtomicBool::new(false),
        });

        if let Some(period) = config.network_update_period() {
            if !inner.mirrors.read().is_empty() {
                spawn_network_update(&inner, period);
            }
        }

        Ok(Self { inner })
    }

    /// Client for the public mainnet
    pub fn for_mainnet() -> SdkResult<Self> {
        Self::from_config(&ClientConfig::for_name("mainnet")?)
    }

    /// Client for the public testnet
    pub fn for_testnet() -> SdkResult<Self> {
        Self::from_config(&ClientConfig::for_name("testnet")?)
    }

    /// Client for the public previewnet
    pub fn for_previewnet() -> SdkResult<Self> {
        Self::from_config(&ClientConfig::for_name("previewnet")?)
    }

    /// Client for a custom node map of `(endpoint, node account id)`
    pub fn for_network(nodes: impl IntoIterator<Item = (String, AccountId)>) -> SdkResult<Self> {
        Self::from_config(&ClientConfig::for_network(nodes))
    }

    // ==================== Default client ====================

    /// Install `client` as the process-wide default
    pub fn set_default(client: &Client) {
        *DEFAULT_CLIENT.write() = Some(client.clone());
    }

    /// The process-wide default client
    pub fn default_client() -> Option<Client> {
        DEFAULT_CLIENT.read().clone()
    }

    /// Remove the process-wide default client
    pub fn clear_default() {
        DEFAULT_CLIENT.write().take();
    }

    // ==================== Operator ====================

    /// Set the operator: default payer and signer of every request
    pub fn set_operator(&self, account_id: AccountId, key: PrivateKey) {
        *self.inner.operator.write() = Some(Operator { account_id, signer: Arc::new(key) });
    }

    /// Operator account id
    pub fn operator_account_id(&self) -> Option<AccountId> {
        self.inner.operator.read().as_ref().map(|op| op.account_id)
    }

    /// Operator public key
    pub fn operator_public_key(&self) -> Option<PublicKey> {
        self.inner.operator.read().as_ref().map(|op| op.signer.public_key())
    }

    pub(crate) fn operator(&self) -> Option<Operator> {
        self.inner.operator.read().clone()
    }

    // ==================== Settings ====================

    /// Overall deadline of a request
    pub fn request_timeout(&self) -> Duration {
        self.inner.settings.read().request_timeout
    }

    /// Set the overall deadline of a request
    pub fn set_request_timeout(&self, timeout: Duration) {
        self.inner.settings.write().request_timeout = timeout;
    }

    /// Attempt budget of a request
    pub fn max_attempts(&self) -> usize {
        self.inner.settings.read().max_attempts
    }

    /// Set the attempt budget of a request
    pub fn set_max_attempts(&self, attempts: usize) {
        self.inner.settings.write().max_attempts = attempts.max(1);
    }

    /// Initial backoff between attempts
    pub fn min_backoff(&self) -> Duration {
        self.inner.settings.read().min_backoff
    }

    /// Backoff ceiling
    pub fn max_backoff(&self) -> Duration {
        self.inner.settings.read().max_backoff
    }

    /// Fee ceiling adopted at freeze when a request sets none
    pub fn default_max_transaction_fee(&self) -> Hbar {
        self.inner.settings.read().default_max_transaction_fee
    }

    /// Set the default fee ceiling
    pub fn set_default_max_transaction_fee(&self, fee: Hbar) {
        self.inner.settings.write().default_max_transaction_fee = fee;
    }

    /// Size of the node set adopted at freeze, if fixed
    pub fn max_nodes_per_transaction(&self) -> Option<usize> {
        self.inner.settings.read().max_nodes_per_transaction
    }

    /// Fix the size of the node set adopted at freeze
    pub fn set_max_nodes_per_transaction(&self, nodes: Option<usize>) {
        self.inner.settings.write().max_nodes_per_transaction = nodes;
    }

    // ==================== Network ====================

    /// The node registry
    pub fn registry(&self) -> &NodeRegistry {
        &self.inner.registry
    }

    /// The transport
    pub fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    /// Mirror node endpoints
    pub fn mirror_network(&self) -> Vec<String> {
        self.inner.mirrors.read().clone()
    }

    /// Replace the mirror node endpoints
    pub fn set_mirror_network(&self, mirrors: Vec<String>) {
        *self.inner.mirrors.write() = mirrors;
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// First mirror endpoint
    pub(crate) fn mirror(&self) -> SdkResult<String> {
        self.inner
            .mirrors
            .read()
            .first()
            .cloned()
            .ok_or(SdkError::MissingField("mirror_network"))
    }

    /// Fetch the address book from the mirror network and apply it
    pub async fn refresh_address_book(&self) -> SdkResult<()> {
        let entries = mirror::fetch_address_book(self).await?;
        info!(nodes = entries.len(), "fetched address book");
        self.registry().replace_from_address_book(entries)
    }

    /// Start a background address book refresh unless one is running
    pub(crate) fn trigger_address_book_refresh(&self) {
        if self.inner.mirrors.read().is_empty() {
            debug!("no mirror network, keeping the current node set");
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        if self.inner.refreshing.swap(true, Ordering::SeqCst) {
            return;
        }

        let client = self.clone();
        handle.spawn(async move {
            if let Err(err) = client.refresh_address_book().await {
                warn!(error = %err, "address book refresh failed");
            }
            client.inner.refreshing.store(false, Ordering::SeqCst);
        });
    }

    /// Stop background tasks, including open topic subscriptions
    pub fn close(&self) {
        self.inner.shutdown.cancel();
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Handle that does not keep the client alive
    pub(crate) fn downgrade(&self) -> WeakClient {
        WeakClient { inner: Arc::downgrade(&self.inner), shutdown: self.inner.shutdown.clone() }
    }
}

/// Non-owning client handle for background tasks
#[derive(Clone)]
pub(crate) struct WeakClient {
    inner: Weak<ClientInner>,
    shutdown: CancellationToken,
}

impl WeakClient {
    /// The client, unless every owner has dropped it
    pub(crate) fn upgrade(&self) -> Option<Client> {
        self.inner.upgrade().map(|inner| Client { inner })
    }

    /// Cancelled by `close()` or when the last owner drops the client
    pub(crate) fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("nodes", &self.inner.registry.node_account_ids())
            .field("mirrors", &*self.inner.mirrors.read())
            .field("operator", &self.operator_account_id())
            .finish()
    }
}

/// Refresh the address book every `period` until the client goes away
fn spawn_network_update(inner: &Arc<ClientInner>, period: Duration) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        debug!("no tokio runtime, periodic network update disabled");
        return;
    };
    let weak = WeakClient { inner: Arc::downgrade(inner), shutdown: inner.shutdown.clone() };

    handle.spawn(async move {
        loop {
            tokio::select! {
                _ = weak.shutdown().cancelled() => break,
                _ = tokio::time::sleep(period) => {}
            }
            let Some(client) = weak.upgrade() else { break };
            if let Err(err) = client.refresh_address_book().await {
                warn!(error = %err, "periodic address book refresh failed");
            }
        }
        debug!("network update task stopped");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn config() -> ClientConfig {
        let mut config = ClientConfig::for_network(vec![
            ("10.0.0.1:50211".to_string(), AccountId::from_num(3)),
            ("10.0.0.2:50211".to_string(), AccountId::from_num(4)),
        ]);
        config.network_update_period_secs = 0;
        config
    }

    #[test]
    fn test_client_from_config() {
        let client = Client::with_transport(&config(), MockTransport::new()).unwrap();
        assert_eq!(client.registry().len(), 2);
        assert_eq!(client.max_attempts(), 10);
        assert_eq!(client.request_timeout(), Duration::from_secs(120));
        assert_eq!(client.default_max_transaction_fee(), Hbar::new(2));
        assert!(client.operator_account_id().is_none());
        assert!(client.mirror_network().is_empty());
    }

    #[test]
    fn test_operator_from_config() {
        let key = PrivateKey::generate_ed25519();
        let mut config = config();
        config.operator = Some(crate::config::OperatorConfig {
            account_id: AccountId::from_num(2),
            private_key: hex::encode(key.to_bytes_raw()),
        });
        let client = Client::with_transport(&config, MockTransport::new()).unwrap();
        assert_eq!(client.operator_account_id(), Some(AccountId::from_num(2)));
        assert_eq!(client.operator_public_key(), Some(key.public_key()));
    }

    #[test]
    fn test_invalid_operator_key() {
        let mut config = config();
        config.operator = Some(crate::config::OperatorConfig {
            account_id: AccountId::from_num(2),
            private_key: "not a key".into(),
        });
        assert!(Client::with_transport(&config, MockTransport::new()).is_err());
    }

    #[test]
    fn test_settings_setters() {
        let client = Client::with_transport(&config(), MockTransport::new()).unwrap();
        client.set_max_attempts(0);
        assert_eq!(client.max_attempts(), 1);
        client.set_request_timeout(Duration::from_secs(5));
        assert_eq!(client.request_timeout(), Duration::from_secs(5));
        client.set_max_nodes_per_transaction(Some(2));
        assert_eq!(client.max_nodes_per_transaction(), Some(2));
    }

    #[test]
    fn test_default_client() {
        let client = Client::with_transport(&config(), MockTransport::new()).unwrap();
        Client::set_default(&client);
        assert!(Client::default_client().is_some());
        Client::clear_default();
        assert!(Client::default_client().is_none());
    }

    #[tokio::test]
    async fn test_close_stops_background_work() {
        let mut config = config();
        config.mirror_network = Some(vec!["127.0.0.1:5551".into()]);
        config.network_update_period_secs = 3600;
        let client = Client::with_transport(&config, MockTransport::new()).unwrap();
        assert!(!client.is_closed());
        client.close();
        assert!(client.is_closed());
    }

    #[test]
    fn test_missing_mirror() {
        let client = Client::with_transport(&config(), MockTransport::new()).unwrap();
        assert!(matches!(client.mirror(), Err(SdkError::MissingField("mirror_network"))));
        // no runtime and no mirror: a no-op
        client.trigger_address_book_refresh();
    }
}
