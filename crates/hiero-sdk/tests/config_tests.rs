//! Configuration loading tests for hiero-sdk

use std::time::Duration;

use hiero_sdk::{AccountId, Client, ClientConfig, Hbar, MockTransport, NetworkSpec, PrivateKey, SdkError};
use mockito::Server;
use tempfile::TempDir;

fn operator_key_hex(key: &PrivateKey) -> String {
    hex::encode(key.to_bytes_raw())
}

// ==================== File Loading ====================

#[test]
fn test_client_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.toml");
    let key = PrivateKey::generate_ed25519();
    std::fs::write(
        &path,
        format!(
            r#"
max_attempts = 4
min_backoff_ms = 100
max_backoff_ms = 1000
network_update_period_secs = 0
default_max_transaction_fee_tinybars = 50000000
max_nodes_per_transaction = 2

[network]
"10.0.0.3:50211" = "0.0.3"
"10.0.0.4:50211" = "0.0.4"
"10.0.0.5:50211" = "0.0.5"

[operator]
account_id = "0.0.1001"
private_key = "{}"
"#,
            operator_key_hex(&key)
        ),
    )
    .unwrap();

    let config = ClientConfig::load(&path).unwrap();
    let client = Client::with_transport(&config, MockTransport::new()).unwrap();

    assert_eq!(client.max_attempts(), 4);
    assert_eq!(client.min_backoff(), Duration::from_millis(100));
    assert_eq!(client.max_backoff(), Duration::from_secs(1));
    assert_eq!(client.default_max_transaction_fee(), Hbar::from_tinybars(50_000_000));
    assert_eq!(client.max_nodes_per_transaction(), Some(2));
    assert_eq!(client.operator_account_id(), Some(AccountId::from_num(1001)));
    assert_eq!(client.operator_public_key(), Some(key.public_key()));
    assert_eq!(client.registry().len(), 3);
    assert_eq!(client.registry().endpoint(AccountId::from_num(4)).as_deref(), Some("10.0.0.4:50211"));
    assert!(client.mirror_network().is_empty());
}

#[test]
fn test_client_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.json");
    std::fs::write(
        &path,
        r#"{
            "network": "testnet",
            "mirror_network": ["mirror.example.com:443"],
            "request_timeout_ms": 30000
        }"#,
    )
    .unwrap();

    let config = ClientConfig::load(&path).unwrap();
    assert_eq!(config.network, NetworkSpec::Named("testnet".into()));
    assert_eq!(config.request_timeout(), Duration::from_secs(30));

    let client = Client::with_transport(&config, MockTransport::new()).unwrap();
    assert_eq!(client.mirror_network(), vec!["mirror.example.com:443".to_string()]);
    assert!(client.registry().len() > 1);
    assert_eq!(client.operator_account_id(), None);
}

#[test]
fn test_save_then_load_keeps_custom_network() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("client.toml");

    let mut config = ClientConfig::for_network(vec![("127.0.0.1:50211".to_string(), AccountId::from_num(3))]);
    config.mirror_network = Some(vec!["127.0.0.1:5600".to_string()]);
    config.max_attempts = 3;
    config.save(&path).unwrap();

    assert_eq!(ClientConfig::load(&path).unwrap(), config);
}

#[test]
fn test_bad_operator_key_rejected() {
    let config = ClientConfig::from_toml_str(
        r#"
network_update_period_secs = 0

[network]
"10.0.0.3:50211" = "0.0.3"

[operator]
account_id = "0.0.1001"
private_key = "not a key"
"#,
    )
    .unwrap();
    assert!(matches!(Client::with_transport(&config, MockTransport::new()), Err(SdkError::Crypto(_))));
}

#[test]
fn test_invalid_values_rejected() {
    assert!(matches!(ClientConfig::from_toml_str("max_attempts = 0"), Err(SdkError::Config(_))));
    assert!(matches!(
        ClientConfig::from_toml_str("min_backoff_ms = 9000\nmax_backoff_ms = 100"),
        Err(SdkError::Config(_))
    ));
    assert!(matches!(ClientConfig::from_toml_str(r#"network = "moonnet""#), Err(SdkError::Config(_))));
    assert!(matches!(
        ClientConfig::load("/nonexistent/hiero/client.toml"),
        Err(SdkError::Config(msg)) if msg.contains("client.toml")
    ));
}

// ==================== Periodic Refresh ====================

#[tokio::test]
async fn test_periodic_address_book_refresh() {
    let mut server = Server::new_async().await;
    let book = server
        .mock("GET", "/api/v1/network/nodes")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "nodes": [{
                    "node_account_id": "0.0.9",
                    "service_endpoints": [{"ip_address_v4": "10.9.0.9", "port": 50211}]
                }],
                "links": {"next": null}
            })
            .to_string(),
        )
        .expect_at_least(1)
        .create_async()
        .await;

    let mut config = ClientConfig::for_network(vec![("10.0.0.3:50211".to_string(), AccountId::from_num(3))]);
    config.mirror_network = Some(vec![server.url()]);
    config.network_update_period_secs = 1;
    let client = Client::with_transport(&config, MockTransport::new()).unwrap();

    for _ in 0..60 {
        if client.registry().endpoint(AccountId::from_num(9)).is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    client.close();

    book.assert_async().await;
    assert_eq!(client.registry().node_account_ids(), vec![AccountId::from_num(9)]);
    assert!(client.is_closed());
}
