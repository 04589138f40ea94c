//! Address book download from `/api/v1/network/nodes`

use hiero_primitives::AccountId;
use serde::Deserialize;
use tracing::debug;

use super::rest_base_url;
use crate::network::NodeAddress;
use crate::{Client, SdkError, SdkResult};

/// Plaintext gRPC port of consensus nodes
const NODE_PORT: u16 = 50211;

/// Upper bound on followed pages
const MAX_PAGES: usize = 64;

#[derive(Debug, Deserialize)]
struct NodesPage {
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    node_account_id: String,
    #[serde(default)]
    service_endpoints: Vec<ServiceEndpoint>,
}

#[derive(Debug, Deserialize)]
struct ServiceEndpoint {
    #[serde(default)]
    ip_address_v4: String,
    #[serde(default)]
    domain_name: String,
    port: u16,
}

impl ServiceEndpoint {
    fn host(&self) -> Option<&str> {
        if !self.domain_name.is_empty() {
            Some(&self.domain_name)
        } else if !self.ip_address_v4.is_empty() {
            Some(&self.ip_address_v4)
        } else {
            None
        }
    }
}

impl NodeEntry {
    /// The plaintext endpoint, falling back to the first usable one
    fn address(&self) -> SdkResult<Option<NodeAddress>> {
        let account_id: AccountId = self.node_account_id.parse()?;
        let endpoint = self
            .service_endpoints
            .iter()
            .find(|e| e.port == NODE_PORT && e.host().is_some())
            .or_else(|| self.service_endpoints.iter().find(|e| e.host().is_some()));
        Ok(endpoint.and_then(|e| {
            e.host().map(|host| NodeAddress::new(account_id, format!("{}:{}", host, e.port)))
        }))
    }
}

fn parse_page(page: NodesPage, entries: &mut Vec<NodeAddress>) -> SdkResult<Option<String>> {
    for node in &page.nodes {
        match node.address()? {
            Some(address) => entries.push(address),
            None => debug!(node = %node.node_account_id, "node has no usable service endpoint"),
        }
    }
    Ok(page.links.next.filter(|next| !next.is_empty()))
}

/// Fetch every page of the mirror node's address book
pub(crate) async fn fetch_address_book(client: &Client) -> SdkResult<Vec<NodeAddress>> {
    let base = rest_base_url(&client.mirror()?);
    let mut url = format!("{}/api/v1/network/nodes", base);
    let mut entries = Vec::new();

    for _ in 0..MAX_PAGES {
        debug!(url = %url, "fetching address book page");
        let response = client.http().get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SdkError::MirrorRequest(format!("address book request returned {}", status)));
        }
        let page: NodesPage = response.json().await?;
        match parse_page(page, &mut entries)? {
            Some(next) if next.starts_with("http://") || next.starts_with("https://") => url = next,
            Some(next) => url = format!("{}{}", base, next),
            None => return Ok(entries),
        }
    }
    Err(SdkError::MirrorRequest(format!("address book has more than {} pages", MAX_PAGES)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_prefers_plaintext_port() {
        let page: NodesPage = serde_json::from_str(
            r#"{
                "nodes": [
                    {
                        "node_account_id": "0.0.3",
                        "service_endpoints": [
                            {"ip_address_v4": "10.0.0.1", "port": 50212, "domain_name": ""},
                            {"ip_address_v4": "10.0.0.1", "port": 50211, "domain_name": ""}
                        ]
                    },
                    {
                        "node_account_id": "0.0.4",
                        "service_endpoints": [
                            {"ip_address_v4": "", "port": 50211, "domain_name": "node4.example.com"}
                        ]
                    },
                    {"node_account_id": "0.0.5", "service_endpoints": []}
                ],
                "links": {"next": "/api/v1/network/nodes?node.id=gt:2"}
            }"#,
        )
        .unwrap();

        let mut entries = Vec::new();
        let next = parse_page(page, &mut entries).unwrap();
        assert_eq!(next.as_deref(), Some("/api/v1/network/nodes?node.id=gt:2"));
        assert_eq!(
            entries,
            vec![
                NodeAddress::new(AccountId::from_num(3), "10.0.0.1:50211"),
                NodeAddress::new(AccountId::from_num(4), "node4.example.com:50211"),
            ]
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page: NodesPage = serde_json::from_str(r#"{"nodes": [], "links": {"next": null}}"#).unwrap();
        assert_eq!(parse_page(page, &mut Vec::new()).unwrap(), None);
    }

    #[test]
    fn test_bad_account_id_rejected() {
        let page: NodesPage =
            serde_json::from_str(r#"{"nodes": [{"node_account_id": "three", "service_endpoints": []}]}"#).unwrap();
        assert!(parse_page(page, &mut Vec::new()).is_err());
    }
}
