mod common;

use common::*;
use ddns_core::config::DdnsConfig;
use ddns_core::traits::{AddressResolver, RecordUpdater, UpdateTarget};
use ddns_core::{Address, MemoryStateStore, ReconciliationLoop};
use ddns_relay::{RelayState, RelayUpdater, router};
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn target(api_token: &str, names: &[&str]) -> UpdateTarget {
    UpdateTarget::new(
        api_token,
        "zone-1",
        "rec-1",
        "A",
        names.iter().map(|name| name.to_string()).collect(),
    )
}

fn address() -> Address {
    Address::parse("203.0.113.5").unwrap()
}

struct StaticResolver(&'static str);

#[async_trait::async_trait]
impl AddressResolver for StaticResolver {
    async fn resolve(&self) -> ddns_core::Result<Address> {
        Address::parse(self.0)
    }

    fn resolver_name(&self) -> &'static str {
        "static"
    }
}

#[tokio::test]
async fn test_success_carries_relay_credentials_and_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update-dns"))
        .and(query_param("client_id", "2"))
        .and(query_param("client_key", "relay-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "DNS record updated successfully for home.example.com",
            "data": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updater = RelayUpdater::new(&server.uri(), 2, "relay-key", TIMEOUT).unwrap();
    let outcome = updater
        .apply(&target("cf-token", &["home.example.com"]), "home.example.com", &address())
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.provider_status, Some(200));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "api_token": "cf-token",
            "zone_id": "zone-1",
            "record_id": "rec-1",
            "type": "A",
            "name": "home.example.com",
            "content": "203.0.113.5",
            "ttl": 1,
            "proxied": false
        })
    );
}

#[tokio::test]
async fn test_relay_reported_failure_is_failed_outcome() {
    let error_body = r#"{"success":false,"message":"Failed to update DNS record for home.example.com","error":{"errors":[{"code":9109}]}}"#;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string(error_body))
        .mount(&server)
        .await;

    let updater = RelayUpdater::new(&server.uri(), 0, "k0", TIMEOUT).unwrap();
    let outcome = updater
        .apply(&target("cf-token", &["home.example.com"]), "home.example.com", &address())
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.provider_status, Some(400));
    assert_eq!(outcome.message, error_body, "raw relay body preserved");
}

#[tokio::test]
async fn test_success_false_with_200_is_failed_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "upstream refused"
        })))
        .mount(&server)
        .await;

    let updater = RelayUpdater::new(&server.uri(), 0, "k0", TIMEOUT).unwrap();
    let outcome = updater
        .apply(&target("cf-token", &["a.example.com"]), "a.example.com", &address())
        .await;

    assert!(!outcome.success);
}

#[tokio::test]
async fn test_transport_failure_hides_client_key() {
    // Nothing listens on the discard port
    let updater = RelayUpdater::new("http://127.0.0.1:9", 0, "relay-secret", TIMEOUT).unwrap();
    let outcome = updater
        .apply(&target("cf-token", &["a.example.com"]), "a.example.com", &address())
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.provider_status, None);
    assert!(!outcome.message.contains("relay-secret"));
}

#[tokio::test]
async fn test_each_relay_request_carries_one_target_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update-dns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "ok"
        })))
        .expect(3)
        .mount(&server)
        .await;

    let config = DdnsConfig::from_json(&format!(
        r#"{{
            "resolver": {{ "url": "https://ip.example.net/" }},
            "updater": {{ "type": "relay", "url": "{}", "client_id": 0, "client_key": "k0" }},
            "state_store": {{ "type": "memory" }},
            "targets": [
                {{ "api_token": "token-a", "zone_id": "zone-a", "record_id": "rec-a",
                   "record_type": "A", "domain_names": "a1.example.com,a2.example.com" }},
                {{ "api_token": "token-b", "zone_id": "zone-b", "record_id": "rec-b",
                   "record_type": "A", "domain_names": ["b1.example.com"] }}
            ]
        }}"#,
        server.uri()
    ))
    .unwrap();

    let updater = RelayUpdater::from_config(&config.updater).unwrap();
    let (engine, _event_rx) = ReconciliationLoop::new(
        Box::new(StaticResolver("198.51.100.2")),
        Box::new(updater),
        Box::new(MemoryStateStore::new()),
        config,
    )
    .unwrap();

    let report = engine.run_cycle().await;
    assert!(report.all_succeeded());
    assert!(report.persisted);

    let observed: Vec<(String, String, String)> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            (
                body["api_token"].as_str().unwrap().to_string(),
                body["zone_id"].as_str().unwrap().to_string(),
                body["name"].as_str().unwrap().to_string(),
            )
        })
        .collect();

    let expected = [
        ("token-a", "zone-a", "a1.example.com"),
        ("token-a", "zone-a", "a2.example.com"),
        ("token-b", "zone-b", "b1.example.com"),
    ];
    assert_eq!(observed.len(), expected.len());
    for ((token, zone, name), (exp_token, exp_zone, exp_name)) in observed.iter().zip(expected) {
        assert_eq!(token, exp_token);
        assert_eq!(zone, exp_zone);
        assert_eq!(name, exp_name);
    }
}

async fn spawn_relay(
    provider: std::sync::Arc<CountingProvider>,
) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let app = router(RelayState::new(vec!["k0".to_string()], provider));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    (addr, shutdown_tx)
}

#[tokio::test]
async fn test_end_to_end_through_relay_service() {
    let provider = CountingProvider::answering(200, r#"{"success":true}"#);
    let (addr, shutdown_tx) = spawn_relay(provider.clone()).await;

    let updater = RelayUpdater::new(&format!("http://{}", addr), 0, "k0", TIMEOUT).unwrap();
    let outcome = updater
        .apply(&target("cf-token", &["home.example.com"]), "home.example.com", &address())
        .await;

    assert!(outcome.success);
    assert_eq!(
        outcome.message,
        "DNS record updated successfully for home.example.com"
    );
    assert_eq!(provider.call_count(), 1);
    assert_eq!(provider.seen()[0].api_token, "cf-token");

    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn test_end_to_end_wrong_relay_key() {
    let provider = CountingProvider::answering(200, "{}");
    let (addr, shutdown_tx) = spawn_relay(provider.clone()).await;

    let updater = RelayUpdater::new(&format!("http://{}", addr), 0, "wrong", TIMEOUT).unwrap();
    let outcome = updater
        .apply(&target("cf-token", &["home.example.com"]), "home.example.com", &address())
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.provider_status, Some(400));
    assert!(outcome.message.contains("Invalid client_key"));
    assert_eq!(provider.call_count(), 0);

    let _ = shutdown_tx.send(());
}
