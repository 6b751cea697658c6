//! Relay HTTP service
//!
//! ## Request Flow (`POST /update-dns`)
//!
//! 1. Authenticate `client_id`/`client_key` against the allow-list
//! 2. Parse and validate the update body
//! 3. Call the provider with the credential carried in the body
//! 4. Translate the provider answer into a [`RelayResponse`]
//!
//! Steps 1 and 2 reject before any provider call. The provider credential is
//! never stored; it lives for the duration of one request.
//!
//! ## Concurrency
//!
//! Requests are independent. The only shared state is the read-only
//! allow-list and the provider client.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use ddns_core::traits::DnsProvider;
use serde_json::json;
use subtle::ConstantTimeEq;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::error::{RelayError, Result};
use crate::wire::{ClientAuth, RelayResponse, UpdateDnsPayload};

/// Service name reported by `/` and `/health`
pub const SERVICE_NAME: &str = "cloudflare-dns-proxy";

/// Shared, read-only relay state
#[derive(Clone)]
pub struct RelayState {
    /// Client keys; the index is the client id
    clients: Arc<[String]>,

    /// Provider used for every update
    provider: Arc<dyn DnsProvider>,
}

impl RelayState {
    pub fn new(clients: Vec<String>, provider: Arc<dyn DnsProvider>) -> Self {
        Self {
            clients: clients.into(),
            provider,
        }
    }

    /// Number of allow-list entries
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Check the caller's id/key; returns the client index
    pub fn authenticate(&self, auth: &ClientAuth) -> Result<usize> {
        let (Some(id), Some(key)) = (auth.client_id.as_deref(), auth.client_key.as_deref()) else {
            return Err(RelayError::Authentication("Missing client_id or client_key"));
        };
        if id.is_empty() || key.is_empty() {
            return Err(RelayError::Authentication("Missing client_id or client_key"));
        }

        let index: usize = id
            .parse()
            .map_err(|_| RelayError::Authentication("Invalid client_id"))?;
        let expected = self
            .clients
            .get(index)
            .ok_or(RelayError::Authentication("Invalid client_id"))?;

        if bool::from(expected.as_bytes().ct_eq(key.as_bytes())) {
            Ok(index)
        } else {
            Err(RelayError::Authentication("Invalid client_key"))
        }
    }
}

/// Build the relay router
pub fn router(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(describe))
        .route("/health", get(health))
        .route(
            "/update-dns",
            post(update_dns)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

async fn update_dns(
    State(state): State<RelayState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Bytes,
) -> Result<(StatusCode, Json<RelayResponse>)> {
    let auth = match query {
        Ok(Query(pairs)) => ClientAuth::from_query_pairs(pairs),
        Err(e) => {
            debug!("Unparseable query string: {}", e);
            ClientAuth::default()
        }
    };
    let client = state.authenticate(&auth).inspect_err(|e| {
        warn!("Rejected relay request (client_id={:?}): {}", auth.client_id, e);
    })?;

    let payload: UpdateDnsPayload =
        serde_json::from_slice(&body).map_err(|_| RelayError::InvalidJson)?;
    let update = payload
        .into_record_update()
        .map_err(RelayError::MissingFields)?;

    debug!(
        "Client {} updating {} ({}) to {}",
        client, update.name, update.record_type, update.content
    );

    let response = state.provider.update_record(&update).await.map_err(|e| {
        warn!("Provider call for {} failed: {}", update.name, e);
        RelayError::Internal(e.to_string())
    })?;

    if response.is_success() {
        info!("Client {} updated {} to {}", client, update.name, update.content);
        let data = serde_json::from_str(&response.body).ok();
        Ok((StatusCode::OK, Json(RelayResponse::updated(&update.name, data))))
    } else {
        warn!(
            "{} rejected update for {} from client {}: {}",
            state.provider.provider_name(),
            update.name,
            client,
            response.status
        );
        Ok((
            StatusCode::BAD_REQUEST,
            Json(RelayResponse::rejected(&update.name, response.body_json())),
        ))
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn describe() -> Json<serde_json::Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "endpoints": {
            "health": "/health",
            "update_dns": "/update-dns",
        },
        "usage": "Send POST request to /update-dns with DNS data and client authentication",
    }))
}
