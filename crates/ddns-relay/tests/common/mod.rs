//! Shared test doubles for relay tests

#![allow(dead_code)]

use ddns_core::traits::{DnsProvider, ProviderResponse, RecordUpdate};
use ddns_core::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A DnsProvider stub that counts calls and answers with a fixed response
pub struct CountingProvider {
    call_count: AtomicUsize,
    seen: Mutex<Vec<RecordUpdate>>,
    answer: Option<(u16, String)>,
}

impl CountingProvider {
    /// Answer every call with `status` and `body`
    pub fn answering(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            call_count: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            answer: Some((status, body.to_string())),
        })
    }

    /// Fail every call at the transport level
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            call_count: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            answer: None,
        })
    }

    /// Get the number of times update_record() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every update received, in order
    pub fn seen(&self) -> Vec<RecordUpdate> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for CountingProvider {
    async fn update_record(&self, update: &RecordUpdate) -> Result<ProviderResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(update.clone());

        match &self.answer {
            Some((status, body)) => Ok(ProviderResponse {
                status: *status,
                body: body.clone(),
            }),
            None => Err(Error::http("operation timed out")),
        }
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }
}

/// A valid update body
pub fn update_body() -> serde_json::Value {
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
}
