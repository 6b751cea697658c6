//! Test doubles and common utilities for architecture contract tests
//!
//! This module provides minimal test doubles that verify architectural
//! constraints without any network or filesystem access.

#![allow(dead_code)]

use ddns_core::config::{
    DdnsConfig, EngineConfig, Mode, PersistencePolicy, ResolverConfig, StateStoreConfig,
    UpdaterConfig,
};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    AddressResolver, RecordUpdater, StateRecord, StateStore, UpdateOutcome, UpdateTarget,
};
use ddns_core::Address;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An AddressResolver that replays a script of discovery bodies
///
/// `Some(body)` is parsed like a discovery response, `None` is a
/// transport failure. The last entry repeats once the script runs out.
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<Option<String>>>>,
    last: Arc<Mutex<Option<String>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    pub fn new(script: &[Option<&str>]) -> Self {
        Self {
            script: Arc::new(Mutex::new(
                script.iter().map(|s| s.map(str::to_string)).collect(),
            )),
            last: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always resolve to the same body
    pub fn fixed(body: &str) -> Self {
        Self::new(&[Some(body)])
    }

    /// Always fail
    pub fn failing() -> Self {
        Self::new(&[None])
    }

    /// Get the number of times resolve() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new ScriptedResolver that shares its script and counter
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            last: Arc::clone(&other.last),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl AddressResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<Address> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let step = {
            let mut script = self.script.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            // Script exhausted: repeat the last step
            if let Some(step) = script.pop_front() {
                *last = step;
            }
            last.clone()
        };

        match step {
            Some(body) => Address::from_discovery_body(&body),
            None => Err(Error::resolution("discovery endpoint unreachable")),
        }
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// One call observed by RecordingUpdater
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub api_token: String,
    pub domain_name: String,
    pub address: String,
}

/// A RecordUpdater that records every call and fails for chosen names
pub struct RecordingUpdater {
    calls: Arc<Mutex<Vec<AppliedUpdate>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingUpdater {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Make updates for `name` fail until healed
    pub fn fail_for(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    /// Make updates for `name` succeed again
    pub fn heal(&self, name: &str) {
        self.failing.lock().unwrap().remove(name);
    }

    /// Get the number of times apply() was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Get every recorded call, in order
    pub fn calls(&self) -> Vec<AppliedUpdate> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the names that were attempted, in order
    pub fn attempted_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.domain_name)
            .collect()
    }

    /// Create a new RecordingUpdater that shares state with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            calls: Arc::clone(&other.calls),
            failing: Arc::clone(&other.failing),
        }
    }
}

#[async_trait::async_trait]
impl RecordUpdater for RecordingUpdater {
    async fn apply(&self, target: &UpdateTarget, name: &str, address: &Address) -> UpdateOutcome {
        self.calls.lock().unwrap().push(AppliedUpdate {
            api_token: target.api_token.clone(),
            domain_name: name.to_string(),
            address: address.to_string(),
        });

        if self.failing.lock().unwrap().contains(name) {
            UpdateOutcome::failed(
                target,
                name,
                Some(403),
                r#"{"success":false,"errors":[{"code":9109,"message":"Invalid access token"}]}"#,
            )
        } else {
            UpdateOutcome::succeeded(target, name, Some(200), "ok")
        }
    }

    fn updater_name(&self) -> &'static str {
        "recording"
    }
}

/// A StateStore that tracks calls and can be made to fail
pub struct MockStateStore {
    get_call_count: Arc<AtomicUsize>,
    set_call_count: Arc<AtomicUsize>,
    flush_call_count: Arc<AtomicUsize>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    state: Arc<Mutex<HashMap<String, Address>>>,
}

impl MockStateStore {
    pub fn new() -> Self {
        Self {
            get_call_count: Arc::new(AtomicUsize::new(0)),
            set_call_count: Arc::new(AtomicUsize::new(0)),
            flush_call_count: Arc::new(AtomicUsize::new(0)),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a store already holding `address` under `key`
    pub fn with_address(key: &str, address: &str) -> Self {
        let store = Self::new();
        store
            .state
            .lock()
            .unwrap()
            .insert(key.to_string(), Address::parse(address).unwrap());
        store
    }

    /// Get the number of times get_last_address() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times set_last_address() was called
    pub fn set_call_count(&self) -> usize {
        self.set_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times flush() was called
    pub fn flush_call_count(&self) -> usize {
        self.flush_call_count.load(Ordering::SeqCst)
    }

    /// The address currently stored under `key`
    pub fn stored(&self, key: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .get(key)
            .map(|address| address.to_string())
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Create a new MockStateStore that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            get_call_count: Arc::clone(&other.get_call_count),
            set_call_count: Arc::clone(&other.set_call_count),
            flush_call_count: Arc::clone(&other.flush_call_count),
            fail_reads: Arc::clone(&other.fail_reads),
            fail_writes: Arc::clone(&other.fail_writes),
            state: Arc::clone(&other.state),
        }
    }
}

#[async_trait::async_trait]
impl StateStore for MockStateStore {
    async fn get_last_address(&self, key: &str) -> Result<Option<Address>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::persistence("state unreadable"));
        }
        Ok(self.state.lock().unwrap().get(key).cloned())
    }

    async fn get_record(&self, key: &str) -> Result<Option<StateRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::persistence("state unreadable"));
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .map(|last_address| StateRecord {
                last_address,
                last_updated: chrono::Utc::now(),
            }))
    }

    async fn set_last_address(&self, key: &str, address: &Address) -> Result<()> {
        self.set_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::persistence("disk full"));
        }
        self.state
            .lock()
            .unwrap()
            .insert(key.to_string(), address.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.flush_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A target with its own token and the given names
pub fn target(api_token: &str, record_id: &str, names: &[&str]) -> UpdateTarget {
    UpdateTarget::new(
        api_token,
        "zone-1",
        record_id,
        "A",
        names.iter().map(|name| name.to_string()).collect(),
    )
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(targets: Vec<UpdateTarget>) -> DdnsConfig {
    DdnsConfig {
        resolver: ResolverConfig::new("https://ip.example.net/"),
        updater: UpdaterConfig::Direct,
        state_store: StateStoreConfig::Memory,
        targets,
        engine: EngineConfig {
            interval_secs: 300,
            retry_delay_secs: 5,
            persistence_policy: PersistencePolicy::Confirmatory,
            state_key: "ip".to_string(),
            mode: Mode::Live,
            event_channel_capacity: 100,
        },
    }
}

/// Same as [`minimal_config`] with another persistence policy
pub fn config_with_policy(targets: Vec<UpdateTarget>, policy: PersistencePolicy) -> DdnsConfig {
    let mut config = minimal_config(targets);
    config.engine.persistence_policy = policy;
    config
}
