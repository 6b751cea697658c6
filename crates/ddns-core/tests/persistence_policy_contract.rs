//! Architectural Contract Test: Persistence Policy
//!
//! This test verifies that the loop applies exactly one persistence policy.
//!
//! Constraints verified:
//! - Confirmatory: the address is stored only when every update succeeded,
//!   and a failed cycle is retried after `retry_delay` instead of `interval`
//! - Optimistic: the address is stored after the attempts whatever the
//!   outcome, and failed names are not retried until the address changes
//! - The updater itself is never retried within a cycle
//!
//! If this test fails, the retry behavior has drifted.

mod common;

use common::*;
use ddns_core::config::PersistencePolicy;
use ddns_core::{CycleResult, ReconciliationLoop};
use std::time::Duration;

fn two_names() -> Vec<ddns_core::UpdateTarget> {
    vec![target(
        "token-a",
        "rec-a",
        &["home.example.com", "nas.example.com"],
    )]
}

#[tokio::test]
async fn confirmatory_keeps_previous_address_on_failure() {
    let store = MockStateStore::with_address("ip", "198.51.100.2");
    let updater = RecordingUpdater::new();
    updater.fail_for("nas.example.com");

    let (engine, _event_rx) = ReconciliationLoop::new(
        Box::new(ScriptedResolver::fixed("203.0.113.5")),
        Box::new(RecordingUpdater::sharing_counters_with(&updater)),
        Box::new(MockStateStore::sharing_counters_with(&store)),
        config_with_policy(two_names(), PersistencePolicy::Confirmatory),
    )
    .expect("engine construction succeeds");

    let report = engine.run_cycle().await;

    assert_eq!(report.result, CycleResult::Changed);
    assert!(!report.persisted);
    assert_eq!(store.set_call_count(), 0);
    assert_eq!(store.stored("ip").as_deref(), Some("198.51.100.2"));
    assert_eq!(report.next_delay, Duration::from_secs(5));
}

#[tokio::test]
async fn confirmatory_converges_once_the_failure_clears() {
    let store = MockStateStore::new();
    let updater = RecordingUpdater::new();
    updater.fail_for("nas.example.com");

    let (engine, _event_rx) = ReconciliationLoop::new(
        Box::new(ScriptedResolver::fixed("203.0.113.5")),
        Box::new(RecordingUpdater::sharing_counters_with(&updater)),
        Box::new(MockStateStore::sharing_counters_with(&store)),
        config_with_policy(two_names(), PersistencePolicy::Confirmatory),
    )
    .expect("engine construction succeeds");

    let failed = engine.run_cycle().await;
    assert!(!failed.persisted);

    updater.heal("nas.example.com");
    let healed = engine.run_cycle().await;

    assert!(healed.persisted);
    assert!(healed.all_succeeded());
    assert_eq!(healed.next_delay, Duration::from_secs(300));
    assert_eq!(store.stored("ip").as_deref(), Some("203.0.113.5"));
    // Both names attempted in both cycles
    assert_eq!(updater.call_count(), 4);

    let settled = engine.run_cycle().await;
    assert_eq!(settled.result, CycleResult::Unchanged);
    assert_eq!(updater.call_count(), 4);
}

#[tokio::test]
async fn confirmatory_retry_delay_zero_recycles_immediately() {
    let updater = RecordingUpdater::new();
    updater.fail_for("home.example.com");

    let mut config = config_with_policy(two_names(), PersistencePolicy::Confirmatory);
    config.engine.retry_delay_secs = 0;

    let (engine, _event_rx) = ReconciliationLoop::new(
        Box::new(ScriptedResolver::fixed("203.0.113.5")),
        Box::new(RecordingUpdater::sharing_counters_with(&updater)),
        Box::new(MockStateStore::new()),
        config,
    )
    .expect("engine construction succeeds");

    let report = engine.run_cycle().await;
    assert_eq!(report.next_delay, Duration::ZERO);
}

#[tokio::test]
async fn optimistic_persists_despite_failure() {
    let store = MockStateStore::with_address("ip", "198.51.100.2");
    let updater = RecordingUpdater::new();
    updater.fail_for("nas.example.com");

    let (engine, _event_rx) = ReconciliationLoop::new(
        Box::new(ScriptedResolver::fixed("203.0.113.5")),
        Box::new(RecordingUpdater::sharing_counters_with(&updater)),
        Box::new(MockStateStore::sharing_counters_with(&store)),
        config_with_policy(two_names(), PersistencePolicy::Optimistic),
    )
    .expect("engine construction succeeds");

    assert_eq!(engine.policy(), PersistencePolicy::Optimistic);

    let report = engine.run_cycle().await;

    assert!(report.persisted);
    assert!(!report.all_succeeded());
    assert_eq!(report.next_delay, Duration::from_secs(300));
    assert_eq!(store.stored("ip").as_deref(), Some("203.0.113.5"));
    assert_eq!(updater.call_count(), 2, "both names attempted before persisting");

    // The failed name waits for the next address change
    let next = engine.run_cycle().await;
    assert_eq!(next.result, CycleResult::Unchanged);
    assert_eq!(updater.call_count(), 2);
}

#[tokio::test]
async fn optimistic_updates_again_on_next_change() {
    let store = MockStateStore::new();
    let updater = RecordingUpdater::new();
    updater.fail_for("nas.example.com");

    let (engine, _event_rx) = ReconciliationLoop::new(
        Box::new(ScriptedResolver::new(&[
            Some("203.0.113.5"),
            Some("203.0.113.77"),
        ])),
        Box::new(RecordingUpdater::sharing_counters_with(&updater)),
        Box::new(MockStateStore::sharing_counters_with(&store)),
        config_with_policy(two_names(), PersistencePolicy::Optimistic),
    )
    .expect("engine construction succeeds");

    engine.run_cycle().await;
    updater.heal("nas.example.com");
    let report = engine.run_cycle().await;

    assert!(report.all_succeeded());
    assert_eq!(updater.call_count(), 4);
    assert_eq!(store.stored("ip").as_deref(), Some("203.0.113.77"));
}

#[tokio::test]
async fn updater_is_called_once_per_name_per_cycle() {
    let updater = RecordingUpdater::new();
    updater.fail_for("home.example.com");
    updater.fail_for("nas.example.com");

    let (engine, _event_rx) = ReconciliationLoop::new(
        Box::new(ScriptedResolver::fixed("203.0.113.5")),
        Box::new(RecordingUpdater::sharing_counters_with(&updater)),
        Box::new(MockStateStore::new()),
        config_with_policy(two_names(), PersistencePolicy::Confirmatory),
    )
    .expect("engine construction succeeds");

    engine.run_cycle().await;

    assert_eq!(
        updater.attempted_names(),
        vec!["home.example.com", "nas.example.com"],
        "no in-cycle retries"
    );
}
