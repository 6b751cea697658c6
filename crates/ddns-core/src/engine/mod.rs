//! Reconciliation loop
//!
//! The ReconciliationLoop is responsible for:
//! - Resolving the current public address via AddressResolver
//! - Comparing it with the last applied address in the StateStore
//! - Applying the address to every target name via RecordUpdater
//! - Persisting the address according to the persistence policy
//! - Sleeping until the next cycle
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ AddressResolver │─── Address ───┐
//! └─────────────────┘               │
//!                                   ▼
//!                       ┌────────────────────┐
//!                       │ ReconciliationLoop │
//!                       └────────────────────┘
//!                                   │
//!         ┌─────────────────────────┼─────────────────────────┐
//!         │                         │                         │
//!         ▼                         ▼                         ▼
//! ┌──────────────┐         ┌───────────────┐         ┌─────────────┐
//! │ StateStore   │         │ RecordUpdater │         │   Events    │
//! │ (read/write) │         │ (× names)     │         │  (notify)   │
//! └──────────────┘         └───────────────┘         └─────────────┘
//! ```
//!
//! ## Cycle
//!
//! `Resolving → Comparing → Updating → Persisting → Sleeping`, forever.
//!
//! 1. Resolution failure: log, skip straight to sleeping. State is untouched.
//! 2. Resolved address equal to the stored one: no-op cycle.
//! 3. Every name of every target is attempted, in configured order, whatever
//!    the earlier outcomes were.
//! 4. Persisting follows the configured [`PersistencePolicy`]:
//!    - `Confirmatory` (default): the address is stored only when every
//!      attempt succeeded. Otherwise the stored address is left unchanged and
//!      the next cycle starts after `retry_delay` instead of the full interval,
//!      so DNS converges quickly once the provider or relay is back.
//!    - `Optimistic`: the address is stored once all attempts have been made,
//!      whatever their outcome. Failed names wait for the next address change.
//!
//!    In both policies the write happens only after the attempts, never before,
//!    so a process killed mid-cycle leaves the previous state in place.
//! 5. Development mode skips step 3 entirely; the address is still resolved,
//!    compared and persisted.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::address::Address;
use crate::config::{DdnsConfig, Mode, PersistencePolicy};
use crate::error::Result;
use crate::traits::{AddressResolver, RecordUpdater, StateStore, UpdateOutcome, UpdateTarget};

/// Events emitted by the ReconciliationLoop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Loop started
    Started {
        targets_count: usize,
        names_count: usize,
    },

    /// Current address resolved
    AddressResolved { address: Address },

    /// Discovery failed; the cycle was skipped
    ResolutionFailed { error: String },

    /// Address equals the stored one; nothing to do
    AddressUnchanged { address: Address },

    /// One name now points at the address
    UpdateSucceeded {
        target: String,
        domain_name: String,
        address: Address,
    },

    /// One name could not be updated
    UpdateFailed {
        target: String,
        domain_name: String,
        message: String,
    },

    /// Address written to the state store
    StatePersisted { address: Address },

    /// Loop stopped
    Stopped { reason: String },
}

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleResult {
    /// The address could not be resolved
    ResolutionFailed,
    /// The address matched the stored one
    Unchanged,
    /// The address changed and the update phase ran
    Changed,
}

/// Summary of one reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// How the cycle ended
    pub result: CycleResult,
    /// The resolved address, if resolution succeeded
    pub address: Option<Address>,
    /// One outcome per attempted name, in attempt order
    pub outcomes: Vec<UpdateOutcome>,
    /// Whether the address was written to the state store
    pub persisted: bool,
    /// How long to wait before the next cycle
    pub next_delay: Duration,
}

impl CycleReport {
    /// Whether every attempted update succeeded (vacuously true with no attempts)
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.success)
    }
}

/// Core reconciliation loop
///
/// ## Lifecycle
///
/// 1. Create with [`ReconciliationLoop::new()`]
/// 2. Start with [`ReconciliationLoop::run()`] or
///    [`ReconciliationLoop::run_with_shutdown()`]
/// 3. The loop runs until its shutdown signal fires
///
/// ## Threading
///
/// Single task, cooperative: a cycle always completes before the next one
/// begins, and shutdown is only observed while sleeping between cycles.
pub struct ReconciliationLoop {
    /// Discovers the current address
    resolver: Box<dyn AddressResolver>,

    /// Applies one record update
    updater: Box<dyn RecordUpdater>,

    /// Last applied address
    state_store: Box<dyn StateStore>,

    /// Records to keep in sync
    targets: Vec<UpdateTarget>,

    /// Key of this loop's entry in the state store
    state_key: String,

    /// Wait between cycles
    interval: Duration,

    /// Wait after a confirmatory cycle with failures
    retry_delay: Duration,

    /// When the address is persisted
    policy: PersistencePolicy,

    /// Live or development mode
    mode: Mode,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl ReconciliationLoop {
    /// Create a new reconciliation loop
    ///
    /// # Returns
    ///
    /// A tuple of (loop, event_receiver) where event_receiver yields engine events
    pub fn new(
        resolver: Box<dyn AddressResolver>,
        updater: Box<dyn RecordUpdater>,
        state_store: Box<dyn StateStore>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            resolver,
            updater,
            state_store,
            targets: config.targets,
            interval: config.engine.interval(),
            retry_delay: config.engine.retry_delay(),
            policy: config.engine.persistence_policy,
            mode: config.engine.mode,
            state_key: config.engine.state_key,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// The persistence policy this loop applies
    pub fn policy(&self) -> PersistencePolicy {
        self.policy
    }

    /// Run until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        self.run_with_shutdown(None).await
    }

    /// Run until `shutdown_rx` fires (or is dropped)
    ///
    /// With `None`, the loop stops on Ctrl-C.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        let names_count = self.targets.iter().map(|t| t.domain_names.len()).sum();
        self.emit_event(EngineEvent::Started {
            targets_count: self.targets.len(),
            names_count,
        });
        info!(
            "Reconciliation loop started: {} target(s), {} name(s), interval {:?}, policy {:?}, mode {:?}",
            self.targets.len(),
            names_count,
            self.interval,
            self.policy,
            self.mode
        );

        match self.state_store.get_record(&self.state_key).await {
            Ok(Some(record)) => info!(
                "Last applied address: {} (at {})",
                record.last_address, record.last_updated
            ),
            Ok(None) => info!("No applied address recorded yet"),
            Err(e) => warn!("Could not read state, treating as absent: {}", e),
        }

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        loop {
            let report = self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(report.next_delay) => {}

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }
            }
        }

        self.state_store.flush().await?;
        info!("State flushed, loop stopped");

        Ok(())
    }

    /// Run one full cycle: resolve, compare, update, persist
    ///
    /// Never fails: every error is logged and reflected in the report.
    pub async fn run_cycle(&self) -> CycleReport {
        let address = match self.resolver.resolve().await {
            Ok(address) => address,
            Err(e) => {
                warn!(
                    "Failed to resolve address via {}: {}",
                    self.resolver.resolver_name(),
                    e
                );
                self.emit_event(EngineEvent::ResolutionFailed {
                    error: e.to_string(),
                });
                return CycleReport {
                    result: CycleResult::ResolutionFailed,
                    address: None,
                    outcomes: Vec::new(),
                    persisted: false,
                    next_delay: self.interval,
                };
            }
        };

        self.emit_event(EngineEvent::AddressResolved {
            address: address.clone(),
        });

        let previous = match self.state_store.get_last_address(&self.state_key).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Could not read state, treating as absent: {}", e);
                None
            }
        };

        if previous.as_ref() == Some(&address) {
            debug!("Address unchanged: {}", address);
            self.emit_event(EngineEvent::AddressUnchanged {
                address: address.clone(),
            });
            return CycleReport {
                result: CycleResult::Unchanged,
                address: Some(address),
                outcomes: Vec::new(),
                persisted: false,
                next_delay: self.interval,
            };
        }

        info!(
            "New address: {} (previous: {})",
            address,
            previous
                .as_ref()
                .map(Address::to_string)
                .unwrap_or_else(|| "none".to_string())
        );

        let outcomes = match self.mode {
            Mode::Live => self.update_all(&address).await,
            Mode::Development => {
                info!("Development mode: skipping record updates for {}", address);
                Vec::new()
            }
        };

        let all_succeeded = outcomes.iter().all(|outcome| outcome.success);
        let persisted = match (self.policy, all_succeeded) {
            (PersistencePolicy::Optimistic, _) | (PersistencePolicy::Confirmatory, true) => {
                self.persist(&address).await
            }
            (PersistencePolicy::Confirmatory, false) => {
                let failed = outcomes.iter().filter(|outcome| !outcome.success).count();
                warn!(
                    "{} of {} update(s) failed; keeping previous address and retrying in {:?}",
                    failed,
                    outcomes.len(),
                    self.retry_delay
                );
                false
            }
        };

        let next_delay = if self.policy == PersistencePolicy::Confirmatory && !all_succeeded {
            self.retry_delay
        } else {
            self.interval
        };

        CycleReport {
            result: CycleResult::Changed,
            address: Some(address),
            outcomes,
            persisted,
            next_delay,
        }
    }

    /// Attempt every name of every target, in order
    async fn update_all(&self, address: &Address) -> Vec<UpdateOutcome> {
        let mut outcomes = Vec::new();

        for target in &self.targets {
            for name in &target.domain_names {
                let outcome = self.updater.apply(target, name, address).await;

                if outcome.success {
                    self.emit_event(EngineEvent::UpdateSucceeded {
                        target: outcome.target.clone(),
                        domain_name: outcome.domain_name.clone(),
                        address: address.clone(),
                    });
                } else {
                    error!(
                        "Failed to update {} via {}: {}",
                        name,
                        self.updater.updater_name(),
                        outcome.message
                    );
                    self.emit_event(EngineEvent::UpdateFailed {
                        target: outcome.target.clone(),
                        domain_name: outcome.domain_name.clone(),
                        message: outcome.message.clone(),
                    });
                }

                outcomes.push(outcome);
            }
        }

        outcomes
    }

    /// Best-effort write; a failure is logged and does not abort the cycle
    async fn persist(&self, address: &Address) -> bool {
        match self
            .state_store
            .set_last_address(&self.state_key, address)
            .await
        {
            Ok(()) => {
                info!("Persisted address {} under key {}", address, self.state_key);
                self.emit_event(EngineEvent::StatePersisted {
                    address: address.clone(),
                });
                true
            }
            Err(e) => {
                error!("Failed to persist address {}: {}", address, e);
                false
            }
        }
    }

    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
