// # ddns-core
//
// Core library for the polling DDNS system.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **AddressResolver**: Trait for discovering the current public address
// - **StateStore**: Trait for persisting the last applied address
// - **RecordUpdater**: Trait for applying one DNS record update
// - **DnsProvider**: Trait for the single provider record-update call
// - **ReconciliationLoop**: The loop that drives resolve → compare → update → persist → sleep
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Injected Collaborators**: Every I/O boundary is a trait object
// 3. **Library-First**: All core functionality can be used as a library
// 4. **One Persistence Policy**: The loop applies a single, configured policy

pub mod address;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod traits;
pub mod updater;

// Re-export core types for convenience
pub use address::Address;
pub use config::{
    DdnsConfig, EngineConfig, Mode, PersistencePolicy, ResolverConfig, StateStoreConfig,
    UpdaterConfig,
};
pub use engine::{CycleReport, CycleResult, EngineEvent, ReconciliationLoop};
pub use error::{Error, Result};
pub use state::{FileStateStore, MemoryStateStore, TextFileStateStore};
pub use traits::{
    AddressResolver, DnsProvider, ProviderResponse, RecordUpdate, RecordUpdater, StateStore,
    UpdateOutcome, UpdateTarget,
};
pub use updater::DirectUpdater;
