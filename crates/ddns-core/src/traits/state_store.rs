// # State Store Trait
//
// Defines the interface for persisting the last applied address.
//
// ## Purpose
//
// The state store lets the loop skip cycles where the address has not
// changed, across process restarts. It is keyed per logical target group:
// single-tenant deployments use one fixed key, multi-tenant deployments
// key by client id.
//
// ## Implementations
//
// - In-memory: `MemoryStateStore`
// - JSON file with backup recovery: `FileStateStore`
// - Plain text file per key: `TextFileStateStore`
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{Address, StateStore};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* StateStore implementation */;
//
//     let last = store.get_last_address("ip").await?;
//     store.set_last_address("ip", &Address::parse("203.0.113.5")?).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::address::Address;

/// State record for one key
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateRecord {
    /// The last applied address
    pub last_address: Address,
    /// Timestamp of the write
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl StateRecord {
    /// Create a new state record stamped with the current time
    ///
    /// # Visibility
    ///
    /// This is `pub(crate)`: records are only created by `StateStore`
    /// implementations during normal operations.
    pub(crate) fn new(last_address: Address) -> Self {
        Self {
            last_address,
            last_updated: chrono::Utc::now(),
        }
    }
}

/// Trait for state store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O for persistent storage
/// - ✅ Cache state in memory (with explicit flush)
///
/// ## Forbidden Capabilities
/// - ❌ Decide when to update (owned by `ReconciliationLoop`)
/// - ❌ Perform DNS updates
/// - ❌ Spawn background tasks
///
/// ## Failure Semantics
///
/// Callers treat a read error as "absent" and a write error as non-fatal,
/// so implementations should report errors rather than mask them.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the last applied address for a key
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Address))`: The last applied address
    /// - `Ok(None)`: Nothing stored yet
    /// - `Err(Error::Persistence)`: Storage error
    async fn get_last_address(&self, key: &str) -> Result<Option<Address>, crate::Error>;

    /// Get the full state record for a key
    async fn get_record(&self, key: &str) -> Result<Option<StateRecord>, crate::Error>;

    /// Store the last applied address for a key
    ///
    /// A successful return means the value is durable.
    async fn set_last_address(&self, key: &str, address: &Address) -> Result<(), crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
