// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Crash Behavior
//
// - All state is lost on restart
// - The first cycle after a restart treats the address as changed and
//   updates every target
//
// ## When to Use
//
// - Tests
// - Deployments where one extra update after restart is harmless

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::address::Address;
use crate::traits::state_store::{StateRecord, StateStore};

/// In-memory state store implementation
///
/// Clones share the same underlying map.
///
/// # Example
///
/// ```rust
/// use ddns_core::{Address, MemoryStateStore, StateStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///
///     store.set_last_address("ip", &Address::parse("203.0.113.5")?).await?;
///     assert!(store.get_last_address("ip").await?.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<String, StateRecord>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of keys in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get_last_address(&self, key: &str) -> Result<Option<Address>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(key).map(|record| record.last_address.clone()))
    }

    async fn get_record(&self, key: &str) -> Result<Option<StateRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(key).cloned())
    }

    async fn set_last_address(&self, key: &str, address: &Address) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(key.to_string(), StateRecord::new(address.clone()));
        Ok(())
    }

    async fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}
