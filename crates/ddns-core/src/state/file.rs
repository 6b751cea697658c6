// # File State Store
//
// JSON-file implementation of StateStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write to `.tmp`, then rename over the state file
// - Automatic backup: the previous state file is kept as `.backup`
// - Recovery: a state file that cannot be read or parsed is replaced by its
//   backup; with no usable backup the store starts empty
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "records": {
//     "ip": {
//       "last_address": "203.0.113.5",
//       "last_updated": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::address::Address;
use crate::traits::state_store::{StateRecord, StateStore};

/// State file format version
const STATE_FILE_VERSION: &str = "1.0";

/// JSON-file state store holding one record per key
///
/// Every write goes straight to disk, so `flush()` only has work to do when
/// a previous write failed.
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::{Address, FileStateStore, StateStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/ddns/state.json").await?;
///
///     store.set_last_address("ip", &Address::parse("203.0.113.5")?).await?;
///     let last = store.get_last_address("ip").await?;
///     assert_eq!(last.map(|a| a.to_string()), Some("203.0.113.5".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    records: HashMap<String, StateRecord>,
    dirty: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    records: HashMap<String, StateRecord>,
}

/// Why a state file could not be loaded
enum LoadFailure {
    /// The file exists but could not be read
    Read(Error),
    /// The file was read but is not a valid state document
    Corrupt(Error),
}

impl FileStateStore {
    /// Create or load a file state store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing state file, if any
    /// 3. If it is unreadable or corrupted, load the backup instead
    /// 4. If both are unusable, start with empty state
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let records = Self::load_state_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                records,
                dirty: false,
            })),
        })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_state_with_recovery(path: &Path) -> Result<HashMap<String, StateRecord>, Error> {
        match Self::load_state(path).await {
            Ok(records) => {
                tracing::debug!("Loaded state from file: {} records", records.len());
                return Ok(records);
            }
            Err(LoadFailure::Read(e)) => tracing::warn!(
                "State file is unreadable: {}. Attempting recovery from backup.",
                e
            ),
            Err(LoadFailure::Corrupt(e)) => tracing::warn!(
                "State file appears corrupted: {}. Attempting recovery from backup.",
                e
            ),
        }

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty state.");
            return Ok(HashMap::new());
        }

        match Self::load_state(&backup_path).await {
            Ok(records) => {
                tracing::info!("Recovered state from backup: {} records", records.len());
                if let Err(e) = fs::copy(&backup_path, path).await {
                    tracing::error!("Failed to restore state file from backup: {}", e);
                }
                Ok(records)
            }
            Err(LoadFailure::Read(e)) | Err(LoadFailure::Corrupt(e)) => {
                tracing::error!("Backup also unusable: {}. Starting with empty state.", e);
                Ok(HashMap::new())
            }
        }
    }

    async fn load_state(path: &Path) -> Result<HashMap<String, StateRecord>, LoadFailure> {
        if !path.exists() {
            tracing::debug!("State file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            LoadFailure::Read(Error::persistence(format!(
                "Failed to read state file {}: {}",
                path.display(),
                e
            )))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            LoadFailure::Corrupt(Error::persistence(format!(
                "Failed to parse state file {}: {}",
                path.display(),
                e
            )))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(state_file.records)
    }

    /// Write state to file atomically
    async fn write_state(&self) -> Result<(), Error> {
        let mut state_guard = self.state.write().await;

        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            records: state_guard.records.clone(),
        };

        let json = serde_json::to_string_pretty(&state_file)
            .map_err(|e| Error::persistence(format!("Failed to serialize state: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("Failed to create backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        state_guard.dirty = false;
        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get_last_address(&self, key: &str) -> Result<Option<Address>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard
            .records
            .get(key)
            .map(|record| record.last_address.clone()))
    }

    async fn get_record(&self, key: &str) -> Result<Option<StateRecord>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.records.get(key).cloned())
    }

    async fn set_last_address(&self, key: &str, address: &Address) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            state_guard
                .records
                .insert(key.to_string(), StateRecord::new(address.clone()));
            state_guard.dirty = true;
        }

        self.write_state().await
    }

    async fn flush(&self) -> Result<(), Error> {
        if self.state.read().await.dirty {
            self.write_state().await
        } else {
            Ok(())
        }
    }
}
