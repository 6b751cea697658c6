// # Text File State Store
//
// One plain-text file per key holding nothing but the last applied
// address, e.g. `./ip.last` containing `203.0.113.5`.
//
// ## Failure Behavior
//
// - Missing file or blank content reads as absent
// - Content that is not an address is reported as a persistence error
// - Writes go to `{key}.last.tmp` first and are renamed into place

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::address::Address;
use crate::traits::state_store::{StateRecord, StateStore};

const STATE_FILE_EXTENSION: &str = "last";

/// Plain-text state store: `{dir}/{key}.last`
#[derive(Debug, Clone)]
pub struct TextFileStateStore {
    dir: PathBuf,
}

impl TextFileStateStore {
    /// Create a store rooted at `dir`
    ///
    /// The directory is created on first write if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, STATE_FILE_EXTENSION))
    }

    async fn read_address(path: &Path) -> Result<Option<Address>, Error> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::persistence(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        Address::parse(&content).map(Some).map_err(|e| {
            Error::persistence(format!("Invalid content in {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl StateStore for TextFileStateStore {
    async fn get_last_address(&self, key: &str) -> Result<Option<Address>, Error> {
        Self::read_address(&self.path_for(key)).await
    }

    async fn get_record(&self, key: &str) -> Result<Option<StateRecord>, Error> {
        let path = self.path_for(key);
        let Some(last_address) = Self::read_address(&path).await? else {
            return Ok(None);
        };

        let modified = fs::metadata(&path)
            .await
            .and_then(|meta| meta.modified())
            .map_err(|e| {
                Error::persistence(format!("Failed to stat {}: {}", path.display(), e))
            })?;

        Ok(Some(StateRecord {
            last_address,
            last_updated: modified.into(),
        }))
    }

    async fn set_last_address(&self, key: &str, address: &Address) -> Result<(), Error> {
        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to create state directory {}: {}",
                    self.dir.display(),
                    e
                ))
            })?;
        }

        let path = self.path_for(key);
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));

        fs::write(&temp_path, address.as_str()).await.map_err(|e| {
            Error::persistence(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;

        fs::rename(&temp_path, &path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::trace!("State written to file: {}", path.display());
        Ok(())
    }

    async fn flush(&self) -> Result<(), Error> {
        // Writes are synchronous with set_last_address
        Ok(())
    }
}
