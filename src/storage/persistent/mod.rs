//! Persistent storage backend for the zoo.
//!
//! This module provides durable, crash-safe storage with:
//! - a write-ahead log replayed on open
//! - an exclusive directory lock for single-process access
//! - CRC32 checksums for corruption detection
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              PersistentZooStore              │
//! ├──────────────────────────────────────────────┤
//! │  ┌───────────────┐   ┌────────────────────┐  │
//! │  │ WriteAheadLog │──▶│ ZooRecords (RwLock)│  │
//! │  │ (append-only) │   │  replayed snapshot │  │
//! │  └───────┬───────┘   └────────────────────┘  │
//! │          ↓                                   │
//! │  ┌──────────────────────┐                    │
//! │  │ DirectoryLock (flock)│                    │
//! │  └──────────────────────┘                    │
//! └──────────────────────────────────────────────┘
//! ```

mod codec;
mod file_lock;
mod stores;
mod wal;

pub use file_lock::{DirectoryLock, LOCK_FILE_NAME};
pub use stores::{PersistentZooStore, WAL_FILE_NAME};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ZooError, ZooResult};

/// Configuration for persistent storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistentConfig {
    /// Log size (bytes) past which the log is compacted into a snapshot.
    pub max_wal_size: u64,
    /// Whether to fsync after every write (slower but safer).
    pub sync_on_write: bool,
}

impl Default for PersistentConfig {
    fn default() -> Self {
        Self {
            max_wal_size: 4 * 1024 * 1024,
            sync_on_write: true,
        }
    }
}

impl PersistentConfig {
    /// Smallest accepted compaction threshold; below this every write compacts.
    pub const MIN_WAL_SIZE: u64 = 4 * 1024;

    /// Checks the configuration, returning it unchanged when valid.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `max_wal_size` is below [`Self::MIN_WAL_SIZE`].
    pub fn validate(self) -> ZooResult<Self> {
        if self.max_wal_size < Self::MIN_WAL_SIZE {
            return Err(ZooError::invalid_config(format!(
                "max_wal_size must be at least {} bytes (got {})",
                Self::MIN_WAL_SIZE,
                self.max_wal_size
            )));
        }
        Ok(self)
    }
}

/// Open or create a persistent zoo store at the given directory.
///
/// # Errors
/// - `InvalidConfig` if the configuration is rejected
/// - `Storage` if the directory cannot be used, is locked, or its log is corrupt
///
/// # Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use menagerie::storage::persistent::open_database;
///
/// let store = open_database("./zoo-data", None)?;
/// let store = Arc::new(store);
/// # Ok::<(), menagerie::ZooError>(())
/// ```
pub fn open_database(
    path: impl AsRef<Path>,
    config: Option<PersistentConfig>,
) -> ZooResult<PersistentZooStore> {
    let cfg = config.unwrap_or_default().validate()?;
    Ok(PersistentZooStore::open(path.as_ref(), cfg)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_tiny_wal() {
        let cfg = PersistentConfig {
            max_wal_size: 10,
            ..PersistentConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ZooError::InvalidConfig { .. })));
        assert!(PersistentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let cfg: PersistentConfig = serde_json::from_str(r#"{"sync_on_write": false}"#).unwrap();
        assert!(!cfg.sync_on_write);
        assert_eq!(cfg.max_wal_size, PersistentConfig::default().max_wal_size);
    }
}
