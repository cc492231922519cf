use crate::error::{DictError, Result};
use serde::{Deserialize, Serialize};

/// Number of reader slots reserved beyond two per process, for CLI users.
const EXTRA_READERS: u32 = 16;

/// Tuning parameters for one LMDB-backed table
///
/// Each table captures its own copy when it is opened, so changing a config
/// value never affects tables that are already open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdbConfig {
    /// Memory map size in bytes (default: 10MB)
    ///
    /// This is also the largest size the table can grow to, so it must be
    /// large enough for the biggest map in use.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Maximum number of concurrent read transactions (default: 216)
    ///
    /// Normally derived from the process limit, see [`MdbConfig::with_process_limit`].
    #[serde(default = "default_max_readers")]
    pub max_readers: u32,

    /// Sync mode for durability
    #[serde(default)]
    pub sync_mode: SyncMode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// `fsync()` on every commit (default).
    #[default]
    Full,

    /// Skip syncing the meta page on commit.
    ///
    /// The last transaction may be lost on OS crash, but the table stays
    /// consistent.
    NoMetaSync,

    /// Leave flushing to the OS page cache. Only for rebuildable maps.
    NoSync,
}

fn default_map_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_max_readers() -> u32 {
    readers_for_process_limit(100)
}

/// Reader slots needed when up to `limit` processes may hold the table open.
pub fn readers_for_process_limit(limit: u32) -> u32 {
    limit.saturating_mul(2).saturating_add(EXTRA_READERS)
}

impl Default for MdbConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MdbConfig {
    pub fn new() -> Self {
        Self {
            map_size: default_map_size(),
            max_readers: default_max_readers(),
            sync_mode: SyncMode::default(),
        }
    }

    /// Config sized for a given process concurrency limit
    pub fn for_process_limit(limit: u32) -> Self {
        Self::new().with_process_limit(limit)
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn with_max_readers(mut self, max_readers: u32) -> Self {
        self.max_readers = max_readers;
        self
    }

    /// Set `max_readers` to `2 * limit + 16`
    pub fn with_process_limit(mut self, limit: u32) -> Self {
        self.max_readers = readers_for_process_limit(limit);
        self
    }

    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.map_size == 0 {
            return Err(DictError::Config("map_size must be non-zero".into()));
        }
        if self.max_readers == 0 {
            return Err(DictError::Config("max_readers must be non-zero".into()));
        }
        Ok(())
    }
}
