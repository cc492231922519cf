//! Delete command implementation

use anyhow::{Context, Result};
use mdbdict_core::{Dict, DictFlags, MdbConfig, OpenFlags};
use mdbdict_lmdb::LmdbTable;
use std::path::Path;

/// Returns whether every key was present
pub fn execute(map: &Path, keys: &[String], flags: DictFlags, config: &MdbConfig) -> Result<bool> {
    let table = LmdbTable::open(map, OpenFlags::read_write(), config)
        .with_context(|| format!("Failed to open map {}", map.display()))?;
    let mut dict = table.dict(flags)?;

    let mut all_found = true;
    for key in keys {
        if dict.delete(key)? {
            tracing::info!("Deleted {}", key);
        } else {
            tracing::warn!("{}: not found", key);
            all_found = false;
        }
    }

    dict.close()?;
    table.close()?;
    Ok(all_found)
}
