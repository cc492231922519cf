//! Query command implementation

use anyhow::{Context, Result};
use mdbdict_core::{Dict, DictFlags, MdbConfig, OpenFlags};
use mdbdict_lmdb::LmdbTable;
use std::path::Path;

/// Returns whether every key was found
pub fn execute(map: &Path, keys: &[String], flags: DictFlags, config: &MdbConfig) -> Result<bool> {
    let table = LmdbTable::open(map, OpenFlags::read_only(), config)
        .with_context(|| format!("Failed to open map {}", map.display()))?;
    // Request the lock so an out-of-date map gets reported
    let mut dict = table.dict(flags.with_lock(true))?;

    let mut all_found = true;
    for key in keys {
        match dict.lookup(key)? {
            Some(value) => println!("{} {}", key, value),
            None => {
                tracing::debug!("{}: not found", key);
                all_found = false;
            }
        }
    }

    dict.close()?;
    table.close()?;
    Ok(all_found)
}
