//! Put command implementation

use anyhow::{Context, Result};
use mdbdict_core::{Dict, DictFlags, MdbConfig, OpenFlags, UpdateOutcome};
use mdbdict_lmdb::LmdbTable;
use std::path::Path;

pub fn execute(
    map: &Path,
    key: &str,
    value: &str,
    flags: DictFlags,
    config: &MdbConfig,
) -> Result<()> {
    let table = LmdbTable::open(map, OpenFlags::read_write(), config)
        .with_context(|| format!("Failed to open map {}", map.display()))?;
    let mut dict = table.dict(flags)?;

    match dict.update(key, value)? {
        UpdateOutcome::Stored => tracing::debug!("Stored {}", key),
        UpdateOutcome::Duplicate => tracing::debug!("Kept existing value for {}", key),
    }

    dict.close()?;
    table.close()?;
    Ok(())
}
