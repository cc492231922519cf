//! Info command implementation

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use mdbdict_core::{DictFlags, MdbConfig, OpenFlags};
use mdbdict_lmdb::LmdbTable;
use std::path::Path;

pub fn execute(map: &Path, config: &MdbConfig) -> Result<()> {
    let table = LmdbTable::open(map, OpenFlags::read_only(), config)
        .with_context(|| format!("Failed to open map {}", map.display()))?;
    // Request the lock so an out-of-date map gets reported
    drop(table.dict(DictFlags::new().with_lock(true))?);
    let meta = table.meta();

    let modified: DateTime<Local> = meta.mtime.into();
    let owner = match meta.owner.uid {
        Some(uid) => uid.to_string(),
        None => "unknown".to_string(),
    };

    println!("\nMap Info");
    println!("{}", "=".repeat(60));
    println!("Path: {}", table.path().display());
    println!("File: {}", table.mdb_path().display());
    println!("Entries: {}", table.len()?);
    println!("Modified: {}", modified.format("%Y-%m-%d %H:%M:%S %z"));
    println!(
        "Owner: {} ({})",
        owner,
        if meta.owner.is_trusted() {
            "trusted"
        } else {
            "untrusted"
        }
    );
    println!("Map Size: {} bytes", table.config().map_size);
    println!("Max Readers: {}", table.config().max_readers);

    table.close()?;
    Ok(())
}
