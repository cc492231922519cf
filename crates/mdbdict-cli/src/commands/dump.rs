//! Dump command implementation

use anyhow::{Context, Result};
use mdbdict_core::{Dict, DictFlags, MdbConfig, OpenFlags, SeqFn};
use mdbdict_lmdb::LmdbTable;
use std::io::{self, Write};
use std::path::Path;

pub fn execute(map: &Path, config: &MdbConfig) -> Result<()> {
    let table = LmdbTable::open(map, OpenFlags::read_only(), config)
        .with_context(|| format!("Failed to open map {}", map.display()))?;
    let mut dict = table.dict(DictFlags::new())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut func = SeqFn::First;
    while let Some((key, value)) = dict.sequence(func)? {
        writeln!(out, "{} {}", key, value)?;
        func = SeqFn::Next;
    }
    out.flush()?;

    dict.close()?;
    table.close()?;
    Ok(())
}
