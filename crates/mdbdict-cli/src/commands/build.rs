//! Build command implementation

use anyhow::{Context, Result};
use mdbdict_core::{Dict, DictFlags, MdbConfig, OpenFlags, UpdateOutcome};
use mdbdict_lmdb::LmdbTable;
use std::fs;
use std::path::Path;

/// One parsed source line
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SourceLine<'a> {
    Entry { key: &'a str, value: &'a str },
    Skip,
    Malformed,
}

/// Parse a `key value` line; blank lines and `#` comments are skipped
pub(crate) fn parse_line(line: &str) -> SourceLine<'_> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return SourceLine::Skip;
    }
    match line.split_once(char::is_whitespace) {
        Some((key, value)) => SourceLine::Entry {
            key,
            value: value.trim_start(),
        },
        None => SourceLine::Malformed,
    }
}

pub fn execute(map: &Path, source: &Path, flags: DictFlags, config: &MdbConfig) -> Result<()> {
    tracing::info!("Building {} from {}", map.display(), source.display());

    let text = fs::read_to_string(source)
        .with_context(|| format!("Failed to read source file {}", source.display()))?;

    let table = LmdbTable::open(map, OpenFlags::truncate(), config)
        .with_context(|| format!("Failed to open map {}", map.display()))?;
    let mut dict = table.dict(flags)?;

    let mut stored = 0usize;
    let mut duplicates = 0usize;
    for (lineno, line) in text.lines().enumerate() {
        match parse_line(line) {
            SourceLine::Entry { key, value } => match dict.update(key, value)? {
                UpdateOutcome::Stored => stored += 1,
                UpdateOutcome::Duplicate => duplicates += 1,
            },
            SourceLine::Skip => {}
            SourceLine::Malformed => {
                tracing::warn!(
                    "{}, line {}: expected format: key whitespace value",
                    source.display(),
                    lineno + 1
                );
            }
        }
    }

    dict.close().context("Failed to commit map")?;
    table.close()?;

    println!("{} entries stored, {} duplicates", stored, duplicates);
    Ok(())
}
