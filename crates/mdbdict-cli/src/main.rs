//! mdbdict - build, query and dump LMDB dictionary maps

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mdbdict_core::{DictFlags, DuplicatePolicy, KeyForm, MdbConfig};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "mdbdict")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// LMDB map size in bytes
    #[arg(long, global = true)]
    map_size: Option<usize>,

    /// Number of processes expected to share a map (sizes the reader table)
    #[arg(long, global = true)]
    process_limit: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild a map from a source file of "key value" lines
    Build {
        /// Map path, without the .mdb suffix
        map: PathBuf,

        /// Source file (defaults to the map path itself)
        #[arg(short, long)]
        source: Option<PathBuf>,

        #[command(flatten)]
        dict: DictArgs,
    },

    /// Look up keys, printing "key value" for each one found
    Query {
        map: PathBuf,

        #[arg(required = true)]
        keys: Vec<String>,

        #[arg(short, long)]
        fold: bool,
    },

    /// Delete keys from a map
    Delete {
        map: PathBuf,

        #[arg(required = true)]
        keys: Vec<String>,

        #[arg(short, long)]
        fold: bool,
    },

    /// Print every entry in key order
    Dump { map: PathBuf },

    /// Store a single entry
    Put {
        map: PathBuf,
        key: String,
        value: String,

        #[command(flatten)]
        dict: DictArgs,
    },

    /// Show map file details
    Info { map: PathBuf },
}

/// Options that shape how entries are written
#[derive(Args)]
struct DictArgs {
    /// Lowercase keys before storing them
    #[arg(short, long)]
    fold: bool,

    /// What to do when a key is already present
    #[arg(long, default_value_t = DuplicatePolicy::Warn)]
    dup: DuplicatePolicy,

    /// Store keys and values without a trailing NUL byte
    #[arg(long, conflicts_with = "trailing_null")]
    no_trailing_null: bool,

    /// Store keys and values with a trailing NUL byte
    #[arg(long)]
    trailing_null: bool,
}

impl DictArgs {
    fn flags(&self) -> DictFlags {
        let flags = DictFlags::new()
            .with_fold(self.fold)
            .with_duplicates(self.dup);
        if self.no_trailing_null {
            flags.with_encoding(KeyForm::WithoutNul)
        } else if self.trailing_null {
            flags.with_encoding(KeyForm::WithNul)
        } else {
            flags
        }
    }
}

impl Cli {
    fn config(&self) -> MdbConfig {
        let mut config = MdbConfig::default();
        if let Some(limit) = self.process_limit {
            config = config.with_process_limit(limit);
        }
        if let Some(map_size) = self.map_size {
            config = config.with_map_size(map_size);
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = cli.config();

    let complete = match cli.command {
        Commands::Build { map, source, dict } => {
            let source = source.unwrap_or_else(|| map.clone());
            commands::build::execute(&map, &source, dict.flags(), &config)?;
            true
        }
        Commands::Query { map, keys, fold } => {
            commands::query::execute(&map, &keys, DictFlags::new().with_fold(fold), &config)?
        }
        Commands::Delete { map, keys, fold } => {
            commands::delete::execute(&map, &keys, DictFlags::new().with_fold(fold), &config)?
        }
        Commands::Dump { map } => {
            commands::dump::execute(&map, &config)?;
            true
        }
        Commands::Put {
            map,
            key,
            value,
            dict,
        } => {
            commands::put::execute(&map, &key, &value, dict.flags(), &config)?;
            true
        }
        Commands::Info { map } => {
            commands::info::execute(&map, &config)?;
            true
        }
    };

    // Some keys were not found
    if !complete {
        std::process::exit(1);
    }

    Ok(())
}
