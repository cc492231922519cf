use lmdb::{Cursor, Database, Environment, EnvironmentFlags, RwTransaction, Transaction};
use mdbdict_core::{
    error::{DictError, Result},
    DictFlags, FileMeta, MdbConfig, OpenFlags, SyncMode,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::dict::LmdbDict;
use crate::stat::{self, MapFile};

/// Suffix appended to a map's logical path to name its LMDB file
pub const MDB_SUFFIX: &str = ".mdb";

const MDB_FILE_MODE: u32 = 0o644;

/// Physical file for a logical map path
pub fn mdb_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(MDB_SUFFIX);
    PathBuf::from(name)
}

/// An open LMDB map file
///
/// Owns the environment, the default table and the metadata captured at
/// open. Dictionary handles borrow the table, see [`LmdbTable::dict`]; only
/// one may be open at a time.
pub struct LmdbTable {
    env: Environment,
    db: Database,
    name: String,
    path: PathBuf,
    mdb_path: PathBuf,
    flags: OpenFlags,
    config: MdbConfig,
    map_file: MapFile,
    dict_open: AtomicBool,
    truncate_pending: AtomicBool,
}

impl LmdbTable {
    /// Open (creating if writable) the map file for `path` plus `.mdb`
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags, config: &MdbConfig) -> Result<Self> {
        config.validate()?;
        if flags.truncate && flags.is_read_only() {
            return Err(DictError::Config("truncate requires read-write access".into()));
        }

        let path = path.as_ref().to_path_buf();
        let mdb_path = mdb_path(&path);

        let mut env_flags = EnvironmentFlags::NO_SUB_DIR | EnvironmentFlags::NO_TLS;
        if flags.is_read_only() {
            env_flags.insert(EnvironmentFlags::READ_ONLY);
        }
        match config.sync_mode {
            SyncMode::Full => {}
            SyncMode::NoMetaSync => env_flags.insert(EnvironmentFlags::NO_META_SYNC),
            SyncMode::NoSync => env_flags.insert(EnvironmentFlags::NO_SYNC),
        }

        let mut env_builder = Environment::new();
        env_builder.set_flags(env_flags);
        env_builder.set_map_size(config.map_size);
        env_builder.set_max_readers(config.max_readers);

        let env = env_builder
            .open_with_permissions(&mdb_path, MDB_FILE_MODE as _)
            .map_err(|e| {
                DictError::Environment(format!("env_open {}: {}", mdb_path.display(), e))
            })?;

        let db = env.open_db(None).map_err(|e| {
            DictError::Environment(format!("mdb_open {}: {}", mdb_path.display(), e))
        })?;

        let map_file = MapFile::open(&mdb_path)?;

        tracing::debug!(
            "opened {} (map_size={}, max_readers={}, read_only={})",
            mdb_path.display(),
            config.map_size,
            config.max_readers,
            flags.is_read_only()
        );

        Ok(Self {
            env,
            db,
            name: path.display().to_string(),
            path,
            mdb_path,
            flags,
            config: config.clone(),
            map_file,
            dict_open: AtomicBool::new(false),
            truncate_pending: AtomicBool::new(flags.truncate),
        })
    }

    /// Open the dictionary handle for this table
    ///
    /// If the table was opened with truncate and no bulk load has committed
    /// yet, all entries are dropped inside a write transaction that the
    /// handle keeps until it is closed (bulk-load mode). A handle dropped
    /// without close leaves the truncate pending for the next one.
    pub fn dict(&self, flags: DictFlags) -> Result<LmdbDict<'_>> {
        if self.dict_open.swap(true, Ordering::SeqCst) {
            return Err(DictError::InvalidState(format!(
                "{}: dictionary is already open",
                self.name
            )));
        }

        let ambient = if self.truncate_pending.load(Ordering::SeqCst) {
            match self.begin_truncate() {
                Ok(txn) => Some(txn),
                Err(e) => {
                    self.release();
                    return Err(e);
                }
            }
        } else {
            None
        };

        if flags.lock {
            stat::warn_if_stale(&self.path, &self.mdb_path, self.map_file.meta().mtime);
        }

        Ok(LmdbDict::new(self, flags, ambient))
    }

    fn begin_truncate(&self) -> Result<RwTransaction<'_>> {
        let mut txn = self.env.begin_rw_txn().map_err(|e| {
            DictError::Transaction(format!("txn_begin {}: {}", self.mdb_path.display(), e))
        })?;
        txn.clear_db(self.db).map_err(|e| {
            DictError::Storage(format!("truncate {}: {}", self.mdb_path.display(), e))
        })?;
        tracing::debug!(
            "truncated {}, holding write transaction for bulk load",
            self.mdb_path.display()
        );
        Ok(txn)
    }

    /// Called once a bulk-load transaction has committed
    pub(crate) fn truncate_committed(&self) {
        self.truncate_pending.store(false, Ordering::SeqCst);
    }

    /// Whether the next dictionary handle will start a bulk load
    pub fn is_truncate_pending(&self) -> bool {
        self.truncate_pending.load(Ordering::SeqCst)
    }

    pub(crate) fn release(&self) {
        self.dict_open.store(false, Ordering::SeqCst);
    }

    pub(crate) fn env(&self) -> &Environment {
        &self.env
    }

    pub(crate) fn db(&self) -> Database {
        self.db
    }

    /// Name used in diagnostics (the logical path)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical path, without the `.mdb` suffix
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the LMDB file
    pub fn mdb_path(&self) -> &Path {
        &self.mdb_path
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// Effective tuning captured at open
    pub fn config(&self) -> &MdbConfig {
        &self.config
    }

    /// Modification time and owner of the map file at open
    pub fn meta(&self) -> FileMeta {
        self.map_file.meta()
    }

    /// Whether the map file was modified since it was opened
    pub fn changed(&self) -> Result<bool> {
        self.map_file.changed()
    }

    /// Number of entries in the default table
    pub fn len(&self) -> Result<usize> {
        let txn = self.env.begin_ro_txn().map_err(|e| {
            DictError::Transaction(format!("txn_begin {}: {}", self.mdb_path.display(), e))
        })?;
        let mut cursor = txn.open_ro_cursor(self.db).map_err(|e| {
            DictError::Storage(format!("cursor_open {}: {}", self.mdb_path.display(), e))
        })?;
        // A fresh cursor steps onto the first entry; an empty table yields none
        Ok(cursor.iter().count())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Flush (when durability was relaxed) and release the environment
    pub fn close(self) -> Result<()> {
        if !self.flags.is_read_only() && self.config.sync_mode != SyncMode::Full {
            self.env.sync(true).map_err(|e| {
                DictError::Environment(format!("sync {}: {}", self.mdb_path.display(), e))
            })?;
        }
        tracing::debug!("closed {}", self.mdb_path.display());
        Ok(())
    }
}

impl std::fmt::Debug for LmdbTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbTable")
            .field("mdb_path", &self.mdb_path)
            .field("flags", &self.flags)
            .field("config", &self.config)
            .finish()
    }
}
