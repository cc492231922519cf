use lmdb::WriteFlags;
use mdbdict_core::{
    error::{DictError, Result},
    observe, Dict, DictFlags, DuplicatePolicy, FileMeta, KeyForm, LockOp, SeqFn, UpdateOutcome,
};

use crate::cursor::Sequencer;
use crate::encoding::{copy_terminated, encode, Encoding, KeyFolder};
use crate::store::LmdbTable;
use crate::txn::TxnScopes;

/// Dictionary handle over an [`LmdbTable`]
///
/// Every call runs in the ambient bulk-load transaction when the table was
/// opened with truncate, and in a private transaction of its own otherwise.
/// Results are copied into buffers owned by the handle.
pub struct LmdbDict<'env> {
    table: &'env LmdbTable,
    scopes: TxnScopes<'env>,
    sequencer: Sequencer<'env>,
    encoding: Encoding,
    duplicates: DuplicatePolicy,
    folder: KeyFolder,
    key_buf: String,
    val_buf: String,
}

impl<'env> LmdbDict<'env> {
    pub(crate) fn new(
        table: &'env LmdbTable,
        flags: DictFlags,
        ambient: Option<lmdb::RwTransaction<'env>>,
    ) -> Self {
        Self {
            table,
            scopes: TxnScopes::new(table.env(), ambient),
            sequencer: Sequencer::new(),
            encoding: Encoding::new(flags.encoding),
            duplicates: flags.duplicates,
            folder: KeyFolder::new(flags.fold),
            key_buf: String::new(),
            val_buf: String::new(),
        }
    }

    pub fn table(&self) -> &'env LmdbTable {
        self.table
    }

    /// Current state of on-disk encoding detection
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Whether a bulk-load transaction is held until close
    pub fn is_bulk_load(&self) -> bool {
        self.scopes.has_ambient()
    }

    /// Whether a traversal is in progress
    pub fn is_traversing(&self) -> bool {
        self.sequencer.is_open()
    }

    pub fn duplicates(&self) -> DuplicatePolicy {
        self.duplicates
    }

    pub fn meta(&self) -> FileMeta {
        self.table.meta()
    }

    /// Whether the map file was modified since it was opened
    pub fn changed(&self) -> Result<bool> {
        self.table.changed()
    }
}

impl<'env> Dict for LmdbDict<'env> {
    fn name(&self) -> &str {
        self.table.name()
    }

    fn lookup(&mut self, key: &str) -> Result<Option<&str>> {
        let table = self.table;
        let key = self.folder.fold(key);
        let scope = self.scopes.read(table.name())?;

        let mut found: Option<KeyForm> = None;
        for &form in self.encoding.candidates() {
            match scope.get(table.db(), &encode(form, key.as_bytes())) {
                Ok(value) => {
                    copy_terminated(&mut self.val_buf, value);
                    found = Some(form);
                    break;
                }
                Err(lmdb::Error::NotFound) => {}
                Err(e) => {
                    return Err(DictError::Storage(format!(
                        "{}: lookup: {}",
                        table.name(),
                        e
                    )))
                }
            }
        }
        scope.finish();

        observe::record_lookup(found.is_some());
        match found {
            Some(form) => {
                self.encoding.confirm(form);
                Ok(Some(self.val_buf.as_str()))
            }
            None => Ok(None),
        }
    }

    fn update(&mut self, key: &str, value: &str) -> Result<UpdateOutcome> {
        let table = self.table;
        let key = self.folder.fold(key);
        let form = self.encoding.resolve_for_write();
        let put_flags = match self.duplicates {
            DuplicatePolicy::Replace => WriteFlags::empty(),
            _ => WriteFlags::NO_OVERWRITE,
        };

        let mut scope = self.scopes.write(table.name())?;
        let put = scope.txn().put(
            table.db(),
            &encode(form, key.as_bytes()),
            &encode(form, value.as_bytes()),
            put_flags,
        );
        let outcome = match put {
            Ok(()) => UpdateOutcome::Stored,
            Err(lmdb::Error::KeyExist) => match self.duplicates {
                DuplicatePolicy::Ignore => UpdateOutcome::Duplicate,
                DuplicatePolicy::Warn => {
                    tracing::warn!("{}: duplicate entry: \"{}\"", table.name(), key);
                    UpdateOutcome::Duplicate
                }
                DuplicatePolicy::Replace | DuplicatePolicy::Fatal => {
                    return Err(DictError::DuplicateEntry {
                        dict: table.name().to_string(),
                        key: key.to_string(),
                    })
                }
            },
            Err(e) => {
                return Err(DictError::Storage(format!(
                    "error writing MDB database {}: {}",
                    table.name(),
                    e
                )))
            }
        };
        scope.finish(table.name())?;

        observe::record_update(outcome == UpdateOutcome::Duplicate);
        Ok(outcome)
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        let table = self.table;
        let key = self.folder.fold(key);
        let mut scope = self.scopes.write(table.name())?;

        let mut found: Option<KeyForm> = None;
        for &form in self.encoding.candidates() {
            match scope
                .txn()
                .del(table.db(), &encode(form, key.as_bytes()), None)
            {
                Ok(()) => {
                    found = Some(form);
                    break;
                }
                Err(lmdb::Error::NotFound) => {}
                Err(e) => {
                    return Err(DictError::Storage(format!(
                        "error deleting from {}: {}",
                        table.name(),
                        e
                    )))
                }
            }
        }
        scope.finish(table.name())?;

        if let Some(form) = found {
            self.encoding.confirm(form);
        }
        observe::record_delete(found.is_some());
        Ok(found.is_some())
    }

    fn sequence(&mut self, func: SeqFn) -> Result<Option<(&str, &str)>> {
        let table = self.table;
        let more = self.sequencer.step(
            table.env(),
            table.db(),
            table.name(),
            func,
            &mut self.key_buf,
            &mut self.val_buf,
        )?;
        if more {
            Ok(Some((self.key_buf.as_str(), self.val_buf.as_str())))
        } else {
            Ok(None)
        }
    }

    fn lock(&mut self, _op: LockOp) -> Result<()> {
        // LMDB's MVCC already keeps readers and the writer apart
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        let table = self.table;
        let bulk_load = self.scopes.has_ambient();
        self.scopes.close(table.name())?;
        if bulk_load {
            table.truncate_committed();
        }
        self.sequencer.close(table.name());
        self.key_buf = String::new();
        self.val_buf = String::new();
        Ok(())
    }
}

impl Drop for LmdbDict<'_> {
    fn drop(&mut self) {
        let table = self.table;
        if self.scopes.abort_ambient() {
            tracing::warn!(
                "{}: dictionary dropped without close, bulk load discarded",
                table.name()
            );
        }
        self.sequencer.close(table.name());
        table.release();
    }
}

impl std::fmt::Debug for LmdbDict<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbDict")
            .field("name", &self.table.name())
            .field("encoding", &self.encoding)
            .field("duplicates", &self.duplicates)
            .field("bulk_load", &self.scopes.has_ambient())
            .field("traversing", &self.sequencer.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdbdict_core::{MdbConfig, OpenFlags};
    use tempfile::TempDir;

    fn open_table(temp_dir: &TempDir, flags: OpenFlags) -> LmdbTable {
        LmdbTable::open(temp_dir.path().join("map"), flags, &MdbConfig::default()).unwrap()
    }

    #[test]
    fn test_lookup_update_delete() {
        let temp_dir = TempDir::new().unwrap();
        let table = open_table(&temp_dir, OpenFlags::read_write());
        let mut dict = table.dict(DictFlags::default()).unwrap();
        assert!(!dict.is_bulk_load());

        assert_eq!(dict.lookup("alice").unwrap(), None);
        assert_eq!(dict.update("alice", "30").unwrap(), UpdateOutcome::Stored);
        assert_eq!(dict.lookup("alice").unwrap(), Some("30"));
        assert!(dict.delete("alice").unwrap());
        assert!(!dict.delete("alice").unwrap());
        assert_eq!(dict.lookup("alice").unwrap(), None);
        dict.close().unwrap();
    }

    #[test]
    fn test_fold_lowercases_keys() {
        let temp_dir = TempDir::new().unwrap();
        let table = open_table(&temp_dir, OpenFlags::read_write());
        let mut dict = table.dict(DictFlags::new().with_fold(true)).unwrap();

        dict.update("Postmaster@Example.COM", "root").unwrap();
        assert_eq!(dict.lookup("postmaster@example.com").unwrap(), Some("root"));
        assert_eq!(dict.lookup("POSTMASTER@EXAMPLE.COM").unwrap(), Some("root"));
        assert_eq!(
            dict.sequence(SeqFn::First).unwrap(),
            Some(("postmaster@example.com", "root"))
        );
        assert_eq!(dict.sequence(SeqFn::Next).unwrap(), None);
    }

    #[test]
    fn test_write_settles_encoding() {
        let temp_dir = TempDir::new().unwrap();
        let table = open_table(&temp_dir, OpenFlags::read_write());
        let mut dict = table.dict(DictFlags::default()).unwrap();

        assert_eq!(dict.encoding(), Encoding::Both);
        dict.lookup("missing").unwrap();
        assert_eq!(dict.encoding(), Encoding::Both);
        dict.update("k", "v").unwrap();
        assert_eq!(
            dict.encoding().settled(),
            Some(crate::encoding::DEFAULT_WRITE_FORM)
        );
    }

    #[test]
    fn test_duplicate_policies() {
        let temp_dir = TempDir::new().unwrap();
        let table = open_table(&temp_dir, OpenFlags::read_write());

        for (policy, expected_outcome, expected_value) in [
            (DuplicatePolicy::Replace, UpdateOutcome::Stored, "new"),
            (DuplicatePolicy::Ignore, UpdateOutcome::Duplicate, "old"),
            (DuplicatePolicy::Warn, UpdateOutcome::Duplicate, "old"),
        ] {
            let mut dict = table
                .dict(DictFlags::new().with_duplicates(policy))
                .unwrap();
            dict.delete("key").unwrap();
            dict.update("key", "old").unwrap();
            assert_eq!(dict.update("key", "new").unwrap(), expected_outcome);
            assert_eq!(dict.lookup("key").unwrap(), Some(expected_value));
            dict.close().unwrap();
        }

        let mut dict = table
            .dict(DictFlags::new().with_duplicates(DuplicatePolicy::Fatal))
            .unwrap();
        let err = dict.update("key", "other").unwrap_err();
        assert!(matches!(err, DictError::DuplicateEntry { .. }));
        // The failed private transaction left the stored value alone
        assert_eq!(dict.lookup("key").unwrap(), Some("old"));
    }

    #[test]
    fn test_close_mid_traversal_releases_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let table = open_table(&temp_dir, OpenFlags::read_write());
        let mut dict = table.dict(DictFlags::default()).unwrap();
        dict.update("a", "1").unwrap();
        dict.update("b", "2").unwrap();

        assert_eq!(dict.sequence(SeqFn::First).unwrap(), Some(("a", "1")));
        assert!(dict.is_traversing());
        dict.close().unwrap();

        let dict = table.dict(DictFlags::default()).unwrap();
        assert!(!dict.is_traversing());
    }

    #[test]
    fn test_lock_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let table = open_table(&temp_dir, OpenFlags::read_write());
        let mut dict = table.dict(DictFlags::default()).unwrap();
        dict.lock(LockOp::Exclusive).unwrap();
        dict.update("k", "v").unwrap();
        dict.lock(LockOp::Unlock).unwrap();
        assert_eq!(dict.lookup("k").unwrap(), Some("v"));
    }
}
