use lmdb::{Cursor, Database, Environment, RoTransaction, Transaction};
use lmdb_sys::{MDB_FIRST, MDB_NEXT, MDB_SET_RANGE};
use mdbdict_core::{
    error::{DictError, Result},
    observe, SeqFn,
};

use crate::encoding::copy_terminated;

/// A traversal in progress: its own read snapshot plus the last key seen
///
/// LMDB cursors borrow their transaction, so the cursor is reopened on the
/// held snapshot for every step and repositioned after `position`. The
/// snapshot, and with it the reader slot, is released when the traversal is
/// dropped.
struct Traversal<'env> {
    txn: RoTransaction<'env>,
    position: Option<Vec<u8>>,
}

impl<'env> Traversal<'env> {
    fn begin(env: &'env Environment, name: &str) -> Result<Self> {
        let txn = env.begin_ro_txn().map_err(|e| {
            DictError::Transaction(format!("{}: txn_begin(read) dictionary: {}", name, e))
        })?;
        tracing::debug!("{}: opened traversal", name);
        Ok(Self {
            txn,
            position: None,
        })
    }

    /// Move one entry forward, copying it into the buffers
    ///
    /// Returns `Ok(false)` at the end of the entries.
    fn advance(
        &mut self,
        db: Database,
        name: &str,
        func: SeqFn,
        key_buf: &mut String,
        val_buf: &mut String,
    ) -> Result<bool> {
        let cursor = self.txn.open_ro_cursor(db).map_err(|e| {
            DictError::Storage(format!("{}: cursor_open dictionary: {}", name, e))
        })?;

        let found = match (func, self.position.as_deref()) {
            (SeqFn::Next, Some(last)) => match cursor.get(Some(last), None, MDB_SET_RANGE) {
                Ok((Some(key), _)) if key == last => cursor.get(None, None, MDB_NEXT),
                other => other,
            },
            _ => cursor.get(None, None, MDB_FIRST),
        };

        match found {
            Ok((key, value)) => {
                let key = key.unwrap_or_default();
                copy_terminated(key_buf, key);
                copy_terminated(val_buf, value);
                self.position = Some(key.to_vec());
                Ok(true)
            }
            Err(lmdb::Error::NotFound) => Ok(false),
            Err(e) => Err(DictError::Storage(format!(
                "{}: seeking dictionary: {}",
                name, e
            ))),
        }
    }

    fn end(self, name: &str) {
        self.txn.abort();
        tracing::debug!("{}: closed traversal", name);
    }
}

/// Drives "first / next" traversal over a table
///
/// States: idle (no traversal), open (traversal held between calls). Reaching
/// the end releases the traversal and returns to idle, so the next call
/// starts again from the first entry.
pub struct Sequencer<'env> {
    active: Option<Traversal<'env>>,
}

impl<'env> Default for Sequencer<'env> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'env> Sequencer<'env> {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Whether a traversal currently holds a read snapshot
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Perform one traversal step
    ///
    /// On `Ok(true)` the entry is in `key_buf` / `val_buf`. On `Ok(false)`
    /// the entries are exhausted and the snapshot has been released. On
    /// error the snapshot is released as well.
    pub fn step(
        &mut self,
        env: &'env Environment,
        db: Database,
        name: &str,
        func: SeqFn,
        key_buf: &mut String,
        val_buf: &mut String,
    ) -> Result<bool> {
        let mut traversal = match self.active.take() {
            Some(traversal) => traversal,
            None => Traversal::begin(env, name)?,
        };

        if traversal.advance(db, name, func, key_buf, val_buf)? {
            self.active = Some(traversal);
            observe::record_sequence_step(false);
            Ok(true)
        } else {
            traversal.end(name);
            observe::record_sequence_step(true);
            Ok(false)
        }
    }

    /// Release an unfinished traversal, returning whether one was open
    pub fn close(&mut self, name: &str) -> bool {
        match self.active.take() {
            Some(traversal) => {
                traversal.end(name);
                true
            }
            None => false,
        }
    }
}
