use crate::error::Result;
use crate::types::{LockOp, SeqFn, UpdateOutcome};

/// Generic dictionary contract shared by all map backends
///
/// One call runs to completion before the next starts; implementations keep
/// transaction and cursor state per handle and are not re-entrant.
///
/// Borrowed results point into buffers owned by the handle and are only
/// valid until the next call.
pub trait Dict {
    /// Name the dictionary was opened under (used in diagnostics)
    fn name(&self) -> &str;

    /// Look up a key
    ///
    /// Returns `Ok(None)` when the key is absent.
    fn lookup(&mut self, key: &str) -> Result<Option<&str>>;

    /// Insert or replace a value, subject to the duplicate policy
    fn update(&mut self, key: &str, value: &str) -> Result<UpdateOutcome>;

    /// Remove a key
    ///
    /// Returns `Ok(false)` when the key was not present.
    fn delete(&mut self, key: &str) -> Result<bool>;

    /// Step through all entries
    ///
    /// `SeqFn::First` restarts at the first entry, `SeqFn::Next` continues.
    /// Returns `Ok(None)` once the entries are exhausted, after which the
    /// traversal state has been released and a new traversal may start.
    fn sequence(&mut self, func: SeqFn) -> Result<Option<(&str, &str)>>;

    /// Cooperative locking hook
    ///
    /// Backends with their own concurrency control accept and ignore it.
    fn lock(&mut self, op: LockOp) -> Result<()> {
        let _ = op;
        Ok(())
    }

    /// Finalize pending work and release the handle
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
