use lmdb::{Database, Environment, RoTransaction, RwTransaction, Transaction};
use mdbdict_core::{
    error::{DictError, Result},
    observe,
};
use std::time::Instant;

/// Decides which transaction an operation runs in
///
/// In bulk-load mode an ambient write transaction is held for the life of
/// the dictionary and every operation runs inside it. Otherwise each
/// operation begins, and finishes, a private transaction of its own.
pub struct TxnScopes<'env> {
    env: &'env Environment,
    ambient: Option<RwTransaction<'env>>,
}

/// Transaction used by a single read operation
pub enum ReadScope<'s, 'env> {
    Ambient(&'s RwTransaction<'env>),
    Private(RoTransaction<'env>),
}

/// Transaction used by a single write operation
pub enum WriteScope<'s, 'env> {
    Ambient(&'s mut RwTransaction<'env>),
    Private(RwTransaction<'env>),
}

impl<'env> TxnScopes<'env> {
    pub fn new(env: &'env Environment, ambient: Option<RwTransaction<'env>>) -> Self {
        Self { env, ambient }
    }

    /// Whether an ambient (bulk-load) transaction is held
    pub fn has_ambient(&self) -> bool {
        self.ambient.is_some()
    }

    pub fn read(&self, name: &str) -> Result<ReadScope<'_, 'env>> {
        match &self.ambient {
            Some(txn) => Ok(ReadScope::Ambient(txn)),
            None => self.begin_read(name).map(ReadScope::Private),
        }
    }

    pub fn write(&mut self, name: &str) -> Result<WriteScope<'_, 'env>> {
        match &mut self.ambient {
            Some(txn) => Ok(WriteScope::Ambient(txn)),
            None => self
                .env
                .begin_rw_txn()
                .map(WriteScope::Private)
                .map_err(|e| {
                    DictError::Transaction(format!("{}: txn_begin(write) dictionary: {}", name, e))
                }),
        }
    }

    /// A fresh read-only transaction, ignoring any ambient one
    pub fn begin_read(&self, name: &str) -> Result<RoTransaction<'env>> {
        self.env.begin_ro_txn().map_err(|e| {
            DictError::Transaction(format!("{}: txn_begin(read) dictionary: {}", name, e))
        })
    }

    /// Commit the ambient transaction, if any
    pub fn close(&mut self, name: &str) -> Result<()> {
        if let Some(txn) = self.ambient.take() {
            txn.commit().map_err(|e| {
                DictError::Transaction(format!("{}: closing dictionary: {}", name, e))
            })?;
            tracing::debug!("{}: committed bulk-load transaction", name);
        }
        Ok(())
    }

    /// Abort the ambient transaction, returning whether one was held
    pub fn abort_ambient(&mut self) -> bool {
        match self.ambient.take() {
            Some(txn) => {
                txn.abort();
                true
            }
            None => false,
        }
    }
}

impl<'s, 'env> ReadScope<'s, 'env> {
    pub fn get(&self, db: Database, key: &[u8]) -> lmdb::Result<&[u8]> {
        match self {
            ReadScope::Ambient(txn) => txn.get(db, &key),
            ReadScope::Private(txn) => txn.get(db, &key),
        }
    }

    /// Release a private read transaction; the ambient one stays open
    pub fn finish(self) {
        if let ReadScope::Private(txn) = self {
            txn.abort();
        }
    }
}

impl<'s, 'env> WriteScope<'s, 'env> {
    pub fn txn(&mut self) -> &mut RwTransaction<'env> {
        match self {
            WriteScope::Ambient(txn) => &mut **txn,
            WriteScope::Private(txn) => txn,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, WriteScope::Private(_))
    }

    /// Commit a private transaction; the ambient one is left to `close`
    ///
    /// Dropping a scope instead of finishing it aborts a private
    /// transaction.
    pub fn finish(self, name: &str) -> Result<()> {
        if let WriteScope::Private(txn) = self {
            let started = Instant::now();
            txn.commit().map_err(|e| {
                DictError::Transaction(format!("error committing MDB database {}: {}", name, e))
            })?;
            observe::record_commit(started.elapsed());
        }
        Ok(())
    }
}
