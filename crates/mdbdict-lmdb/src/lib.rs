//! LMDB-backed dictionary adapter
//!
//! Exposes an LMDB map file through the generic [`mdbdict_core::Dict`]
//! contract.
//!
//! Key features:
//! - One transaction per call, or one long write transaction for bulk loads
//!   (open with truncate)
//! - Detection of maps written with or without a trailing NUL, locking onto
//!   the form the data actually uses
//! - Duplicate-key policy: replace, ignore, warn or fatal
//! - Restartable first/next traversal on a read snapshot, released on
//!   exhaustion or close
//! - No cooperative locking; LMDB's MVCC isolates readers from the writer

pub mod cursor;
pub mod dict;
pub mod encoding;
pub mod stat;
pub mod store;
pub mod txn;

pub use dict::LmdbDict;
pub use encoding::{Encoding, DEFAULT_WRITE_FORM};
pub use store::{mdb_path, LmdbTable, MDB_SUFFIX};
