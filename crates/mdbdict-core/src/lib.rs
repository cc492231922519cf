//! mdbdict core: contract and types shared by dictionary backends
//!
//! A dictionary is a string-keyed map behind a uniform contract
//! (lookup / update / delete / sequence / lock / close). This crate holds:
//! - The [`Dict`] trait every backend implements
//! - Open and per-dictionary flags, including the duplicate-key policy
//! - Table tuning configuration ([`MdbConfig`])
//! - The error type and optional metrics hooks

pub mod config;
pub mod error;
pub mod observe;
pub mod traits;
pub mod types;

pub use config::{MdbConfig, SyncMode};
pub use error::{DictError, Result};
pub use traits::Dict;
pub use types::{
    Access, DictFlags, DuplicatePolicy, FileMeta, FileOwner, KeyForm, LockOp, OpenFlags,
    OwnerStatus, SeqFn, UpdateOutcome,
};
