pub mod flags;
pub mod meta;

pub use flags::{
    Access, DictFlags, DuplicatePolicy, KeyForm, LockOp, OpenFlags, SeqFn, UpdateOutcome,
};
pub use meta::{FileMeta, FileOwner, OwnerStatus};
