use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the underlying file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Flags controlling how a table is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFlags {
    pub access: Access,

    /// Drop all entries at open and keep the write transaction for a bulk load
    pub truncate: bool,
}

impl OpenFlags {
    pub fn read_only() -> Self {
        Self {
            access: Access::ReadOnly,
            truncate: false,
        }
    }

    pub fn read_write() -> Self {
        Self {
            access: Access::ReadWrite,
            truncate: false,
        }
    }

    /// Read-write, truncating on open (bulk-load mode)
    pub fn truncate() -> Self {
        Self {
            access: Access::ReadWrite,
            truncate: true,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.access == Access::ReadOnly
    }
}

/// Physical representation of a key or value on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyForm {
    /// One NUL byte appended to key and value
    WithNul,
    /// Bytes stored as given
    WithoutNul,
}

/// What happens when an insert hits an existing key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Overwrite the existing value
    Replace,
    /// Keep the existing value silently
    Ignore,
    /// Keep the existing value and log a warning
    Warn,
    /// Keep the existing value and fail the update
    #[default]
    Fatal,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DuplicatePolicy::Replace => "replace",
            DuplicatePolicy::Ignore => "ignore",
            DuplicatePolicy::Warn => "warn",
            DuplicatePolicy::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(DuplicatePolicy::Replace),
            "ignore" => Ok(DuplicatePolicy::Ignore),
            "warn" => Ok(DuplicatePolicy::Warn),
            "fatal" => Ok(DuplicatePolicy::Fatal),
            other => Err(format!(
                "unknown duplicate policy '{}' (expected replace, ignore, warn or fatal)",
                other
            )),
        }
    }
}

/// Per-dictionary behavior flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DictFlags {
    /// Lowercase keys before every lookup, update and delete
    pub fold: bool,

    pub duplicates: DuplicatePolicy,

    /// Force one on-disk form; `None` lets the dictionary detect it
    pub encoding: Option<KeyForm>,

    /// Caller intends to lock the map; enables the stale-source warning at open
    pub lock: bool,
}

impl DictFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fold(mut self, fold: bool) -> Self {
        self.fold = fold;
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn with_encoding(mut self, form: KeyForm) -> Self {
        self.encoding = Some(form);
        self
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }
}

/// Traversal step kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqFn {
    First,
    Next,
}

/// Lock requests accepted by [`crate::Dict::lock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOp {
    Shared,
    Exclusive,
    Unlock,
}

/// Result of an update that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The value was written
    Stored,
    /// The key already existed and the policy kept the old value
    Duplicate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_flags() {
        assert!(OpenFlags::read_only().is_read_only());
        assert!(!OpenFlags::read_write().is_read_only());
        let trunc = OpenFlags::truncate();
        assert!(trunc.truncate);
        assert_eq!(trunc.access, Access::ReadWrite);
    }

    #[test]
    fn test_duplicate_policy_parse() {
        assert_eq!("replace".parse(), Ok(DuplicatePolicy::Replace));
        assert_eq!("IGNORE".parse(), Ok(DuplicatePolicy::Ignore));
        assert_eq!("warn".parse(), Ok(DuplicatePolicy::Warn));
        assert_eq!("fatal".parse(), Ok(DuplicatePolicy::Fatal));
        assert!("maybe".parse::<DuplicatePolicy>().is_err());

        for policy in [
            DuplicatePolicy::Replace,
            DuplicatePolicy::Ignore,
            DuplicatePolicy::Warn,
            DuplicatePolicy::Fatal,
        ] {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
    }

    #[test]
    fn test_dict_flags_builder() {
        let flags = DictFlags::new()
            .with_fold(true)
            .with_duplicates(DuplicatePolicy::Ignore)
            .with_encoding(KeyForm::WithoutNul)
            .with_lock(true);
        assert!(flags.fold);
        assert!(flags.lock);
        assert_eq!(flags.duplicates, DuplicatePolicy::Ignore);
        assert_eq!(flags.encoding, Some(KeyForm::WithoutNul));

        let defaults = DictFlags::default();
        assert_eq!(defaults.duplicates, DuplicatePolicy::Fatal);
        assert_eq!(defaults.encoding, None);
    }
}
