use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Whether a map file may be trusted for privileged lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerStatus {
    /// Owned by root
    Trusted,
    /// Owned by anyone else, or the owner is unknown
    Untrusted,
}

/// Owner of the map file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOwner {
    /// Numeric owner (None on platforms without uids)
    pub uid: Option<u32>,
    pub status: OwnerStatus,
}

impl FileOwner {
    pub fn from_uid(uid: u32) -> Self {
        let status = if uid == 0 {
            OwnerStatus::Trusted
        } else {
            OwnerStatus::Untrusted
        };
        Self {
            uid: Some(uid),
            status,
        }
    }

    pub fn unknown() -> Self {
        Self {
            uid: None,
            status: OwnerStatus::Untrusted,
        }
    }

    pub fn is_trusted(&self) -> bool {
        self.status == OwnerStatus::Trusted
    }
}

/// File metadata captured when a table is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Modification time of the map file
    pub mtime: SystemTime,
    pub owner: FileOwner,
}
