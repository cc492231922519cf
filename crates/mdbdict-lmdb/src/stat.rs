use mdbdict_core::{error::Result, FileMeta, FileOwner};
use std::fs::{File, Metadata};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// A source file changed more recently than this is assumed to be mid-rebuild.
const STALE_GRACE: Duration = Duration::from_secs(100);

/// Read-only handle on the map file, kept open for change detection
#[derive(Debug)]
pub struct MapFile {
    file: File,
    meta: FileMeta,
}

impl MapFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let meta = file_meta(&file.metadata()?)?;
        Ok(Self { file, meta })
    }

    /// Metadata captured at open
    pub fn meta(&self) -> FileMeta {
        self.meta
    }

    /// Whether the file has been modified since it was opened
    pub fn changed(&self) -> Result<bool> {
        let mtime = self.file.metadata()?.modified()?;
        Ok(mtime != self.meta.mtime)
    }
}

pub fn file_meta(metadata: &Metadata) -> Result<FileMeta> {
    Ok(FileMeta {
        mtime: metadata.modified()?,
        owner: owner_of(metadata),
    })
}

#[cfg(unix)]
fn owner_of(metadata: &Metadata) -> FileOwner {
    use std::os::unix::fs::MetadataExt;
    FileOwner::from_uid(metadata.uid())
}

#[cfg(not(unix))]
fn owner_of(_metadata: &Metadata) -> FileOwner {
    FileOwner::unknown()
}

/// Whether `source` is newer than the map built from it
///
/// A source modified within the last 100 seconds is not reported; it is
/// probably being edited right before a rebuild.
pub fn source_is_newer(source: &Path, map_mtime: SystemTime, now: SystemTime) -> bool {
    let Ok(source_mtime) = std::fs::metadata(source).and_then(|m| m.modified()) else {
        return false;
    };
    let settled = match now.checked_sub(STALE_GRACE) {
        Some(cutoff) => source_mtime < cutoff,
        None => false,
    };
    source_mtime > map_mtime && settled
}

/// Log a warning when the map is older than its source file
pub fn warn_if_stale(source: &Path, map_path: &Path, map_mtime: SystemTime) {
    if source_is_newer(source, map_mtime, SystemTime::now()) {
        tracing::warn!(
            "database {} is older than source file {}",
            map_path.display(),
            source.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_map_file_captures_meta() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map.mdb");
        std::fs::write(&path, b"x").unwrap();

        let map = MapFile::open(&path).unwrap();
        let expected = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(map.meta().mtime, expected);
        assert!(!map.changed().unwrap());

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let uid = std::fs::metadata(&path).unwrap().uid();
            assert_eq!(map.meta().owner.uid, Some(uid));
        }
    }

    #[test]
    fn test_changed_after_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map.mdb");
        std::fs::write(&path, b"x").unwrap();
        let map = MapFile::open(&path).unwrap();

        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_modified(map.meta().mtime + Duration::from_secs(5))
            .unwrap();
        assert!(map.changed().unwrap());
    }

    #[test]
    fn test_missing_map_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(MapFile::open(&temp_dir.path().join("absent.mdb")).is_err());
    }

    #[test]
    fn test_source_is_newer() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("aliases");
        std::fs::write(&source, b"root: admin\n").unwrap();
        let source_mtime = std::fs::metadata(&source).unwrap().modified().unwrap();

        let map_mtime = source_mtime - Duration::from_secs(3600);
        let later = source_mtime + Duration::from_secs(1000);
        let just_now = source_mtime + Duration::from_secs(10);

        assert!(source_is_newer(&source, map_mtime, later));
        // Edited moments ago: not reported
        assert!(!source_is_newer(&source, map_mtime, just_now));
        // Map rebuilt after the source changed
        assert!(!source_is_newer(
            &source,
            source_mtime + Duration::from_secs(1),
            later
        ));
        assert!(!source_is_newer(
            &temp_dir.path().join("missing"),
            map_mtime,
            later
        ));
    }
}
