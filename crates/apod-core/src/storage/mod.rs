//! Disk I/O and file lifecycle for ingested images.
//!
//! Bytes go to a hidden `.part` temp file in the destination directory, are
//! fsynced, then persisted to the final name with no-clobber semantics: an
//! existing file is never replaced, and a crash never leaves a partial file
//! under a final name.

mod writer;

pub use writer::{FinalizeError, StorageWriter};

use std::path::Path;

/// Temporary file suffix used before the atomic persist.
pub const TEMP_SUFFIX: &str = ".part";

/// Prefix for temp files so they sort away from real images (`.apod-XXXX.part`).
pub const TEMP_PREFIX: &str = ".apod-";

/// Fsync a directory so a just-persisted entry survives power loss.
/// Best effort: some filesystems refuse to open directories for sync.
pub fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    {
        match std::fs::File::open(dir).and_then(|d| d.sync_all()) {
            Ok(()) => {}
            Err(e) => tracing::debug!(dir = %dir.display(), "directory fsync skipped: {}", e),
        }
    }
    #[cfg(not(unix))]
    let _ = dir;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(TEMP_SUFFIX))
            .collect()
    }

    #[test]
    fn create_write_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.jpg");

        let mut writer = StorageWriter::create_in(dir.path()).unwrap();
        let tp = writer.temp_path().to_path_buf();
        assert!(tp
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(TEMP_PREFIX));
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        writer.sync().unwrap();
        writer.finalize_new(&final_path).unwrap();

        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"hello world");
        assert!(temp_files(dir.path()).is_empty());
    }

    #[test]
    fn finalize_never_clobbers() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("taken.jpg");
        std::fs::write(&final_path, b"unrelated").unwrap();

        let mut writer = StorageWriter::create_in(dir.path()).unwrap();
        writer.write_all(b"new content").unwrap();
        let writer = match writer.finalize_new(&final_path) {
            Err(FinalizeError::Exists(w)) => w,
            other => panic!("expected Exists, got {:?}", other),
        };
        assert_eq!(std::fs::read(&final_path).unwrap(), b"unrelated");

        let other_path = dir.path().join("taken_1.jpg");
        writer.finalize_new(&other_path).unwrap();
        assert_eq!(std::fs::read(&other_path).unwrap(), b"new content");
        assert!(temp_files(dir.path()).is_empty());
    }

    #[test]
    fn dropped_writer_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut writer = StorageWriter::create_in(dir.path()).unwrap();
            writer.write_all(b"partial").unwrap();
            assert_eq!(temp_files(dir.path()).len(), 1);
        }
        assert!(temp_files(dir.path()).is_empty());
    }
}
