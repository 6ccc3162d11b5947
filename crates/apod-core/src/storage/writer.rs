//! Temp-file writer with no-clobber finalize.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use super::{TEMP_PREFIX, TEMP_SUFFIX};

/// Writer for one image's temp file. Dropping it without `finalize_new`
/// removes the temp file.
pub struct StorageWriter {
    file: NamedTempFile,
}

/// Why `finalize_new` did not persist the file.
pub enum FinalizeError {
    /// The final path already exists. The writer is handed back so the caller
    /// can try another name without rewriting the bytes.
    Exists(StorageWriter),
    Io(io::Error),
}

impl fmt::Debug for FinalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalizeError::Exists(w) => write!(f, "Exists({})", w.temp_path().display()),
            FinalizeError::Io(e) => write!(f, "Io({:?})", e),
        }
    }
}

impl StorageWriter {
    /// Create a fresh temp file in `dir` (same filesystem as the final path,
    /// so the persist is a link/rename, never a copy).
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?;
        Ok(StorageWriter { file })
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }

    /// Flush and fsync file data. Call before `finalize_new` for durability.
    pub fn sync(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.as_file().sync_all()
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Atomically move the temp file to `final_path`, failing with `Exists`
    /// instead of replacing a file that is already there.
    pub fn finalize_new(self, final_path: &Path) -> Result<(), FinalizeError> {
        match self.file.persist_noclobber(final_path) {
            Ok(_) => Ok(()),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(FinalizeError::Exists(StorageWriter { file: e.file }))
            }
            Err(e) => Err(FinalizeError::Io(e.error)),
        }
    }
}
