//! Types stored in and reported by the catalog.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::fingerprint::ContentDigest;

/// One ingested image. Created once per distinct digest; never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// APOD date the image belongs to.
    pub observation_date: NaiveDate,
    /// Absolute path of the stored file.
    pub storage_path: PathBuf,
    /// Exact length of the stored file.
    pub byte_size: u64,
    pub digest: ContentDigest,
}

/// A row whose file on disk no longer matches what the catalog recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyIssue {
    Missing {
        digest: ContentDigest,
        path: PathBuf,
    },
    SizeMismatch {
        digest: ContentDigest,
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
    DigestMismatch {
        digest: ContentDigest,
        path: PathBuf,
        actual: ContentDigest,
    },
    Unreadable {
        digest: ContentDigest,
        path: PathBuf,
        reason: String,
    },
}

impl VerifyIssue {
    pub fn path(&self) -> &std::path::Path {
        match self {
            VerifyIssue::Missing { path, .. }
            | VerifyIssue::SizeMismatch { path, .. }
            | VerifyIssue::DigestMismatch { path, .. }
            | VerifyIssue::Unreadable { path, .. } => path,
        }
    }
}

impl fmt::Display for VerifyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyIssue::Missing { digest, path } => {
                write!(f, "{}: missing (sha256 {})", path.display(), digest)
            }
            VerifyIssue::SizeMismatch {
                path,
                expected,
                actual,
                ..
            } => write!(
                f,
                "{}: size mismatch: cataloged {} bytes, found {}",
                path.display(),
                expected,
                actual
            ),
            VerifyIssue::DigestMismatch {
                digest,
                path,
                actual,
            } => write!(
                f,
                "{}: content changed: cataloged sha256 {}, found {}",
                path.display(),
                digest,
                actual
            ),
            VerifyIssue::Unreadable { path, reason, .. } => {
                write!(f, "{}: unreadable: {}", path.display(), reason)
            }
        }
    }
}
