//! On-disk consistency check: every row's file exists, has the cataloged
//! size, and still hashes to the cataloged digest.

use super::db::Catalog;
use super::error::{CatalogError, CatalogResult};
use super::types::{CatalogEntry, VerifyIssue};
use crate::fingerprint;

impl Catalog {
    /// Check every entry against the filesystem. Returns one issue per bad row;
    /// an empty list means the catalog invariant holds on disk.
    pub async fn verify(&self) -> CatalogResult<Vec<VerifyIssue>> {
        let entries = self.list().await?;
        let checked = entries.len();
        let issues = tokio::task::spawn_blocking(move || {
            entries.iter().filter_map(check_entry).collect::<Vec<_>>()
        })
        .await
        .map_err(|e| CatalogError::unavailable(format!("verify task failed: {}", e)))?;

        for issue in &issues {
            tracing::warn!("catalog verify: {}", issue);
        }
        tracing::info!(checked, issues = issues.len(), "catalog verified");
        Ok(issues)
    }
}

fn check_entry(entry: &CatalogEntry) -> Option<VerifyIssue> {
    let path = &entry.storage_path;
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Some(VerifyIssue::Missing {
                digest: entry.digest,
                path: path.clone(),
            })
        }
        Err(e) => {
            return Some(VerifyIssue::Unreadable {
                digest: entry.digest,
                path: path.clone(),
                reason: e.to_string(),
            })
        }
    };
    if meta.len() != entry.byte_size {
        return Some(VerifyIssue::SizeMismatch {
            digest: entry.digest,
            path: path.clone(),
            expected: entry.byte_size,
            actual: meta.len(),
        });
    }
    match fingerprint::fingerprint_path(path) {
        Ok(actual) if actual == entry.digest => None,
        Ok(actual) => Some(VerifyIssue::DigestMismatch {
            digest: entry.digest,
            path: path.clone(),
            actual,
        }),
        Err(e) => Some(VerifyIssue::Unreadable {
            digest: entry.digest,
            path: path.clone(),
            reason: format!("{:#}", e),
        }),
    }
}
