//! Ingestion coordinator: turns downloaded bytes into either a no-op (content
//! already cataloged) or a new file plus a new catalog row.
//!
//! Order of effects for new content: temp file written and fsynced, persisted
//! under a free name (never replacing an existing file), then the catalog
//! insert. If the insert loses a race for the digest or the catalog fails, the
//! file we just persisted is removed again (unless the winner adopted it), so
//! a catalog row and its file are either both observed or neither is.
//!
//! File placement is blocking I/O and runs on the blocking pool.

use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogEntry, CatalogError};
use crate::fingerprint::{self, ContentDigest};
use crate::storage::{self, FinalizeError, StorageWriter};
use crate::url_model;

/// Upper bound on `name_N` variants tried before giving up on a directory.
const MAX_NAME_ATTEMPTS: usize = 10_000;

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// New content: written to `path` and cataloged.
    Ingested {
        digest: ContentDigest,
        path: PathBuf,
        size: u64,
    },
    /// Content was already cataloged; nothing was written.
    AlreadyCached {
        digest: ContentDigest,
        existing_path: PathBuf,
    },
}

impl IngestOutcome {
    pub fn digest(&self) -> &ContentDigest {
        match self {
            IngestOutcome::Ingested { digest, .. } | IngestOutcome::AlreadyCached { digest, .. } => {
                digest
            }
        }
    }

    /// Where the content lives on disk (what to hand to `apply_background`).
    pub fn path(&self) -> &Path {
        match self {
            IngestOutcome::Ingested { path, .. } => path,
            IngestOutcome::AlreadyCached { existing_path, .. } => existing_path,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, IngestOutcome::Ingested { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Disk failure; no catalog row was added.
    #[error("i/o error on {} while ingesting {date} (sha256 {digest}): {source}", .path.display())]
    Io {
        date: NaiveDate,
        digest: ContentDigest,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The catalog could not be consulted or updated; dedup cannot be guaranteed.
    #[error("catalog unavailable while ingesting {date} (sha256 {digest})")]
    StoreUnavailable {
        date: NaiveDate,
        digest: ContentDigest,
        #[source]
        source: CatalogError,
    },
}

/// How the bytes ended up under their final name.
enum Placement {
    /// We persisted a new file; ours to remove if the insert does not stick.
    Written(PathBuf),
    /// An uncataloged file with identical content was already there.
    Adopted(PathBuf),
}

impl Placement {
    fn path(&self) -> &Path {
        match self {
            Placement::Written(p) | Placement::Adopted(p) => p,
        }
    }
}

/// Single entry point for ingesting image bytes against one catalog.
#[derive(Clone)]
pub struct Ingestor {
    catalog: Catalog,
}

impl Ingestor {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Ingest `bytes` observed on `date`, storing new content in `dest_dir`
    /// under (a collision-free variant of) `suggested_name`.
    ///
    /// Content already cataloged by digest is never written again, whatever
    /// the date or name. Empty input is accepted and stored as a zero-byte file.
    pub async fn ingest(
        &self,
        date: NaiveDate,
        suggested_name: &str,
        bytes: &[u8],
        dest_dir: &Path,
    ) -> Result<IngestOutcome, IngestError> {
        let digest = fingerprint::fingerprint(bytes);

        let existing = self
            .catalog
            .get(&digest)
            .await
            .map_err(|source| IngestError::StoreUnavailable {
                date,
                digest,
                source,
            })?;
        if let Some(entry) = existing {
            tracing::info!(
                %digest,
                %date,
                path = %entry.storage_path.display(),
                "content already cataloged; not writing"
            );
            return Ok(IngestOutcome::AlreadyCached {
                digest,
                existing_path: entry.storage_path,
            });
        }

        self.store_new(date, digest, suggested_name, bytes, dest_dir)
            .await
    }

    /// Place the bytes on disk and record them. Called once the lookup has
    /// found nothing; the catalog's unique digest constraint settles races
    /// with other ingesters that got past the same lookup.
    pub(crate) async fn store_new(
        &self,
        date: NaiveDate,
        digest: ContentDigest,
        suggested_name: &str,
        bytes: &[u8],
        dest_dir: &Path,
    ) -> Result<IngestOutcome, IngestError> {
        let io_err = |path: PathBuf, source: io::Error| IngestError::Io {
            date,
            digest,
            path,
            source,
        };

        let name = url_model::storage_filename(suggested_name);
        let placed = {
            let dest_dir = dest_dir.to_path_buf();
            let bytes = bytes.to_vec();
            tokio::task::spawn_blocking(move || {
                std::fs::create_dir_all(&dest_dir).map_err(|e| (dest_dir.clone(), e))?;
                let dir = std::fs::canonicalize(&dest_dir).map_err(|e| (dest_dir.clone(), e))?;
                let placement = place_bytes(&dir, &name, &bytes, &digest)?;
                storage::sync_dir(&dir);
                Ok::<_, (PathBuf, io::Error)>(placement)
            })
            .await
        };
        let placement = match placed {
            Ok(Ok(placement)) => placement,
            Ok(Err((path, e))) => return Err(io_err(path, e)),
            Err(join) => {
                return Err(io_err(
                    dest_dir.to_path_buf(),
                    io::Error::new(io::ErrorKind::Other, format!("placement task failed: {}", join)),
                ))
            }
        };

        self.record(date, digest, placement, bytes.len() as u64).await
    }

    /// Catalog a placed file. If the insert does not stick, our own copy is
    /// removed unless it is the file the winning row points at.
    async fn record(
        &self,
        date: NaiveDate,
        digest: ContentDigest,
        placement: Placement,
        size: u64,
    ) -> Result<IngestOutcome, IngestError> {
        let entry = CatalogEntry {
            observation_date: date,
            storage_path: placement.path().to_path_buf(),
            byte_size: size,
            digest,
        };

        match self.catalog.insert(&entry).await {
            Ok(()) => {
                tracing::info!(
                    %digest,
                    %date,
                    path = %entry.storage_path.display(),
                    size,
                    "ingested new content"
                );
                Ok(IngestOutcome::Ingested {
                    digest,
                    path: entry.storage_path,
                    size,
                })
            }
            Err(CatalogError::DuplicateDigest(_)) => {
                // Another ingester cataloged the same content after our lookup,
                // possibly by adopting the very file we persisted.
                let winner = self.catalog.get(&digest).await.map_err(|source| {
                    IngestError::StoreUnavailable {
                        date,
                        digest,
                        source,
                    }
                })?;
                let Some(winner) = winner else {
                    return Err(IngestError::StoreUnavailable {
                        date,
                        digest,
                        source: CatalogError::unavailable(
                            "insert reported a duplicate digest but no row was found",
                        ),
                    });
                };
                if winner.storage_path.as_path() != placement.path() {
                    discard(&placement).await;
                }
                tracing::info!(
                    %digest,
                    %date,
                    path = %winner.storage_path.display(),
                    "lost ingest race; using existing entry"
                );
                Ok(IngestOutcome::AlreadyCached {
                    digest,
                    existing_path: winner.storage_path,
                })
            }
            Err(source) => {
                discard(&placement).await;
                Err(IngestError::StoreUnavailable {
                    date,
                    digest,
                    source,
                })
            }
        }
    }
}

/// Find a free name in `dir` and persist `bytes` under it.
///
/// Names taken by different content are skipped. A name already holding
/// identical content (an orphan with no catalog row) is adopted as is.
fn place_bytes(
    dir: &Path,
    name: &str,
    bytes: &[u8],
    digest: &ContentDigest,
) -> Result<Placement, (PathBuf, io::Error)> {
    let mut writer: Option<StorageWriter> = None;

    for candidate in url_model::candidate_names(name).take(MAX_NAME_ATTEMPTS) {
        let path = dir.join(&candidate);
        match std::fs::symlink_metadata(&path) {
            Ok(meta) => {
                if meta.is_file()
                    && meta.len() == bytes.len() as u64
                    && matches!(fingerprint::fingerprint_path(&path), Ok(d) if d == *digest)
                {
                    tracing::debug!(path = %path.display(), "adopting uncataloged file with identical content");
                    return Ok(Placement::Adopted(path));
                }
                tracing::debug!(path = %path.display(), "name taken by other content");
                continue;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err((path, e)),
        }

        let w = match writer.take() {
            Some(w) => w,
            None => write_temp(dir, bytes).map_err(|e| (dir.to_path_buf(), e))?,
        };
        match w.finalize_new(&path) {
            Ok(()) => return Ok(Placement::Written(path)),
            // Someone created this name between our check and the persist.
            Err(FinalizeError::Exists(w)) => writer = Some(w),
            Err(FinalizeError::Io(e)) => return Err((path, e)),
        }
    }

    Err((
        dir.join(name),
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free file name after {} attempts", MAX_NAME_ATTEMPTS),
        ),
    ))
}

fn write_temp(dir: &Path, bytes: &[u8]) -> io::Result<StorageWriter> {
    let mut w = StorageWriter::create_in(dir)?;
    w.write_all(bytes)?;
    w.sync()?;
    Ok(w)
}

/// Undo a placement after a failed insert. Adopted files predate us and stay.
async fn discard(placement: &Placement) {
    if let Placement::Written(path) = placement {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "removed uncataloged copy"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "could not remove uncataloged copy: {}", e),
        }
    }
}
