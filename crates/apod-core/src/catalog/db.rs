//! SQLite-backed catalog handle.
//!
//! Handles connection, schema creation and compatibility checks. Entry reads
//! and writes live in `entries`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::error::{CatalogError, CatalogResult};

/// Older catalogs used this table name with a different layout; keeping the
/// name means such files are rejected instead of silently extended.
pub(crate) const TABLE: &str = "apod_images";

/// Columns the current schema reads and writes.
const REQUIRED_COLUMNS: [&str; 4] = ["observation_date", "storage_path", "byte_size", "sha256"];

/// Handle to the catalog database.
///
/// Cheap to clone; clones share one connection pool. Multiple handles (or
/// processes) may point at the same file: WAL plus a busy timeout serialize
/// writers, and the UNIQUE digest column arbitrates duplicate inserts.
#[derive(Clone)]
pub struct Catalog {
    pub(crate) pool: Pool<Sqlite>,
    location: PathBuf,
}

impl Catalog {
    /// Open the catalog at `location`, creating the file and schema if absent.
    ///
    /// Idempotent: an existing compatible catalog is opened as is. Fails with
    /// `StoreUnavailable` when the location cannot be created/opened or an
    /// existing table lacks the columns or the unique digest constraint.
    pub async fn open_or_create(location: impl AsRef<Path>) -> CatalogResult<Self> {
        let location = location.as_ref();
        if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CatalogError::unavailable(format!("create {}: {}", parent.display(), e))
            })?;
        }

        let opts = SqliteConnectOptions::new()
            .filename(location)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Overlapping runs wait on each other's write locks instead of failing.
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(opts)
            .await
            .map_err(|e| CatalogError::StoreUnavailable {
                context: format!("open {}: {}", location.display(), e),
                source: Some(e),
            })?;

        let catalog = Catalog {
            pool,
            location: location.to_path_buf(),
        };
        catalog.migrate().await?;
        tracing::debug!(location = %location.display(), "catalog opened");
        Ok(catalog)
    }

    /// Path of the backing database file.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Release the connection pool. Safe to call more than once; later
    /// operations on any clone fail with `StoreUnavailable`.
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::debug!(location = %self.location.display(), "catalog closed");
        }
    }

    async fn migrate(&self) -> CatalogResult<()> {
        let table_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        )
        .bind(TABLE)
        .fetch_one(&self.pool)
        .await
        .map_err(CatalogError::sqlx("inspect schema"))?;

        if table_exists {
            return self.check_compatible().await;
        }

        // `sha256` is the dedup key: the UNIQUE constraint is the only thing that
        // decides which of two racing inserts of the same content wins.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS apod_images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                observation_date TEXT NOT NULL,
                storage_path TEXT NOT NULL,
                byte_size INTEGER NOT NULL CHECK (byte_size >= 0),
                sha256 TEXT NOT NULL UNIQUE,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(CatalogError::sqlx("create table"))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_apod_images_date ON apod_images(observation_date)",
        )
        .execute(&self.pool)
        .await
        .map_err(CatalogError::sqlx("create index"))?;

        // A concurrent opener may have created a different table between our
        // existence check and CREATE IF NOT EXISTS.
        self.check_compatible().await
    }

    /// Reject tables missing required columns or the unique digest constraint
    /// (e.g. the legacy `date, full_path, File_size, SHA_256` layout).
    async fn check_compatible(&self) -> CatalogResult<()> {
        let columns: Vec<(i32, String, String, i32, Option<String>, i32)> =
            sqlx::query_as("PRAGMA table_info(apod_images)")
                .fetch_all(&self.pool)
                .await
                .map_err(CatalogError::sqlx("read table info"))?;
        let names: HashSet<&str> = columns.iter().map(|(_, n, ..)| n.as_str()).collect();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !names.contains(*c))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::unavailable(format!(
                "incompatible schema in {}: table {} is missing columns: {}",
                self.location.display(),
                TABLE,
                missing.join(", ")
            )));
        }

        let digest_unique: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM pragma_index_list('apod_images') AS il,
                     pragma_index_info(il.name) AS ii
                WHERE il."unique" = 1 AND ii.name = 'sha256'
            )
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(CatalogError::sqlx("read index list"))?;
        if !digest_unique {
            return Err(CatalogError::unavailable(format!(
                "incompatible schema in {}: sha256 column has no uniqueness constraint",
                self.location.display()
            )));
        }
        Ok(())
    }
}

/// Current time as Unix seconds (for `created_at`).
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory catalog for tests (no disk I/O).
pub(crate) async fn open_memory() -> CatalogResult<Catalog> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .map_err(CatalogError::sqlx("open memory"))?;
    let catalog = Catalog {
        pool,
        location: PathBuf::from(":memory:"),
    };
    catalog.migrate().await?;
    Ok(catalog)
}
