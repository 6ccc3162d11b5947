//! Entry operations: exact-digest lookup, reject-on-duplicate insert, listing.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::path::PathBuf;

use super::db::{unix_timestamp, Catalog};
use super::error::{CatalogError, CatalogResult};
use super::types::CatalogEntry;
use crate::fingerprint::ContentDigest;

const DATE_FORMAT: &str = "%Y-%m-%d";

impl Catalog {
    /// True iff a row with exactly this digest exists.
    pub async fn contains(&self, digest: &ContentDigest) -> CatalogResult<bool> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM apod_images WHERE sha256 = ?1)")
                .bind(digest.to_hex())
                .fetch_one(&self.pool)
                .await
                .map_err(CatalogError::sqlx("lookup digest"))?;
        Ok(found)
    }

    /// Insert one entry. Fails with `DuplicateDigest` if the digest is already
    /// cataloged; the existing row is left untouched.
    pub async fn insert(&self, entry: &CatalogEntry) -> CatalogResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO apod_images (
                observation_date, storage_path, byte_size, sha256, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(entry.observation_date.format(DATE_FORMAT).to_string())
        .bind(entry.storage_path.to_string_lossy().into_owned())
        .bind(entry.byte_size as i64)
        .bind(entry.digest.to_hex())
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::debug!(
                    digest = %entry.digest,
                    path = %entry.storage_path.display(),
                    date = %entry.observation_date,
                    "catalog entry inserted"
                );
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(CatalogError::DuplicateDigest(entry.digest))
            }
            Err(e) => Err(CatalogError::sqlx("insert entry")(e)),
        }
    }

    /// Fetch the entry for a digest, if cataloged.
    pub async fn get(&self, digest: &ContentDigest) -> CatalogResult<Option<CatalogEntry>> {
        let row = sqlx::query(
            r#"
            SELECT observation_date, storage_path, byte_size, sha256
            FROM apod_images
            WHERE sha256 = ?1
            "#,
        )
        .bind(digest.to_hex())
        .fetch_optional(&self.pool)
        .await
        .map_err(CatalogError::sqlx("get entry"))?;

        row.as_ref().map(entry_from_row).transpose()
    }

    /// All entries, newest observation date first.
    pub async fn list(&self) -> CatalogResult<Vec<CatalogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT observation_date, storage_path, byte_size, sha256
            FROM apod_images
            ORDER BY observation_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(CatalogError::sqlx("list entries"))?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Entries first ingested for `date`. Usually zero or one; content reused
    /// on a later date stays under the date it was first seen.
    pub async fn list_for_date(&self, date: NaiveDate) -> CatalogResult<Vec<CatalogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT observation_date, storage_path, byte_size, sha256
            FROM apod_images
            WHERE observation_date = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(date.format(DATE_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(CatalogError::sqlx("list entries for date"))?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Number of cataloged entries.
    pub async fn count(&self) -> CatalogResult<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM apod_images")
            .fetch_one(&self.pool)
            .await
            .map_err(CatalogError::sqlx("count entries"))?;
        Ok(n.max(0) as u64)
    }
}

fn entry_from_row(row: &SqliteRow) -> CatalogResult<CatalogEntry> {
    let date_str: String = row
        .try_get("observation_date")
        .map_err(CatalogError::sqlx("decode observation_date"))?;
    let storage_path: String = row
        .try_get("storage_path")
        .map_err(CatalogError::sqlx("decode storage_path"))?;
    let byte_size: i64 = row
        .try_get("byte_size")
        .map_err(CatalogError::sqlx("decode byte_size"))?;
    let sha256: String = row
        .try_get("sha256")
        .map_err(CatalogError::sqlx("decode sha256"))?;

    let observation_date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
        CatalogError::unavailable(format!("corrupt observation_date {:?}: {}", date_str, e))
    })?;
    let digest = ContentDigest::from_hex(&sha256)
        .map_err(|e| CatalogError::unavailable(format!("corrupt row: {}", e)))?;

    Ok(CatalogEntry {
        observation_date,
        storage_path: PathBuf::from(storage_path),
        byte_size: byte_size.max(0) as u64,
        digest,
    })
}
