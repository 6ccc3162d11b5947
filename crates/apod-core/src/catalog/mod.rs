//! Persistent image catalog (SQLite via sqlx).
//!
//! One row per distinct content digest: observation date, storage path,
//! byte size and SHA-256. The UNIQUE constraint on the digest column is what
//! keeps concurrent ingesters from cataloging the same bytes twice.

pub mod db;
pub mod entries;
pub mod error;
pub mod types;
pub mod verify;

pub use db::Catalog;
pub use error::{CatalogError, CatalogResult};
pub use types::{CatalogEntry, VerifyIssue};
