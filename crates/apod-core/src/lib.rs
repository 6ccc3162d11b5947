//! Content-addressed ingestion and dedup catalog for Astronomy Picture of the
//! Day images.
//!
//! The core is `fingerprint` → `catalog` → `ingest`: bytes are hashed, looked
//! up by exact digest, and written plus cataloged only when new. `apod` and
//! `background` are the thin collaborators around it.

pub mod config;
pub mod logging;

pub mod apod;
pub mod background;
pub mod catalog;
pub mod fingerprint;
pub mod ingest;
pub mod storage;
pub mod url_model;

pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use fingerprint::{fingerprint, ContentDigest};
pub use ingest::{IngestError, IngestOutcome, Ingestor};
