//! Catalog error taxonomy.

use crate::fingerprint::ContentDigest;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Location not writable, schema incompatible, pool closed, or any other
    /// storage failure. Never retried inside the catalog.
    #[error("catalog store unavailable: {context}")]
    StoreUnavailable {
        context: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// An entry with this digest is already cataloged; the insert was rejected.
    #[error("digest {0} is already cataloged")]
    DuplicateDigest(ContentDigest),
}

impl CatalogError {
    pub(crate) fn unavailable(context: impl Into<String>) -> Self {
        CatalogError::StoreUnavailable {
            context: context.into(),
            source: None,
        }
    }

    /// Adapter for `map_err`: wraps a sqlx error with what we were doing.
    pub(crate) fn sqlx(context: &'static str) -> impl FnOnce(sqlx::Error) -> CatalogError {
        move |e| CatalogError::StoreUnavailable {
            context: format!("{}: {}", context, e),
            source: Some(e),
        }
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, CatalogError::StoreUnavailable { .. })
    }
}
