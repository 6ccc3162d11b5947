//! Shared catalog opening for commands that read or write the image directory.

use anyhow::{Context, Result};
use apod_core::config::ApodConfig;
use apod_core::Catalog;
use std::path::{Path, PathBuf};

/// Resolve the image directory and open its catalog.
pub(super) async fn open_catalog(
    cfg: &ApodConfig,
    image_dir: Option<&Path>,
) -> Result<(PathBuf, Catalog)> {
    let dir = cfg.resolve_image_dir(image_dir)?;
    let location = cfg.catalog_path(&dir);
    let catalog = Catalog::open_or_create(&location)
        .await
        .with_context(|| format!("cannot open catalog {}", location.display()))?;
    Ok((dir, catalog))
}
