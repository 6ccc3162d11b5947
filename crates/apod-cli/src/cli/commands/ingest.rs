//! `apod ingest <file> --date <date>` – add a local image to the catalog.

use anyhow::{Context, Result};
use apod_core::apod::resolve_date;
use apod_core::config::ApodConfig;
use apod_core::Ingestor;
use std::path::Path;

use super::catalog::open_catalog;
use super::fetch::print_outcome;

pub async fn run_ingest(
    cfg: &ApodConfig,
    file: &Path,
    date: &str,
    name: Option<&str>,
    image_dir: Option<&Path>,
) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let date = resolve_date(Some(date), today)?;
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("cannot read {}", file.display()))?;
    let name = match name {
        Some(n) => n.to_string(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let (dir, catalog) = open_catalog(cfg, image_dir).await?;
    let ingestor = Ingestor::new(catalog);
    let result = ingestor.ingest(date, &name, &bytes, &dir).await;
    ingestor.catalog().close().await;
    let outcome = result?;

    print_outcome(&file.display().to_string(), bytes.len(), &outcome);
    Ok(())
}
