//! `apod verify` – check cataloged files against their rows.

use anyhow::Result;
use apod_core::config::ApodConfig;
use std::path::Path;

use super::catalog::open_catalog;

pub async fn run_verify(cfg: &ApodConfig, image_dir: Option<&Path>) -> Result<()> {
    let (_, catalog) = open_catalog(cfg, image_dir).await?;
    let total = catalog.count().await?;
    let issues = catalog.verify().await?;
    catalog.close().await;

    for issue in &issues {
        println!("{}", issue);
    }
    if !issues.is_empty() {
        anyhow::bail!("{} of {} cataloged files failed verification", issues.len(), total);
    }
    println!("{} cataloged files OK.", total);
    Ok(())
}
