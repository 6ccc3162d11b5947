//! `apod fetch [date]` – download the day's picture, store it once, set it as background.

use anyhow::{Context, Result};
use apod_core::apod::{resolve_date, ApodClient};
use apod_core::background::{BackgroundSetter, CommandBackground};
use apod_core::config::ApodConfig;
use apod_core::{IngestOutcome, Ingestor};
use std::path::PathBuf;

use super::catalog::open_catalog;

#[derive(Debug, Default)]
pub struct FetchArgs {
    pub date: Option<String>,
    pub image_dir: Option<PathBuf>,
    pub no_background: bool,
}

pub async fn run_fetch(cfg: &ApodConfig, args: FetchArgs) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let date = resolve_date(args.date.as_deref(), today)?;
    let client = ApodClient::new(&cfg.api);

    let info = {
        let client = client.clone();
        tokio::task::spawn_blocking(move || client.fetch_metadata(date))
            .await?
            .with_context(|| format!("fetching APOD metadata for {}", date))?
    };
    if !info.is_image() {
        anyhow::bail!(
            "APOD for {} is a {} ({}), not an image",
            info.date,
            info.media_type,
            info.url
        );
    }

    let url = info.image_url().to_string();
    let bytes = {
        let url = url.clone();
        tokio::task::spawn_blocking(move || client.download(&url))
            .await?
            .context("downloading image")?
    };

    let (dir, catalog) = open_catalog(cfg, args.image_dir.as_deref()).await?;
    let ingestor = Ingestor::new(catalog);
    let result = ingestor
        .ingest(info.date, &info.suggested_name(), &bytes, &dir)
        .await;
    ingestor.catalog().close().await;
    let outcome = result?;

    if !info.title.is_empty() {
        println!("Title:    {}", info.title);
    }
    print_outcome(&url, bytes.len(), &outcome);

    if cfg.background.enabled && !args.no_background {
        // The image is already stored; a failed background change is only reported.
        let applied = CommandBackground::from_config(&cfg.background)
            .and_then(|bg| bg.apply_background(outcome.path()));
        if let Err(e) = applied {
            tracing::warn!("setting background failed: {:#}", e);
            eprintln!("warning: could not set desktop background: {:#}", e);
        }
    }
    Ok(())
}

/// The info block printed after an ingest.
pub(super) fn print_outcome(source: &str, size: usize, outcome: &IngestOutcome) {
    println!("Source:   {}", source);
    println!("Path:     {}", outcome.path().display());
    println!("Size:     {} bytes", size);
    println!("SHA-256:  {}", outcome.digest());
    match outcome {
        IngestOutcome::Ingested { .. } => println!("Outcome:  stored new image"),
        IngestOutcome::AlreadyCached { .. } => {
            println!("Outcome:  already in catalog, nothing written")
        }
    }
}
