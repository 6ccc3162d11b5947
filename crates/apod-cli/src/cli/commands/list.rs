//! `apod list` – show cataloged images.

use anyhow::Result;
use apod_core::config::ApodConfig;
use std::path::Path;

use super::catalog::open_catalog;

pub async fn run_list(cfg: &ApodConfig, json: bool, image_dir: Option<&Path>) -> Result<()> {
    let (_, catalog) = open_catalog(cfg, image_dir).await?;
    let entries = catalog.list().await?;
    catalog.close().await;

    if json {
        for e in &entries {
            println!("{}", serde_json::to_string(e)?);
        }
        return Ok(());
    }

    if entries.is_empty() {
        println!("No images in catalog.");
    } else {
        println!("{:<10} {:<10} {:<16} {}", "DATE", "SIZE", "SHA-256", "PATH");
        for e in entries {
            let hex = e.digest.to_hex();
            println!(
                "{:<10} {:<10} {:<16} {}",
                e.observation_date,
                e.byte_size,
                &hex[..16],
                e.storage_path.display()
            );
        }
    }
    Ok(())
}
