//! Checksum command: compute SHA-256 of a file.

use anyhow::Result;
use apod_core::fingerprint::fingerprint_path;
use std::path::Path;

/// Compute and print SHA-256 of the given file, `sha256sum` style.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let owned = path.to_path_buf();
    let digest = tokio::task::spawn_blocking(move || fingerprint_path(&owned)).await??;
    println!("{}  {}", digest, path.display());
    Ok(())
}
