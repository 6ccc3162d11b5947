//! CLI for the APOD image catalog.

mod commands;

use anyhow::Result;
use apod_core::config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    run_checksum, run_completions, run_fetch, run_ingest, run_list, run_man, run_verify,
    FetchArgs,
};

/// Top-level CLI for the APOD image catalog.
#[derive(Debug, Parser)]
#[command(name = "apod")]
#[command(about = "APOD: fetch Astronomy Picture of the Day images into a deduplicated catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch the picture for a date (default today), store it once, and set the background.
    Fetch {
        /// Date as YYYY-MM-DD.
        date: Option<String>,
        /// Image directory (overrides config).
        #[arg(long, value_name = "DIR")]
        image_dir: Option<PathBuf>,
        /// Do not change the desktop background.
        #[arg(long)]
        no_background: bool,
    },

    /// Ingest a local image file into the catalog.
    Ingest {
        /// Path to the image file.
        file: PathBuf,
        /// APOD date the image belongs to (YYYY-MM-DD).
        #[arg(long)]
        date: String,
        /// Storage file name (default: the file's own name).
        #[arg(long)]
        name: Option<String>,
        /// Image directory (overrides config).
        #[arg(long, value_name = "DIR")]
        image_dir: Option<PathBuf>,
    },

    /// List cataloged images, newest first.
    List {
        /// Print JSON lines instead of a table.
        #[arg(long)]
        json: bool,
        /// Image directory (overrides config).
        #[arg(long, value_name = "DIR")]
        image_dir: Option<PathBuf>,
    },

    /// Check that every cataloged file exists and matches its recorded size and digest.
    Verify {
        /// Image directory (overrides config).
        #[arg(long, value_name = "DIR")]
        image_dir: Option<PathBuf>,
    },

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // These need neither config nor catalog.
        match &cli.command {
            CliCommand::Checksum { path } => return run_checksum(path).await,
            CliCommand::Completions { shell } => return run_completions(*shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let mut cfg = config::load_or_init()?;
        if let Ok(key) = std::env::var("APOD_API_KEY") {
            if !key.trim().is_empty() {
                cfg.api.api_key = key;
            }
        }
        tracing::debug!(
            image_dir = ?cfg.image_dir,
            catalog_file = %cfg.catalog_file,
            api = %cfg.api.base_url,
            "loaded config"
        );

        match cli.command {
            CliCommand::Fetch {
                date,
                image_dir,
                no_background,
            } => {
                let args = FetchArgs {
                    date,
                    image_dir,
                    no_background,
                };
                run_fetch(&cfg, args).await?
            }
            CliCommand::Ingest {
                file,
                date,
                name,
                image_dir,
            } => run_ingest(&cfg, &file, &date, name.as_deref(), image_dir.as_deref()).await?,
            CliCommand::List { json, image_dir } => {
                run_list(&cfg, json, image_dir.as_deref()).await?
            }
            CliCommand::Verify { image_dir } => run_verify(&cfg, image_dir.as_deref()).await?,
            CliCommand::Checksum { .. } | CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
