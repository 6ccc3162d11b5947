//! Desktop background capability.
//!
//! The ingest core never calls this; the CLI applies the background after a
//! successful ingest outcome, using the outcome's path.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

use crate::config::BackgroundConfig;

/// Placeholder in configured argv entries that is replaced by the image path.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Something that can set the desktop background to an image file.
pub trait BackgroundSetter {
    fn apply_background(&self, path: &Path) -> Result<()>;
}

/// Runs a configured command, e.g.
/// `gsettings set org.gnome.desktop.background picture-uri file://{path}`.
#[derive(Debug, Clone)]
pub struct CommandBackground {
    argv: Vec<String>,
}

impl CommandBackground {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.first().map_or(true, |p| p.trim().is_empty()) {
            anyhow::bail!("background command is empty");
        }
        Ok(Self { argv })
    }

    pub fn from_config(cfg: &BackgroundConfig) -> Result<Self> {
        Self::new(cfg.command.clone())
    }

    /// The argv that would run for `path`.
    pub fn command_line(&self, path: &Path) -> Vec<String> {
        let p = path.to_string_lossy();
        self.argv
            .iter()
            .map(|a| a.replace(PATH_PLACEHOLDER, &p))
            .collect()
    }
}

impl BackgroundSetter for CommandBackground {
    fn apply_background(&self, path: &Path) -> Result<()> {
        let argv = self.command_line(path);
        let (program, args) = argv
            .split_first()
            .context("background command is empty")?;
        tracing::debug!(?argv, "setting desktop background");
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to run {}", program))?;
        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        tracing::info!(path = %path.display(), "desktop background set");
        Ok(())
    }
}
