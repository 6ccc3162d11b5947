use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// APOD API endpoint and credentials (`[api]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Metadata endpoint; `api_key` and `date` are appended as query parameters.
    pub base_url: String,
    /// api.nasa.gov key. `DEMO_KEY` works but is heavily rate limited.
    pub api_key: String,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.nasa.gov/planetary/apod".to_string(),
            api_key: "DEMO_KEY".to_string(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Desktop background settings (`[background]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Set the background after a successful fetch.
    pub enabled: bool,
    /// Command argv; `{path}` is replaced with the image path.
    pub command: Vec<String>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: [
                "gsettings",
                "set",
                "org.gnome.desktop.background",
                "picture-uri",
                "file://{path}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Global configuration loaded from `~/.config/apod/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApodConfig {
    /// Directory images are stored in. None = `$XDG_DATA_HOME/apod/images`.
    #[serde(default)]
    pub image_dir: Option<PathBuf>,
    /// Catalog database file name, created inside the image directory.
    pub catalog_file: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub background: BackgroundConfig,
}

impl Default for ApodConfig {
    fn default() -> Self {
        Self {
            image_dir: None,
            catalog_file: "apod_images.db".to_string(),
            api: ApiConfig::default(),
            background: BackgroundConfig::default(),
        }
    }
}

impl ApodConfig {
    /// Image directory: explicit override, then config, then the XDG data dir.
    pub fn resolve_image_dir(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = cli_override.or(self.image_dir.as_deref()) {
            return Ok(dir.to_path_buf());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("apod")?;
        Ok(xdg_dirs.get_data_home().join("apod").join("images"))
    }

    /// Catalog location for a given image directory.
    pub fn catalog_path(&self, image_dir: &Path) -> PathBuf {
        image_dir.join(&self.catalog_file)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("apod")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ApodConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` for an explicit path (tests, `--config`).
pub fn load_or_init_at(path: &Path) -> Result<ApodConfig> {
    if !path.exists() {
        let default_cfg = ApodConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: ApodConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ApodConfig::default();
        assert!(cfg.image_dir.is_none());
        assert_eq!(cfg.catalog_file, "apod_images.db");
        assert_eq!(cfg.api.api_key, "DEMO_KEY");
        assert!(cfg.background.enabled);
        assert_eq!(cfg.background.command[0], "gsettings");
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ApodConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ApodConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.catalog_file, cfg.catalog_file);
        assert_eq!(parsed.api.base_url, cfg.api.base_url);
        assert_eq!(parsed.background.command, cfg.background.command);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            image_dir = "/srv/apod"
            catalog_file = "catalog.db"

            [api]
            base_url = "http://127.0.0.1:8080/apod"
            api_key = "abc123"

            [background]
            enabled = false
            command = ["feh", "--bg-fill", "{path}"]
        "#;
        let cfg: ApodConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.image_dir.as_deref(), Some(Path::new("/srv/apod")));
        assert_eq!(cfg.api.api_key, "abc123");
        assert_eq!(cfg.api.timeout_secs, 120);
        assert!(!cfg.background.enabled);
        assert_eq!(cfg.background.command, vec!["feh", "--bg-fill", "{path}"]);
        assert_eq!(
            cfg.catalog_path(Path::new("/srv/apod")),
            PathBuf::from("/srv/apod/catalog.db")
        );
    }

    #[test]
    fn config_toml_sections_optional() {
        let cfg: ApodConfig = toml::from_str(r#"catalog_file = "x.db""#).unwrap();
        assert_eq!(cfg.api.api_key, "DEMO_KEY");
        assert!(cfg.background.enabled);
    }

    #[test]
    fn image_dir_override_wins() {
        let cfg = ApodConfig {
            image_dir: Some(PathBuf::from("/from/config")),
            ..ApodConfig::default()
        };
        assert_eq!(
            cfg.resolve_image_dir(Some(Path::new("/from/cli"))).unwrap(),
            PathBuf::from("/from/cli")
        );
        assert_eq!(
            cfg.resolve_image_dir(None).unwrap(),
            PathBuf::from("/from/config")
        );
    }

    #[test]
    fn load_or_init_creates_then_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.catalog_file, "apod_images.db");

        fs::write(&path, "catalog_file = \"other.db\"\n").unwrap();
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(loaded.catalog_file, "other.db");
    }
}
