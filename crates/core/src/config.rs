//! Application configuration layered from defaults, a TOML file and the
//! environment.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "gamestrike";
/// Prefix of environment overrides, e.g. `GAMESTRIKE_API_BASE`.
pub const ENV_PREFIX: &str = "GAMESTRIKE";

const DEFAULT_API_BASE: &str = "http://localhost:4000/api";
const DEFAULT_ASSETS_BASE: &str = "/images";
const DEFAULT_PLACEHOLDER: &str = "/placeholder-game.png";
const DEFAULT_TOAST_TTL_MS: u64 = 3800;
const DEFAULT_LOG_FILTER: &str = "info";

const DEFAULT_CONFIG_TOML: &str = r#"# GameStrike configuration
#
# Every key can be overridden with an environment variable prefixed
# GAMESTRIKE_, e.g. GAMESTRIKE_API_BASE=https://example.com/api

# Mount point of the catalog API, including its /api prefix.
api_base = "http://localhost:4000/api"

# Where relative cover filenames live.
assets_base = "/images"
placeholder_image = "/placeholder-game.png"

# How long notifications stay on screen.
toast_ttl_ms = 3800

# tracing filter used when RUST_LOG is unset.
log_filter = "info"
"#;

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL every API path is appended to.
    pub api_base: String,
    /// Prefix for cover images given as bare filenames.
    pub assets_base: String,
    /// Image shown when a game has no usable cover.
    pub placeholder_image: String,
    /// Lifetime of auto-dismissing toasts, in milliseconds.
    pub toast_ttl_ms: u64,
    /// Default tracing filter directive.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            assets_base: DEFAULT_ASSETS_BASE.to_string(),
            placeholder_image: DEFAULT_PLACEHOLDER.to_string(),
            toast_ttl_ms: DEFAULT_TOAST_TTL_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default file location and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load using `path` as the (optional) config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default("api_base", defaults.api_base)?
            .set_default("assets_base", defaults.assets_base)?
            .set_default("placeholder_image", defaults.placeholder_image)?
            .set_default("toast_ttl_ms", defaults.toast_ttl_ms)?
            .set_default("log_filter", defaults.log_filter)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_url()?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "api_base",
                reason: format!("unsupported scheme `{}`", base.scheme()),
            });
        }
        if self.toast_ttl_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "toast_ttl_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Parsed API base URL.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let raw = self.api_base.trim();
        if raw.is_empty() {
            return Err(ConfigError::Invalid {
                key: "api_base",
                reason: "must not be empty".to_string(),
            });
        }
        let url = Url::parse(raw).map_err(|err| ConfigError::Invalid {
            key: "api_base",
            reason: err.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                key: "api_base",
                reason: "must be a hierarchical URL".to_string(),
            });
        }
        Ok(url)
    }

    /// Toast lifetime as a duration.
    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }
}

/// Default location of `config.toml`.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write the default config file if none exists yet, returning its path.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

/// Write the default config file at `path` if it does not exist.
pub fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_round_trips_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/config.toml");
        ensure_default_config_at(&path)?;
        assert!(path.exists());

        let loaded = AppConfig::load_from(&path)?;
        assert_eq!(loaded, AppConfig::default());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base = \"https://gamestrike.example.com/api\"\ntoast_ttl_ms = 1500\n",
        )?;

        let loaded = AppConfig::load_from(&path)?;
        assert_eq!(loaded.api_base, "https://gamestrike.example.com/api");
        assert_eq!(loaded.toast_ttl(), Duration::from_millis(1500));
        assert_eq!(loaded.assets_base, "/images");
        Ok(())
    }

    #[test]
    fn existing_file_is_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_filter = \"debug\"\n")?;
        ensure_default_config_at(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "log_filter = \"debug\"\n");
        Ok(())
    }

    #[test]
    fn rejects_unusable_values() {
        let mut config = AppConfig::default();
        config.api_base = "   ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "api_base", .. })
        ));

        config.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let zero_ttl = AppConfig {
            toast_ttl_ms: 0,
            ..AppConfig::default()
        };
        assert!(matches!(
            zero_ttl.validate(),
            Err(ConfigError::Invalid {
                key: "toast_ttl_ms",
                ..
            })
        ));
    }
}
