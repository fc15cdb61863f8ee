//! Configuration management for sks.
//!
//! Loads configuration from `${SKS_HOME}/config.toml` with sensible defaults.

use std::{env, fs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable that overrides `base_url`.
pub const BASE_URL_ENV: &str = "SKS_BASE_URL";

pub mod paths {
    //! Path resolution for sks configuration and data directories.
    //!
    //! `SKS_HOME` resolution order:
    //! 1. `SKS_HOME` environment variable (if set)
    //! 2. ~/.config/sks (default)
    //! 3. ./.sks when no home directory can be determined

    use std::env;
    use std::path::PathBuf;

    /// Returns the sks home directory.
    pub fn sks_home() -> PathBuf {
        if let Ok(home) = env::var("SKS_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".sks"),
            |h| h.join(".config").join("sks"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        sks_home().join("config.toml")
    }

    /// Returns the path to the durable key-value storage file.
    pub fn storage_path() -> PathBuf {
        sks_home().join("storage.json")
    }
}

/// Returns the default config template with comments.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the booking API (e.g. `http://127.0.0.1:5000/api`)
    pub base_url: String,

    /// Request timeout in seconds (0 disables)
    pub timeout_secs: u32,

    /// Optional log file mirrored from stderr output
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            log_file: None,
        }
    }
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";
    const DEFAULT_TIMEOUT_SECS: u32 = 10;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the base URL to use, honoring `SKS_BASE_URL`.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not a valid URL.
    pub fn effective_base_url(&self) -> Result<String> {
        resolve_base_url(env::var(BASE_URL_ENV).ok().as_deref(), &self.base_url)
    }

    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.timeout_secs)))
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Saves only the `base_url` field to a specific config file path.
    ///
    /// Creates the file from the default template if it doesn't exist.
    /// Preserves existing fields and comments using `toml_edit`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the file cannot be updated.
    pub fn save_base_url_to(path: &Path, base_url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let base_url = base_url.trim();
        validate_url(base_url)?;

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["base_url"] = value(base_url);

        Self::write_config(path, &doc.to_string())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Resolves a base URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error if the selected URL does not parse.
pub fn resolve_base_url(env_value: Option<&str>, config_value: &str) -> Result<String> {
    if let Some(env_url) = env_value {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    let trimmed = config_value.trim();
    if !trimmed.is_empty() {
        validate_url(trimmed)?;
        return Ok(trimmed.trim_end_matches('/').to_string());
    }

    Ok(Config::DEFAULT_BASE_URL.to_string())
}

fn validate_url(url: &str) -> Result<()> {
    Url::parse(url).with_context(|| format!("Invalid base URL: {url}"))?;
    Ok(())
}
