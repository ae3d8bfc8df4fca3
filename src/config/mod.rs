mod schema;
mod validation;

pub use schema::Config;
pub use validation::validate_config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dashboard::DashboardSettings;
use crate::fetch::FetchOptions;
use crate::filter::max_at_risk_after;

/// Get the config directory path (~/.config/pr-dash/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pr-dash")
}

/// Get the default config file path (~/.config/pr-dash/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// With `path` set, the file must exist. Without it the default path is
/// tried, and a missing file there just means built-in defaults.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            read_config(&path)
        }
        None => {
            let default_path = get_config_path();
            if default_path.exists() {
                read_config(&default_path)
            } else {
                log::debug!("No config at {}, using defaults", default_path.display());
                Ok(Config::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    // An empty file is valid and means "all defaults"
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))?;

    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

impl Config {
    pub fn at_risk_after(&self) -> Result<chrono::Duration> {
        let duration = humantime::parse_duration(&self.at_risk_after)
            .with_context(|| format!("Invalid at_risk_after '{}'", self.at_risk_after))?;
        chrono::Duration::from_std(duration)
            .ok()
            .filter(|d| *d <= max_at_risk_after())
            .with_context(|| format!("at_risk_after '{}' is too large", self.at_risk_after))
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.request_timeout)
            .with_context(|| format!("Invalid request_timeout '{}'", self.request_timeout))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            per_page: self.per_page,
            max_pages: self.max_pages,
            strategy: self.pagination,
            enrich: self.enrich,
        }
    }

    pub fn dashboard_settings(&self) -> Result<DashboardSettings> {
        Ok(DashboardSettings {
            fallback_repository: self.default_repository.trim().to_string(),
            page_size: self.page_size,
            at_risk_after: self.at_risk_after()?,
        })
    }
}
