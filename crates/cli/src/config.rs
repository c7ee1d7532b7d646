use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;
use vc_data_fetcher_core::config::AnalyzerConfig;
use vc_data_fetcher_developer_platforms::github::GitHubConfig;

use crate::errors::CliError;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = ".vc-data-fetcher.toml";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Configuration of the CLI
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Connection settings for GitHub
    #[serde(default)]
    pub github: GitHubConfig,

    /// Settings of the analysis pipeline
    #[serde(default)]
    pub analysis: AnalyzerConfig,
}

impl AppConfig {
    /// Load configuration from the specified file
    pub fn load(path: &Path) -> Result<Self, CliError> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(CliError::ConfigError(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            CliError::ConfigError(format!("Failed to read configuration file: {}", e))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            CliError::ConfigError(format!("Failed to parse configuration file: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from the specified file, or the defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, CliError> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No configuration at {:?}. Using defaults", path);
            Ok(Self::default())
        }
    }
}

/// Get the path to the configuration file
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        // Look for config in current directory
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}
