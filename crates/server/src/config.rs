use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info};
use vc_data_fetcher_core::config::AnalyzerConfig;
use vc_data_fetcher_developer_platforms::github::GitHubConfig;

use crate::errors::ServerError;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Environment variable holding the path of the TOML configuration file
pub const CONFIG_PATH_ENV: &str = "VC_DATA_FETCHER_CONFIG";

/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "VC_DATA_FETCHER_PORT";

/// Configuration of the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The port the service listens on
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,

    /// Connection settings for GitHub
    #[serde(default)]
    pub github: GitHubConfig,

    /// Settings of the analysis pipeline
    #[serde(default)]
    pub analysis: AnalyzerConfig,
}

impl ServerConfig {
    fn default_port() -> u16 {
        8081
    }

    /// Loads the configuration from the environment.
    ///
    /// The file named by `VC_DATA_FETCHER_CONFIG` is read when set, and
    /// `VC_DATA_FETCHER_PORT` overrides the port.
    pub fn from_env() -> Result<Self, ServerError> {
        let path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let port = env::var(PORT_ENV).ok();
        Self::load(path.as_deref(), port.as_deref())
    }

    /// Parses a TOML document. Missing keys take their default values.
    pub fn from_toml_str(content: &str) -> Result<Self, ServerError> {
        toml::from_str(content).map_err(|e| {
            ServerError::ConfigError(format!("Failed to parse configuration file: {}", e))
        })
    }

    /// Builds the configuration from an optional file and an optional port override.
    ///
    /// A path that does not exist yields the defaults. A file that cannot be
    /// parsed is an error.
    pub fn load(path: Option<&Path>, port: Option<&str>) -> Result<Self, ServerError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                debug!("Loading configuration from {:?}", path);
                let content = fs::read_to_string(path).map_err(|e| {
                    ServerError::ConfigError(format!("Failed to read configuration file: {}", e))
                })?;
                Self::from_toml_str(&content)?
            }
            Some(path) => {
                info!(
                    "Configuration file {:?} not found. Using default configuration",
                    path
                );
                Self::default()
            }
            None => Self::default(),
        };

        if let Some(port) = port {
            config.port = port.trim().parse().map_err(|e| {
                error!(input = port, "Failed to parse the {} key", PORT_ENV);
                ServerError::ConfigError(format!("The port '{}' is not a number: {}", port, e))
            })?;
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: Self::default_port(),
            github: GitHubConfig::default(),
            analysis: AnalyzerConfig::default(),
        }
    }
}
