use tracing::debug;
use vc_data_fetcher_core::ContributionAnalyzer;
use vc_data_fetcher_developer_platforms::github::GitHubProvider;

use crate::config::AppConfig;
use crate::errors::CliError;
use auth::KeyringTokenStore;

/// Full repository analysis
pub mod analyze;
/// Authentication commands for storing GitHub tokens
pub mod auth;
/// Repository access, contributor and commit queries
pub mod repository;

/// The analyzer used by all repository commands
pub type Analyzer = ContributionAnalyzer<GitHubProvider, KeyringTokenStore>;

/// Creates an analyzer that reads tokens from the OS keyring.
pub fn create_analyzer(config: AppConfig) -> Result<Analyzer, CliError> {
    debug!("Creating GitHub client");
    let provider = GitHubProvider::from_config(config.github).map_err(|e| {
        CliError::ConfigError(format!("Failed to create the GitHub client: {}", e))
    })?;

    Ok(ContributionAnalyzer::with_config(
        provider,
        KeyringTokenStore,
        config.analysis,
    ))
}
