use thiserror::Error;
use vc_data_fetcher_core::errors::AnalysisError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// The repository cannot be read with the stored token
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The run was interrupted
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Other(format!("{:#}", err))
    }
}

impl From<AnalysisError> for CliError {
    fn from(err: AnalysisError) -> Self {
        let message = err.to_string();
        match err {
            AnalysisError::AccessDenied { .. } => CliError::AccessDenied(message),
            AnalysisError::Cancelled => CliError::Cancelled(message),
            AnalysisError::CredentialStore(_) | AnalysisError::Unauthenticated(_) => {
                CliError::AuthError(message)
            }
            AnalysisError::InvalidRepoReference(_) => CliError::InvalidArguments(message),
            AnalysisError::CollectionFailure { .. } | AnalysisError::UpstreamFailure(_) => {
                CliError::NetworkError(message)
            }
        }
    }
}

impl std::process::Termination for CliError {
    fn report(self) -> std::process::ExitCode {
        match self {
            CliError::AccessDenied(_) => std::process::ExitCode::from(1),
            CliError::ConfigError(_) => std::process::ExitCode::from(2),
            CliError::AuthError(_) => std::process::ExitCode::from(3),
            CliError::NetworkError(_) => std::process::ExitCode::from(4),
            CliError::InvalidArguments(_) => std::process::ExitCode::from(5),
            CliError::Cancelled(_) => std::process::ExitCode::from(130),
            CliError::Other(_) => std::process::ExitCode::FAILURE,
        }
    }
}
