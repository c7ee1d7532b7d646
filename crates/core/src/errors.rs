use thiserror::Error;
use vc_data_fetcher_developer_platforms::errors::Error as PlatformError;

use crate::repo_ref::RepoRef;
use crate::tokens::UserId;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Failures of a credential lookup.
#[derive(Error, Debug)]
pub enum TokenLookupError {
    /// No credential has been stored for the identity. This is an expected
    /// state for users that have not linked their account yet.
    #[error("No access token is stored for user {0}")]
    NotFound(UserId),

    /// The backing store could not be read.
    #[error("The credential store failed: {0}")]
    Store(String),
}

/// The named failures of the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Access to repository {owner}/{name} was denied")]
    AccessDenied { owner: String, name: String },

    #[error("The analysis was cancelled")]
    Cancelled,

    /// Collecting the commits of one contributor failed. The pipeline contains
    /// this failure and keeps the contributor with an empty commit list.
    #[error("Failed to collect commits for contributor '{author}': {source}")]
    CollectionFailure {
        author: String,
        #[source]
        source: PlatformError,
    },

    #[error("Failed to read the credential store: {0}")]
    CredentialStore(String),

    #[error("Malformed or unsupported repository URL: '{0}'")]
    InvalidRepoReference(String),

    #[error("No access token found for user {0}")]
    Unauthenticated(UserId),

    #[error("Upstream request failed: {0}")]
    UpstreamFailure(#[source] PlatformError),
}

impl AnalysisError {
    /// Translates a platform error raised while reading `repo`.
    ///
    /// An unresolvable repository becomes [`AnalysisError::AccessDenied`], every
    /// other platform error becomes [`AnalysisError::UpstreamFailure`].
    pub fn from_upstream(error: PlatformError, repo: &RepoRef) -> Self {
        match error {
            PlatformError::RepositoryUnresolvable { .. } => AnalysisError::AccessDenied {
                owner: repo.owner().to_string(),
                name: repo.name().to_string(),
            },
            e => AnalysisError::UpstreamFailure(e),
        }
    }

    /// The message shown to end users. Transport details are never included.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::InvalidRepoReference(_) => "Invalid repository URL.",
            AnalysisError::Unauthenticated(_) => {
                "Your GitHub account is not connected. Please reconnect your account."
            }
            AnalysisError::AccessDenied { .. } => {
                "The repository does not exist or you do not have access to it."
            }
            AnalysisError::Cancelled => "The analysis was cancelled.",
            AnalysisError::CollectionFailure { .. }
            | AnalysisError::CredentialStore(_)
            | AnalysisError::UpstreamFailure(_) => {
                "A temporary failure occurred while fetching repository data. Please try again."
            }
        }
    }
}

impl From<TokenLookupError> for AnalysisError {
    fn from(e: TokenLookupError) -> Self {
        match e {
            TokenLookupError::NotFound(user_id) => AnalysisError::Unauthenticated(user_id),
            TokenLookupError::Store(message) => AnalysisError::CredentialStore(message),
        }
    }
}
