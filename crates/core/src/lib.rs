//! # VC Data Fetcher Core
//!
//! Aggregates contributor and commit data of a GitHub repository for developer
//! impact analysis.
//!
//! A run parses the repository URL, resolves the caller's stored access token,
//! builds the contributor roster from the default branch history and then
//! collects every contributor's commits, each enriched with per-file patch
//! details. Failures while collecting one contributor are contained: that
//! contributor is reported with an empty commit list.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use vc_data_fetcher_core::{ContributionAnalyzer, tokens::InMemoryTokenStore};
//! use vc_data_fetcher_developer_platforms::{
//!     github::{GitHubConfig, GitHubProvider},
//!     models::AccessCredential,
//! };
//!
//! async fn analyze() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GitHubProvider::from_config(GitHubConfig::default())?;
//!     let tokens = InMemoryTokenStore::new();
//!     tokens.store(42, AccessCredential::new("gho_token")).await;
//!
//!     let analyzer = ContributionAnalyzer::new(provider, tokens);
//!     let cancel = CancellationToken::new();
//!
//!     analyzer
//!         .check_access("https://github.com/acme/widgets", 42, &cancel)
//!         .await?;
//!
//!     let report = analyzer
//!         .run("https://github.com/acme/widgets", 42, &cancel)
//!         .await?;
//!     for contributor in report {
//!         println!("{}: {} commits", contributor.author_name, contributor.commits.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use vc_data_fetcher_developer_platforms::{
    models::{
        AccessCredential, CommitRecord, Contributor, ContributorWithCommits, RepositorySummary,
    },
    CommitHistoryProvider,
};

pub mod commits;
pub mod config;
use config::AnalyzerConfig;

pub mod contributors;

pub mod errors;
use errors::AnalysisError;

pub mod files;

mod history;

pub mod repo_ref;
use repo_ref::RepoRef;

pub mod tokens;
use tokens::{TokenProvider, UserId};

#[cfg(test)]
mod mock_provider;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// The commits of one author, as returned by
/// [`ContributionAnalyzer::commits_by_author`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitsByAuthor {
    pub commits: Vec<CommitRecord>,
    pub author_name: String,
    pub total_commits: usize,
}

/// Runs `future` unless `cancel` fires first.
///
/// The future is dropped on cancellation, which aborts any request it has in
/// flight.
pub(crate) async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    future: F,
) -> Result<F::Output, AnalysisError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
        output = future => Ok(output),
    }
}

/// Aggregates contributor and commit data for repositories.
///
/// `ContributionAnalyzer` ties the platform provider and the credential store
/// together and implements the analysis pipeline on top of them.
///
/// # Examples
///
/// ```rust,no_run
/// use tokio_util::sync::CancellationToken;
/// use vc_data_fetcher_core::{ContributionAnalyzer, config::AnalyzerConfig, tokens::TokenProvider};
/// use vc_data_fetcher_developer_platforms::CommitHistoryProvider;
///
/// async fn example<P: CommitHistoryProvider, T: TokenProvider>(provider: P, tokens: T) {
///     let config = AnalyzerConfig {
///         max_concurrent_contributors: 4,
///         ..AnalyzerConfig::default()
///     };
///     let analyzer = ContributionAnalyzer::with_config(provider, tokens, config);
///
///     let contributors = analyzer
///         .contributors("https://github.com/acme/widgets", 7, &CancellationToken::new())
///         .await;
///     println!("{:?}", contributors.map(|c| c.len()));
/// }
/// ```
#[derive(Debug)]
pub struct ContributionAnalyzer<P: CommitHistoryProvider, T: TokenProvider> {
    provider: P,
    tokens: T,
    config: AnalyzerConfig,
}

impl<P: CommitHistoryProvider, T: TokenProvider> ContributionAnalyzer<P, T> {
    /// Checks that the user's credential can read the repository.
    ///
    /// This performs a single lightweight query without paging through the
    /// history, and is meant to validate a repository before a full run.
    ///
    /// # Returns
    ///
    /// The repository summary when the repository is accessible.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::InvalidRepoReference`] for a malformed URL
    /// * [`AnalysisError::Unauthenticated`] when no credential is stored
    /// * [`AnalysisError::AccessDenied`] when the repository cannot be resolved
    /// * [`AnalysisError::UpstreamFailure`] for any other platform error
    /// * [`AnalysisError::Cancelled`] when `cancel` fires
    #[instrument(skip(self, cancel))]
    pub async fn check_access(
        &self,
        repo_url: &str,
        user_id: UserId,
        cancel: &CancellationToken,
    ) -> Result<RepositorySummary, AnalysisError> {
        info!("Checking repository access");
        let (repo, credential) = self.prepare(repo_url, user_id).await?;

        until_cancelled(
            cancel,
            self.provider
                .repository_summary(repo.owner(), repo.name(), &credential),
        )
        .await?
        .map_err(|e| {
            let error = AnalysisError::from_upstream(e, &repo);
            if let AnalysisError::AccessDenied { .. } = error {
                warn!(
                    repository = %repo,
                    "Repository not resolvable or unauthorized"
                );
            }
            error
        })
    }

    /// Collects the commits of a single contributor.
    ///
    /// Errors other than cancellation are logged and contained; the
    /// contributor is then returned without commits.
    async fn collect_for_contributor(
        &self,
        repo: &RepoRef,
        contributor: Contributor,
        credential: &AccessCredential,
        cancel: &CancellationToken,
    ) -> Result<ContributorWithCommits, AnalysisError> {
        debug!(
            author = contributor.author_name.as_str(),
            "Fetching commits for contributor"
        );

        let result = commits::collect_commits_for_author(
            &self.provider,
            repo,
            &contributor.author_name,
            credential,
            &self.config.profile_host,
            cancel,
        )
        .await;

        match result {
            Ok(commits) => Ok(ContributorWithCommits::new(contributor, commits)),
            Err(AnalysisError::Cancelled) => Err(AnalysisError::Cancelled),
            Err(e) => {
                error!(
                    repository = %repo,
                    author = contributor.author_name.as_str(),
                    error = e.to_string(),
                    "Error fetching commits for contributor"
                );
                Ok(ContributorWithCommits::new(contributor, Vec::new()))
            }
        }
    }

    /// Collects the commits of one author.
    ///
    /// Unlike [`ContributionAnalyzer::run`] there is nothing to isolate here, so
    /// a failure to read the history is returned to the caller.
    ///
    /// # Errors
    ///
    /// The errors of [`ContributionAnalyzer::check_access`]; an unresolvable
    /// repository is reported as [`AnalysisError::AccessDenied`].
    #[instrument(skip(self, cancel))]
    pub async fn commits_by_author(
        &self,
        repo_url: &str,
        author: &str,
        user_id: UserId,
        cancel: &CancellationToken,
    ) -> Result<CommitsByAuthor, AnalysisError> {
        info!("Fetching commits for author");
        let (repo, credential) = self.prepare(repo_url, user_id).await?;

        let commits = commits::collect_commits_for_author(
            &self.provider,
            &repo,
            author,
            &credential,
            &self.config.profile_host,
            cancel,
        )
        .await
        .map_err(|e| match e {
            AnalysisError::CollectionFailure { source, .. } => {
                AnalysisError::from_upstream(source, &repo)
            }
            e => e,
        })?;

        Ok(CommitsByAuthor {
            total_commits: commits.len(),
            commits,
            author_name: author.to_string(),
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Builds the contributor roster of a repository.
    ///
    /// # Errors
    ///
    /// The errors of [`ContributionAnalyzer::check_access`].
    #[instrument(skip(self, cancel))]
    pub async fn contributors(
        &self,
        repo_url: &str,
        user_id: UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Contributor>, AnalysisError> {
        info!("Fetching contributors");
        let (repo, credential) = self.prepare(repo_url, user_id).await?;

        contributors::aggregate_contributors(
            &self.provider,
            &repo,
            &credential,
            &self.config.profile_host,
            cancel,
        )
        .await
    }

    /// Parses the URL and resolves the credential. No network access happens
    /// before both succeed.
    async fn prepare(
        &self,
        repo_url: &str,
        user_id: UserId,
    ) -> Result<(RepoRef, AccessCredential), AnalysisError> {
        let repo = RepoRef::parse_for_host(repo_url, &self.config.profile_host)?;
        let credential = self.tokens.resolve(user_id).await.map_err(|e| {
            warn!(user_id, error = e.to_string(), "Access token not available");
            AnalysisError::from(e)
        })?;

        Ok((repo, credential))
    }

    /// Runs the full analysis of a repository.
    ///
    /// The contributor roster is built first. Then the commits of every
    /// contributor are collected, up to
    /// [`AnalyzerConfig::max_concurrent_contributors`] at a time. The result
    /// holds one entry per contributor in discovery order.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::InvalidRepoReference`] for a malformed URL
    /// * [`AnalysisError::Unauthenticated`] when no credential is stored
    /// * [`AnalysisError::AccessDenied`] when the repository cannot be resolved
    /// * [`AnalysisError::UpstreamFailure`] when the roster cannot be built
    /// * [`AnalysisError::Cancelled`] when `cancel` fires; no partial result is returned
    ///
    /// A failure while collecting one contributor's commits is not an error.
    /// That contributor is reported with an empty commit list.
    #[instrument(skip(self, cancel))]
    pub async fn run(
        &self,
        repo_url: &str,
        user_id: UserId,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContributorWithCommits>, AnalysisError> {
        info!("Fetching contributors and commits");
        let (repo, credential) = self.prepare(repo_url, user_id).await?;

        let contributors = contributors::aggregate_contributors(
            &self.provider,
            &repo,
            &credential,
            &self.config.profile_host,
            cancel,
        )
        .await?;

        let report: Vec<ContributorWithCommits> = stream::iter(contributors)
            .map(|contributor| self.collect_for_contributor(&repo, contributor, &credential, cancel))
            .buffered(self.config.effective_concurrency())
            .try_collect()
            .await?;

        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        info!(
            repository = %repo,
            contributors = report.len(),
            "Successfully fetched contributor and commit data"
        );
        Ok(report)
    }

    /// Creates an analyzer with the default configuration.
    pub fn new(provider: P, tokens: T) -> Self {
        Self::with_config(provider, tokens, AnalyzerConfig::default())
    }

    pub fn with_config(provider: P, tokens: T, config: AnalyzerConfig) -> Self {
        Self {
            provider,
            tokens,
            config,
        }
    }
}
