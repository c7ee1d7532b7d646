//! Building the contributor roster of a repository from its commit history.

use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use vc_data_fetcher_developer_platforms::{
    models::{AccessCredential, CommitAuthor, Contributor},
    CommitHistoryProvider,
};

use crate::{config::UNKNOWN_AUTHOR, errors::AnalysisError, history::HistoryPager, repo_ref::RepoRef};

#[cfg(test)]
#[path = "contributors_tests.rs"]
mod tests;

/// The identity a commit is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIdentity {
    /// The platform login, or the raw author name for unlinked authors
    pub login: String,

    /// The profile URL of the author
    pub profile_url: String,
}

/// Resolves the identity of a commit author.
///
/// A linked platform account wins. Otherwise the git author name is used as
/// the login, falling back to `Unknown`, with a profile URL synthesized from
/// `profile_host`. Commits without any author information are not attributed
/// to anyone.
///
/// Two different people sharing a display name resolve to the same identity.
pub fn resolve_author(author: Option<&CommitAuthor>, profile_host: &str) -> Option<AuthorIdentity> {
    let author = author?;

    let identity = match &author.user {
        Some(user) => AuthorIdentity {
            login: user.login.clone(),
            profile_url: user.url.clone(),
        },
        None => {
            let name = author.name.as_deref().unwrap_or(UNKNOWN_AUTHOR);
            AuthorIdentity {
                login: name.to_string(),
                profile_url: format!("https://{}/{}", profile_host, name),
            }
        }
    };

    Some(identity)
}

/// Contributors keyed by login, kept in the order they were first seen.
#[derive(Debug, Default)]
pub struct ContributorRoster {
    positions: HashMap<String, usize>,
    contributors: Vec<Contributor>,
}

impl ContributorRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_contributors(self) -> Vec<Contributor> {
        self.contributors
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    /// Counts one commit for the identity, adding it on first sight.
    pub fn record(&mut self, identity: AuthorIdentity) {
        match self.positions.get(&identity.login) {
            Some(&position) => self.contributors[position].contributions += 1,
            None => {
                self.positions
                    .insert(identity.login.clone(), self.contributors.len());
                self.contributors.push(Contributor {
                    author_name: identity.login,
                    github_url: identity.profile_url,
                    contributions: 1,
                });
            }
        }
    }
}

/// Pages through the default branch history and counts commits per contributor.
///
/// # Returns
///
/// The contributors in first-seen order, i.e. starting with the author of the
/// newest commit. An empty list when the repository has no default branch.
///
/// # Errors
///
/// * [`AnalysisError::AccessDenied`] when the repository cannot be resolved
/// * [`AnalysisError::UpstreamFailure`] for any other platform error
/// * [`AnalysisError::Cancelled`] when `cancel` fires
#[instrument(skip(provider, credential, cancel), fields(repository = %repo))]
pub async fn aggregate_contributors<P: CommitHistoryProvider + ?Sized>(
    provider: &P,
    repo: &RepoRef,
    credential: &AccessCredential,
    profile_host: &str,
    cancel: &CancellationToken,
) -> Result<Vec<Contributor>, AnalysisError> {
    debug!("Starting pagination for contributors");

    let mut roster = ContributorRoster::new();
    let mut pager = HistoryPager::new(provider, repo, credential);
    while let Some(commits) = pager
        .next_page(cancel, |e| AnalysisError::from_upstream(e, repo))
        .await?
    {
        for commit in commits {
            if let Some(identity) = resolve_author(commit.author.as_ref(), profile_host) {
                roster.record(identity);
            }
        }
    }

    info!(
        contributors = roster.len(),
        "Finished fetching contributors"
    );
    Ok(roster.into_contributors())
}
