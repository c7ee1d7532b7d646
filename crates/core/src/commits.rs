//! Collecting the commits of a single contributor.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use vc_data_fetcher_developer_platforms::{
    models::{AccessCredential, CommitRecord},
    CommitHistoryProvider,
};

use crate::{
    contributors::resolve_author, errors::AnalysisError, files::files_for,
    history::HistoryPager, repo_ref::RepoRef,
};

#[cfg(test)]
#[path = "commits_tests.rs"]
mod tests;

/// Collects every default branch commit attributed to `author`.
///
/// The history is paged from the start and filtered with the same identity
/// rule used to build the contributor roster, so the commits found here match
/// the contribution count of the author. Each matching commit is enriched with
/// its changed files.
///
/// # Returns
///
/// The commits in history order, newest first.
///
/// # Errors
///
/// * [`AnalysisError::CollectionFailure`] when a history page cannot be fetched
/// * [`AnalysisError::Cancelled`] when `cancel` fires
///
/// File detail failures do not fail the collection; the affected commit is
/// returned with an empty file list.
#[instrument(skip(provider, credential, cancel), fields(repository = %repo))]
pub async fn collect_commits_for_author<P: CommitHistoryProvider + ?Sized>(
    provider: &P,
    repo: &RepoRef,
    author: &str,
    credential: &AccessCredential,
    profile_host: &str,
    cancel: &CancellationToken,
) -> Result<Vec<CommitRecord>, AnalysisError> {
    debug!("Starting commit fetching for author");

    let mut commits = Vec::new();
    let mut pager = HistoryPager::new(provider, repo, credential);
    while let Some(page) = pager
        .next_page(cancel, |source| AnalysisError::CollectionFailure {
            author: author.to_string(),
            source,
        })
        .await?
    {
        for commit in page {
            let attributed = resolve_author(commit.author.as_ref(), profile_host)
                .is_some_and(|identity| identity.login == author);
            if !attributed {
                continue;
            }

            let files = files_for(provider, repo, &commit.oid, credential, cancel).await?;
            commits.push(CommitRecord {
                sha: commit.oid,
                message: commit.message,
                committed_date: commit.committed_date,
                files,
            });
        }
    }

    info!(total = commits.len(), "Finished fetching commits for author");
    Ok(commits)
}
