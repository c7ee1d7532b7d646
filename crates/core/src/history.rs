//! Sequential paging through the default branch commit history.

use tokio_util::sync::CancellationToken;
use tracing::warn;
use vc_data_fetcher_developer_platforms::{
    errors::Error as PlatformError,
    models::{AccessCredential, HistoryCommit},
    CommitHistoryProvider,
};

use crate::{errors::AnalysisError, repo_ref::RepoRef, until_cancelled};

/// Walks the commit history one page at a time.
///
/// Each page depends on the cursor of the page before it, so pages are always
/// fetched in order.
pub(crate) struct HistoryPager<'a, P: CommitHistoryProvider + ?Sized> {
    provider: &'a P,
    repo: &'a RepoRef,
    credential: &'a AccessCredential,
    cursor: Option<String>,
    finished: bool,
}

impl<'a, P: CommitHistoryProvider + ?Sized> HistoryPager<'a, P> {
    pub(crate) fn new(provider: &'a P, repo: &'a RepoRef, credential: &'a AccessCredential) -> Self {
        Self {
            provider,
            repo,
            credential,
            cursor: None,
            finished: false,
        }
    }

    /// Fetches the next page of commits.
    ///
    /// Returns `Ok(None)` once the history is exhausted or when the repository
    /// has no default branch. Platform errors are translated with `on_error`.
    pub(crate) async fn next_page<F>(
        &mut self,
        cancel: &CancellationToken,
        on_error: F,
    ) -> Result<Option<Vec<HistoryCommit>>, AnalysisError>
    where
        F: FnOnce(PlatformError) -> AnalysisError,
    {
        if self.finished {
            return Ok(None);
        }

        let page = until_cancelled(
            cancel,
            self.provider.commit_history_page(
                self.repo.owner(),
                self.repo.name(),
                self.cursor.as_deref(),
                self.credential,
            ),
        )
        .await?
        .map_err(on_error)?;

        let Some(page) = page else {
            self.finished = true;
            return Ok(None);
        };

        self.finished = true;
        if page.page_info.has_next_page {
            match page.page_info.end_cursor {
                Some(next) if self.cursor.as_deref() != Some(next.as_str()) => {
                    self.cursor = Some(next);
                    self.finished = false;
                }
                _ => warn!(
                    repository = %self.repo,
                    "History reported another page without a new cursor. Stopping pagination."
                ),
            }
        }

        Ok(Some(page.nodes))
    }
}
