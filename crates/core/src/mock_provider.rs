//! A scripted [`CommitHistoryProvider`] for the pipeline tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use vc_data_fetcher_developer_platforms::{
    errors::Error,
    models::{
        AccessCredential, AuthorUser, CommitAuthor, CommitFileEntry, CommitHistoryPage,
        HistoryCommit, PageInfo, RepositoryOwner, RepositorySummary,
    },
    CommitHistoryProvider,
};

/// What the repository summary call answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SummaryOutcome {
    Accessible,
    Unresolvable,
    Failing,
}

/// Serves a fixed commit history split into pages.
///
/// Page `i` reports `cursor-{i}` as its end cursor. History calls are counted
/// across roster and per-author paging, so a failure can be injected for a
/// specific call.
#[derive(Debug)]
pub(crate) struct MockProvider {
    pages: Vec<Vec<HistoryCommit>>,
    no_default_branch: bool,
    failing_history_calls: HashSet<usize>,
    files: HashMap<String, Vec<CommitFileEntry>>,
    failing_shas: HashSet<String>,
    summary: SummaryOutcome,
    cancel_on_file_call: Option<CancellationToken>,
    history_calls: AtomicUsize,
    file_calls: AtomicUsize,
    summary_calls: AtomicUsize,
}

impl MockProvider {
    pub(crate) fn new(pages: Vec<Vec<HistoryCommit>>) -> Self {
        Self {
            pages,
            no_default_branch: false,
            failing_history_calls: HashSet::new(),
            files: HashMap::new(),
            failing_shas: HashSet::new(),
            summary: SummaryOutcome::Accessible,
            cancel_on_file_call: None,
            history_calls: AtomicUsize::new(0),
            file_calls: AtomicUsize::new(0),
            summary_calls: AtomicUsize::new(0),
        }
    }

    /// A provider for a repository without a default branch.
    pub(crate) fn without_default_branch() -> Self {
        let mut provider = Self::new(Vec::new());
        provider.no_default_branch = true;
        provider
    }

    /// Cancels `token` on the first file call and never answers it.
    pub(crate) fn cancelling_on_file_call(mut self, token: CancellationToken) -> Self {
        self.cancel_on_file_call = Some(token);
        self
    }

    /// Fails the history call with the given zero based index.
    pub(crate) fn failing_history_call(mut self, index: usize) -> Self {
        self.failing_history_calls.insert(index);
        self
    }

    pub(crate) fn failing_files_for(mut self, sha: &str) -> Self {
        self.failing_shas.insert(sha.to_string());
        self
    }

    pub(crate) fn with_files(mut self, sha: &str, files: Vec<CommitFileEntry>) -> Self {
        self.files.insert(sha.to_string(), files);
        self
    }

    pub(crate) fn with_summary(mut self, summary: SummaryOutcome) -> Self {
        self.summary = summary;
        self
    }

    pub(crate) fn file_calls(&self) -> usize {
        self.file_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn summary_calls(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.file_calls() + self.history_calls() + self.summary_calls()
    }

    fn page_index(&self, after: Option<&str>) -> Result<usize, Error> {
        match after {
            None => Ok(0),
            Some(cursor) => cursor
                .strip_prefix("cursor-")
                .and_then(|i| i.parse::<usize>().ok())
                .map(|i| i + 1)
                .ok_or_else(|| Error::GraphQlQuery {
                    messages: vec![format!("Unknown cursor '{}'", cursor)],
                }),
        }
    }
}

#[async_trait]
impl CommitHistoryProvider for MockProvider {
    async fn repository_summary(
        &self,
        repo_owner: &str,
        repo_name: &str,
        _credential: &AccessCredential,
    ) -> Result<RepositorySummary, Error> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        match self.summary {
            SummaryOutcome::Accessible => Ok(RepositorySummary {
                name: repo_name.to_string(),
                is_private: false,
                owner: RepositoryOwner {
                    login: repo_owner.to_string(),
                },
            }),
            SummaryOutcome::Unresolvable => Err(Error::RepositoryUnresolvable {
                messages: vec![format!(
                    "Could not resolve to a Repository with the name '{}/{}'.",
                    repo_owner, repo_name
                )],
            }),
            SummaryOutcome::Failing => Err(Error::Protocol { status_code: 502 }),
        }
    }

    async fn commit_history_page(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        after: Option<&str>,
        _credential: &AccessCredential,
    ) -> Result<Option<CommitHistoryPage>, Error> {
        let call = self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_history_calls.contains(&call) {
            return Err(Error::Protocol { status_code: 502 });
        }

        if self.no_default_branch {
            return Ok(None);
        }

        let index = self.page_index(after)?;
        let nodes = self.pages.get(index).cloned().unwrap_or_default();
        Ok(Some(CommitHistoryPage {
            page_info: PageInfo {
                has_next_page: index + 1 < self.pages.len(),
                end_cursor: Some(format!("cursor-{}", index)),
            },
            nodes,
        }))
    }

    async fn commit_files(
        &self,
        _repo_owner: &str,
        _repo_name: &str,
        sha: &str,
        _credential: &AccessCredential,
    ) -> Result<Vec<CommitFileEntry>, Error> {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_file_call {
            token.cancel();
            std::future::pending::<()>().await;
        }

        if self.failing_shas.contains(sha) {
            return Err(Error::Timeout);
        }

        Ok(self.files.get(sha).cloned().unwrap_or_default())
    }
}

/// A commit by an author with a linked platform account.
pub(crate) fn linked_commit(sha: &str, login: &str) -> HistoryCommit {
    commit_with_author(
        sha,
        Some(CommitAuthor {
            user: Some(AuthorUser {
                login: login.to_string(),
                url: format!("https://github.com/{}", login),
            }),
            name: Some(format!("{} (display)", login)),
            email: Some(format!("{}@example.com", login)),
        }),
    )
}

/// A commit by an author without a linked platform account.
pub(crate) fn unlinked_commit(sha: &str, name: Option<&str>) -> HistoryCommit {
    commit_with_author(
        sha,
        Some(CommitAuthor {
            user: None,
            name: name.map(str::to_string),
            email: None,
        }),
    )
}

pub(crate) fn commit_with_author(sha: &str, author: Option<CommitAuthor>) -> HistoryCommit {
    HistoryCommit {
        oid: sha.to_string(),
        message: format!("Commit {}", sha),
        committed_date: "2024-03-01T10:00:00Z".to_string(),
        author,
        additions: Some(1),
        deletions: Some(0),
        changed_files_if_available: Some(1),
    }
}

pub(crate) fn file_entry(filename: &str, status: &str, patch: Option<&str>) -> CommitFileEntry {
    CommitFileEntry {
        filename: filename.to_string(),
        status: status.to_string(),
        additions: Some(3),
        deletions: Some(2),
        changes: Some(5),
        patch: patch.map(str::to_string),
        binary: None,
        previous_filename: None,
    }
}
