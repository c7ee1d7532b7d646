//! # Models
//!
//! This module contains the data models shared by the platform clients and the
//! analysis pipeline.
//!
//! Two groups of types live here. The report types ([`Contributor`],
//! [`ContributorWithCommits`], [`CommitRecord`] and [`FileChange`]) make up the
//! output of an analysis run and serialize with the field names that the
//! downstream analysis service expects. The remaining types are the typed
//! decodings of the GitHub GraphQL and REST payloads, decoded once at the
//! client boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// A bearer token that grants access to a platform on behalf of one user.
///
/// The token value is never printed by the `Debug` implementation so that it
/// cannot leak into logs through `#[instrument]` spans.
///
/// # Examples
///
/// ```
/// use vc_data_fetcher_developer_platforms::models::AccessCredential;
///
/// let credential = AccessCredential::new("gho_secret");
/// assert_eq!(credential.token(), "gho_secret");
/// assert!(!format!("{:?}", credential).contains("gho_secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessCredential {
    token: String,
}

impl AccessCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The raw bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A contributor discovered while paging through the commit history.
///
/// The contributor identity is `author_name`: either the platform login of the
/// commit author or, when the author has no linked platform account, the raw
/// author name taken from the commit.
///
/// # Fields
///
/// * `author_name` - The login or fallback author name
/// * `github_url` - The profile URL, synthesized for fallback identities
/// * `contributions` - The number of commits attributed to the contributor
///
/// # Examples
///
/// ```
/// use vc_data_fetcher_developer_platforms::models::Contributor;
///
/// let contributor = Contributor {
///     author_name: "alice".to_string(),
///     github_url: "https://github.com/alice".to_string(),
///     contributions: 3,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    /// The login or fallback author name
    pub author_name: String,

    /// The profile URL of the contributor
    pub github_url: String,

    /// The number of commits attributed to the contributor
    pub contributions: u64,
}

/// A contributor together with the commits attributed to them.
///
/// This is the unit of output of a full analysis run. One entry is produced
/// per contributor, in the order the contributors were discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorWithCommits {
    /// The login or fallback author name
    pub author_name: String,

    /// The profile URL of the contributor
    pub github_url: String,

    /// The number of commits attributed to the contributor
    pub contributions: u64,

    /// The contributor's commits, newest first
    pub commits: Vec<CommitRecord>,
}

impl ContributorWithCommits {
    /// Pairs a contributor with the commits collected for them.
    pub fn new(contributor: Contributor, commits: Vec<CommitRecord>) -> Self {
        Self {
            author_name: contributor.author_name,
            github_url: contributor.github_url,
            contributions: contributor.contributions,
            commits,
        }
    }
}

/// A single commit with its per-file change details.
///
/// Serialized as `{sha, msg, date, files}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// The commit SHA
    pub sha: String,

    /// The full commit message
    #[serde(rename = "msg")]
    pub message: String,

    /// The ISO-8601 commit timestamp as reported by the platform
    #[serde(rename = "date")]
    pub committed_date: String,

    /// The changed files, in the order the platform lists them
    pub files: Vec<FileChange>,
}

/// The change made to one file by one commit.
///
/// # Fields
///
/// * `file_name` - The final path segment of `full_path`
/// * `full_path` - The path of the file within the repository
/// * `extension` - The text after the last `.` of `file_name`, or empty
/// * `operation` - The platform status, e.g. `added`, `removed`, `modified` or `renamed`
/// * `code` - The unified diff, or a placeholder comment when no patch is available
/// * `additions` / `deletions` / `changes` - Line statistics
/// * `is_binary` - Whether the platform flagged the file as binary
/// * `previous_filename` - The old path of a renamed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub file_name: String,
    pub full_path: String,
    pub extension: String,
    pub operation: String,
    pub code: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    #[serde(rename = "binaryFile")]
    pub is_binary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

/// Owner information of a repository as returned by the visibility query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// The result of the repository existence and visibility query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub name: String,
    pub is_private: bool,
    pub owner: RepositoryOwner,
}

/// Cursor state of a paginated GraphQL connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One page of the default branch commit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitHistoryPage {
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<HistoryCommit>,
}

/// A commit as listed in the GraphQL commit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryCommit {
    pub oid: String,
    pub message: String,
    pub committed_date: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
    #[serde(default)]
    pub additions: Option<u64>,
    #[serde(default)]
    pub deletions: Option<u64>,
    #[serde(default)]
    pub changed_files_if_available: Option<u64>,
}

/// The git author of a commit.
///
/// `user` is only present when the author email maps to a platform account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub user: Option<AuthorUser>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The platform account linked to a commit author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorUser {
    pub login: String,
    pub url: String,
}

/// A file entry of the REST commit detail payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFileEntry {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub additions: Option<u64>,
    #[serde(default)]
    pub deletions: Option<u64>,
    #[serde(default)]
    pub changes: Option<u64>,
    #[serde(default)]
    pub patch: Option<String>,
    #[serde(default)]
    pub binary: Option<bool>,
    #[serde(default)]
    pub previous_filename: Option<String>,
}
