use async_trait::async_trait;

pub mod errors;

pub mod github;

pub mod models;
use errors::Error;
use models::{AccessCredential, CommitFileEntry, CommitHistoryPage, RepositorySummary};

/// Trait for reading repository and commit data from a developer platform
/// (e.g., GitHub).
///
/// Every method takes the credential of the user on whose behalf the call is
/// made, so one provider instance can be shared between concurrent requests
/// for different users.
///
/// # Example Implementation
///
/// ```rust,no_run
/// use vc_data_fetcher_developer_platforms::{
///     CommitHistoryProvider,
///     errors::Error,
///     models::{AccessCredential, CommitFileEntry, CommitHistoryPage, RepositorySummary},
/// };
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct StaticProvider;
///
/// #[async_trait]
/// impl CommitHistoryProvider for StaticProvider {
///     async fn repository_summary(
///         &self,
///         repo_owner: &str,
///         repo_name: &str,
///         credential: &AccessCredential,
///     ) -> Result<RepositorySummary, Error> {
///         // Look up the repository on the platform
///         # unimplemented!()
///     }
///
///     # async fn commit_history_page(&self, _: &str, _: &str, _: Option<&str>, _: &AccessCredential) -> Result<Option<CommitHistoryPage>, Error> { unimplemented!() }
///     # async fn commit_files(&self, _: &str, _: &str, _: &str, _: &AccessCredential) -> Result<Vec<CommitFileEntry>, Error> { unimplemented!() }
/// }
/// ```
#[async_trait]
pub trait CommitHistoryProvider: Send + Sync {
    /// Checks that a repository exists and is visible to the credential.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `credential` - The credential of the calling user
    ///
    /// # Returns
    ///
    /// The repository summary, or [`Error::RepositoryUnresolvable`] when the
    /// platform cannot resolve the repository for this credential.
    async fn repository_summary(
        &self,
        repo_owner: &str,
        repo_name: &str,
        credential: &AccessCredential,
    ) -> Result<RepositorySummary, Error>;

    /// Fetches one page of the default branch commit history.
    ///
    /// Pages hold up to 100 commits, newest first. Pass the `end_cursor` of the
    /// previous page as `after` to continue.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `after` - The cursor to continue from, `None` for the first page
    /// * `credential` - The credential of the calling user
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the repository has no default branch (for instance an
    /// empty repository), otherwise the page.
    async fn commit_history_page(
        &self,
        repo_owner: &str,
        repo_name: &str,
        after: Option<&str>,
        credential: &AccessCredential,
    ) -> Result<Option<CommitHistoryPage>, Error>;

    /// Lists the files changed by a single commit.
    ///
    /// # Arguments
    ///
    /// * `repo_owner` - The owner of the repository
    /// * `repo_name` - The name of the repository
    /// * `sha` - The commit SHA
    /// * `credential` - The credential of the calling user
    ///
    /// # Returns
    ///
    /// The file entries in the order the platform lists them.
    async fn commit_files(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        credential: &AccessCredential,
    ) -> Result<Vec<CommitFileEntry>, Error>;
}
