use async_trait::async_trait;
use indoc::indoc;
use reqwest::{header, header::HeaderMap, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    errors::Error,
    models::{AccessCredential, CommitFileEntry, CommitHistoryPage, RepositorySummary},
    CommitHistoryProvider,
};

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;

/// Media type requested from the GitHub API
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Header carrying the REST API version
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Number of commits requested per history page
pub const HISTORY_PAGE_SIZE: usize = 100;

/// Checks that a repository exists and can be read with the given token.
pub const REPOSITORY_ACCESS_QUERY: &str = indoc! {r"
    query($owner: String!, $name: String!) {
      repository(owner: $owner, name: $name) {
        name
        isPrivate
        owner {
          login
        }
      }
    }
"};

/// Pages through the default branch history, 100 commits at a time.
pub const REPOSITORY_COMMITS_QUERY: &str = indoc! {r"
    query($owner: String!, $name: String!, $after: String) {
      repository(owner: $owner, name: $name) {
        defaultBranchRef {
          target {
            ... on Commit {
              history(first: 100, after: $after) {
                pageInfo {
                  hasNextPage
                  endCursor
                }
                nodes {
                  oid
                  message
                  committedDate
                  author {
                    user {
                      login
                      url
                    }
                    name
                    email
                  }
                  additions
                  deletions
                  changedFilesIfAvailable
                }
              }
            }
          }
        }
      }
    }
"};

/// Connection settings for the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// The GraphQL endpoint
    #[serde(default = "GitHubConfig::default_graphql_url")]
    pub graphql_url: String,

    /// The base URL of the REST API
    #[serde(default = "GitHubConfig::default_api_base_url")]
    pub api_base_url: String,

    /// The value sent in the `X-GitHub-Api-Version` header
    #[serde(default = "GitHubConfig::default_api_version")]
    pub api_version: String,

    /// Per request timeout
    #[serde(default = "GitHubConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// GitHub rejects requests without a user agent
    #[serde(default = "GitHubConfig::default_user_agent")]
    pub user_agent: String,
}

impl GitHubConfig {
    fn default_graphql_url() -> String {
        "https://api.github.com/graphql".to_string()
    }

    fn default_api_base_url() -> String {
        "https://api.github.com".to_string()
    }

    fn default_api_version() -> String {
        "2022-11-28".to_string()
    }

    fn default_request_timeout_secs() -> u64 {
        30
    }

    fn default_user_agent() -> String {
        concat!("vc-data-fetcher/", env!("CARGO_PKG_VERSION")).to_string()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            graphql_url: Self::default_graphql_url(),
            api_base_url: Self::default_api_base_url(),
            api_version: Self::default_api_version(),
            request_timeout_secs: Self::default_request_timeout_secs(),
            user_agent: Self::default_user_agent(),
        }
    }
}

/// Creates the HTTP client used for all GitHub calls.
///
/// The client applies the configured per request timeout and user agent. It is
/// cheap to clone and safe to share between concurrent requests.
///
/// # Errors
///
/// Returns [`Error::ClientConfiguration`] if the client cannot be built.
#[instrument]
pub fn create_http_client(config: &GitHubConfig) -> Result<Client, Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| {
            error!(error = e.to_string(), "Failed to build the HTTP client");
            Error::ClientConfiguration(e.to_string())
        })
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,

    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,

    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryAccessData {
    repository: Option<RepositorySummary>,
}

#[derive(Debug, Deserialize)]
struct CommitHistoryData {
    repository: Option<HistoryRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRepository {
    default_branch_ref: Option<DefaultBranchRef>,
}

#[derive(Debug, Deserialize)]
struct DefaultBranchRef {
    target: Option<HistoryTarget>,
}

#[derive(Debug, Deserialize)]
struct HistoryTarget {
    #[serde(default)]
    history: Option<CommitHistoryPage>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    files: Option<Vec<CommitFileEntry>>,
}

fn classify_graphql_errors(errors: Vec<GraphQlError>) -> Error {
    let unresolvable = errors.iter().any(|e| {
        e.kind.as_deref() == Some("NOT_FOUND")
            || e.message.starts_with("Could not resolve to a Repository")
    });
    let messages = errors.into_iter().map(|e| e.message).collect();

    if unresolvable {
        Error::RepositoryUnresolvable { messages }
    } else {
        Error::GraphQlQuery { messages }
    }
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false)
}

fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && rate_limit_exhausted(response.headers()))
    {
        return Err(Error::RateLimitExceeded);
    }

    Err(Error::Protocol {
        status_code: status.as_u16(),
    })
}

fn log_request_error(message: &str, e: &Error) {
    match e {
        Error::RepositoryUnresolvable { messages } => warn!(
            error_message = messages.join("; "),
            "{}. The repository could not be resolved.", message
        ),
        Error::Protocol { status_code } => error!(
            status_code,
            "{}. Received an unexpected status from GitHub", message
        ),
        _ => error!(error_message = e.to_string(), message),
    }
}

/// A [`CommitHistoryProvider`] backed by the GitHub GraphQL and REST APIs.
///
/// The provider keeps no per-user state; every call carries the credential it
/// runs with.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: Client,
    config: GitHubConfig,
}

impl GitHubProvider {
    /// Executes a GraphQL query and decodes its `data` node.
    ///
    /// # Arguments
    ///
    /// * `query` - The GraphQL document
    /// * `variables` - The query variables
    /// * `credential` - The bearer credential to send
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] / [`Error::Timeout`] when the request fails to complete
    /// * [`Error::Protocol`] for a non-success status
    /// * [`Error::RepositoryUnresolvable`] when GitHub cannot resolve the repository
    /// * [`Error::GraphQlQuery`] for any other query error
    /// * [`Error::InvalidResponse`] when the data does not decode into `D`
    #[instrument(skip(self, query, credential))]
    pub async fn execute<D: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        credential: &AccessCredential,
    ) -> Result<D, Error> {
        debug!("Executing GraphQL query");

        let body = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .client
            .post(self.config.graphql_url.as_str())
            .bearer_auth(credential.token())
            .header(header::ACCEPT, GITHUB_MEDIA_TYPE)
            .json(&body)
            .send()
            .await?;
        debug!(status = response.status().as_u16(), "GraphQL query response");

        let response = check_status(response)?;
        let text = response.text().await?;
        let envelope: GraphQlResponse =
            serde_json::from_str(&text).map_err(|e| Error::InvalidResponse(e.to_string()))?;

        if let Some(errors) = envelope.errors {
            return Err(classify_graphql_errors(errors));
        }

        let data = envelope
            .data
            .ok_or_else(|| Error::InvalidResponse("The response contained no data".to_string()))?;
        serde_json::from_value(data).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    /// Fetches the REST commit detail and returns its file list.
    #[instrument(skip(self, credential))]
    async fn get_commit_detail(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        credential: &AccessCredential,
    ) -> Result<CommitDetail, Error> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.config.api_base_url.trim_end_matches('/'),
            repo_owner,
            repo_name,
            sha
        );

        let response = self
            .client
            .get(url)
            .bearer_auth(credential.token())
            .header(header::ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, self.config.api_version.as_str())
            .send()
            .await?;

        let response = check_status(response)?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    /// Creates a provider from the connection settings.
    pub fn from_config(config: GitHubConfig) -> Result<Self, Error> {
        let client = create_http_client(&config)?;
        Ok(Self::new(client, config))
    }

    pub fn new(client: Client, config: GitHubConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl CommitHistoryProvider for GitHubProvider {
    #[instrument(skip(self, credential))]
    async fn repository_summary(
        &self,
        repo_owner: &str,
        repo_name: &str,
        credential: &AccessCredential,
    ) -> Result<RepositorySummary, Error> {
        let variables = json!({
            "owner": repo_owner,
            "name": repo_name,
        });

        let data: RepositoryAccessData = self
            .execute(REPOSITORY_ACCESS_QUERY, variables, credential)
            .await
            .inspect_err(|e| log_request_error("Failed to query repository access", e))?;

        match data.repository {
            Some(summary) => {
                info!(
                    repository_owner = repo_owner,
                    repository = repo_name,
                    private = summary.is_private,
                    "Repository access confirmed"
                );
                Ok(summary)
            }
            None => {
                warn!(
                    repository_owner = repo_owner,
                    repository = repo_name,
                    "Repository query returned no repository"
                );
                Err(Error::RepositoryUnresolvable {
                    messages: vec![format!(
                        "Could not resolve to a Repository with the name '{}/{}'.",
                        repo_owner, repo_name
                    )],
                })
            }
        }
    }

    #[instrument(skip(self, credential))]
    async fn commit_history_page(
        &self,
        repo_owner: &str,
        repo_name: &str,
        after: Option<&str>,
        credential: &AccessCredential,
    ) -> Result<Option<CommitHistoryPage>, Error> {
        if let Some(cursor) = after {
            debug!(cursor, "Fetching next page of commits");
        }

        let variables = json!({
            "owner": repo_owner,
            "name": repo_name,
            "after": after,
        });

        let data: CommitHistoryData = self
            .execute(REPOSITORY_COMMITS_QUERY, variables, credential)
            .await
            .inspect_err(|e| log_request_error("Failed to fetch commit history", e))?;

        let Some(repository) = data.repository else {
            warn!(
                repository_owner = repo_owner,
                repository = repo_name,
                "Repository data not found or is null"
            );
            return Ok(None);
        };

        let page = repository
            .default_branch_ref
            .and_then(|branch| branch.target)
            .and_then(|target| target.history);
        if page.is_none() {
            warn!(
                repository_owner = repo_owner,
                repository = repo_name,
                "Repository has no default branch ref"
            );
        }

        Ok(page)
    }

    #[instrument(skip(self, credential))]
    async fn commit_files(
        &self,
        repo_owner: &str,
        repo_name: &str,
        sha: &str,
        credential: &AccessCredential,
    ) -> Result<Vec<CommitFileEntry>, Error> {
        debug!(sha, "Fetching file patch data for commit");

        let detail = self
            .get_commit_detail(repo_owner, repo_name, sha, credential)
            .await
            .inspect_err(|e| log_request_error("Failed to fetch commit details", e))?;

        Ok(detail.files.unwrap_or_default())
    }
}
