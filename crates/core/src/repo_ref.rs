//! Parsing of repository URLs into owner / name pairs.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use tracing::{debug, warn};

use crate::config::DEFAULT_PROFILE_HOST;
use crate::errors::AnalysisError;

#[cfg(test)]
#[path = "repo_ref_tests.rs"]
mod tests;

lazy_static! {
    /// `https://<host>/<owner>/<repo>` with an optional `.git` suffix and trailing slash
    static ref REPOSITORY_URL_REGEX: Regex = Regex::new(
        r"^https://([^/\s]+)/([^/\s?#]+)/([^/\s?#]+?)(?:\.git)?/?$"
    ).expect("Failed to compile repository URL regex");
}

/// A repository on the hosting platform, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    owner: String,
    name: String,
}

impl RepoRef {
    /// Parses a GitHub repository URL.
    ///
    /// Leading and trailing whitespace is ignored. A `.git` suffix and a single
    /// trailing slash are accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_data_fetcher_core::repo_ref::RepoRef;
    ///
    /// let repo = RepoRef::parse("https://github.com/acme/widgets.git").unwrap();
    /// assert_eq!(repo.owner(), "acme");
    /// assert_eq!(repo.name(), "widgets");
    ///
    /// assert!(RepoRef::parse("git@github.com:acme/widgets.git").is_err());
    /// ```
    pub fn parse(url: &str) -> Result<Self, AnalysisError> {
        Self::parse_for_host(url, DEFAULT_PROFILE_HOST)
    }

    /// Parses a repository URL that must point at `host`.
    ///
    /// The host comparison ignores ASCII case.
    pub fn parse_for_host(url: &str, host: &str) -> Result<Self, AnalysisError> {
        debug!(url, "Extracting owner and repo from URL");

        let trimmed = url.trim();
        let parsed = REPOSITORY_URL_REGEX
            .captures(trimmed)
            .filter(|captures| captures[1].eq_ignore_ascii_case(host))
            .map(|captures| RepoRef {
                owner: captures[2].to_string(),
                name: captures[3].to_string(),
            });

        match parsed {
            Some(repo) => Ok(repo),
            None => {
                warn!(url, "Invalid repository URL");
                Err(AnalysisError::InvalidRepoReference(trimmed.to_string()))
            }
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
