//! Configuration settings for the analysis pipeline.
//!
//! This module centralizes configuration constants and settings used throughout
//! the crate, making it easier to modify behavior in one place.
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Host used for repository URLs and synthesized profile URLs
pub const DEFAULT_PROFILE_HOST: &str = "github.com";

/// Contributor name used when a commit author carries no name at all
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Code placeholder for an added file without patch data
pub const NEW_FILE_PLACEHOLDER: &str = "// New file added";

/// Code placeholder for a removed file without patch data
pub const FILE_DELETED_PLACEHOLDER: &str = "// File deleted";

/// Code placeholder for any other file without patch data
pub const NO_PATCH_PLACEHOLDER: &str = "// No patch data available";

/// Previous name reported for a rename when the platform omits it
pub const UNKNOWN_PREVIOUS_FILENAME: &str = "unknown";

/// Settings for a [`crate::ContributionAnalyzer`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Number of contributors whose commits are collected at the same time.
    ///
    /// `1` processes contributors one after the other. Larger values collect
    /// several contributors concurrently; the output order is unaffected.
    #[serde(default = "AnalyzerConfig::default_max_concurrent_contributors")]
    pub max_concurrent_contributors: usize,

    /// Host of the platform, used to validate repository URLs and to build
    /// profile URLs for authors without a linked account
    #[serde(default = "AnalyzerConfig::default_profile_host")]
    pub profile_host: String,
}

impl AnalyzerConfig {
    fn default_max_concurrent_contributors() -> usize {
        1
    }

    fn default_profile_host() -> String {
        DEFAULT_PROFILE_HOST.to_string()
    }

    /// The concurrency limit actually applied. Zero is treated as one.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrent_contributors.max(1)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_contributors: Self::default_max_concurrent_contributors(),
            profile_host: Self::default_profile_host(),
        }
    }
}
