#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error types for developer platform operations.
///
/// This enum represents the failures that can occur when talking to a version
/// control platform such as GitHub. The variants keep transport problems, HTTP
/// level problems and query level problems apart so that callers can decide how
/// to react without inspecting error messages.
///
/// # Examples
///
/// ```rust
/// use vc_data_fetcher_developer_platforms::errors::Error;
///
/// let error = Error::Protocol { status_code: 502 };
/// assert_eq!(error.to_string(), "The platform API responded with HTTP status 502");
///
/// let rate_limit = Error::RateLimitExceeded;
/// assert_eq!(rate_limit.to_string(), "Rate limit exceeded");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP client could not be constructed.
    ///
    /// Raised when the underlying client rejects its configuration, for
    /// instance because of an invalid user agent or TLS backend failure.
    #[error("Failed to configure the HTTP client: {0}")]
    ClientConfiguration(String),

    /// A GraphQL query returned a top-level `errors` array.
    ///
    /// The messages are copied verbatim from the response. Errors that indicate
    /// an unknown or inaccessible repository are reported as
    /// [`Error::RepositoryUnresolvable`] instead.
    #[error("GraphQL query failed: {}", messages.join("; "))]
    GraphQlQuery { messages: Vec<String> },

    /// The response body did not have the expected shape.
    ///
    /// This covers malformed JSON as well as JSON that is missing fields the
    /// typed decoding layer requires.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// The platform answered with a non-success HTTP status.
    #[error("The platform API responded with HTTP status {status_code}")]
    Protocol { status_code: u16 },

    /// Platform rate limit exceeded.
    ///
    /// GitHub signals this with a 403 or 429 status and an
    /// `x-ratelimit-remaining` header of zero. No backoff is attempted.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The repository could not be resolved with the supplied credential.
    ///
    /// GitHub does not distinguish between a repository that does not exist
    /// and one the token is not allowed to see, so both end up here.
    #[error("Could not resolve the repository: {}", messages.join("; "))]
    RepositoryUnresolvable { messages: Vec<String> },

    /// The request did not complete within the configured timeout.
    #[error("The request to the platform API timed out")]
    Timeout,

    /// The request could not be sent or the response could not be read.
    #[error("Failed to reach the platform API: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else if e.is_decode() {
            Error::InvalidResponse(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}
