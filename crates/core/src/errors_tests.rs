use super::*;
use std::error::Error as StdError;

fn repo() -> RepoRef {
    RepoRef::parse("https://github.com/acme/widgets").expect("Failed to parse URL")
}

#[test]
fn test_from_upstream_unresolvable_is_access_denied() {
    let error = AnalysisError::from_upstream(
        PlatformError::RepositoryUnresolvable {
            messages: vec!["Could not resolve to a Repository".to_string()],
        },
        &repo(),
    );

    match error {
        AnalysisError::AccessDenied { owner, name } => {
            assert_eq!(owner, "acme");
            assert_eq!(name, "widgets");
        }
        e => panic!("Unexpected error: {:?}", e),
    }
}

#[test]
fn test_from_upstream_other_errors_are_upstream_failures() {
    let error = AnalysisError::from_upstream(PlatformError::RateLimitExceeded, &repo());

    assert!(matches!(
        error,
        AnalysisError::UpstreamFailure(PlatformError::RateLimitExceeded)
    ));
    assert!(error.source().is_some());
}

#[test]
fn test_token_lookup_not_found_is_unauthenticated() {
    let error = AnalysisError::from(TokenLookupError::NotFound(7));

    assert!(matches!(error, AnalysisError::Unauthenticated(7)));
    assert_eq!(error.to_string(), "No access token found for user 7");
}

#[test]
fn test_token_lookup_store_failure_is_credential_store() {
    let error = AnalysisError::from(TokenLookupError::Store("locked".to_string()));

    assert!(matches!(error, AnalysisError::CredentialStore(ref m) if m == "locked"));
}

#[test]
fn test_collection_failure_keeps_source() {
    let error = AnalysisError::CollectionFailure {
        author: "alice".to_string(),
        source: PlatformError::Timeout,
    };

    assert_eq!(
        error.to_string(),
        "Failed to collect commits for contributor 'alice': The request to the platform API timed out"
    );
    assert!(error.source().is_some());
}

#[test]
fn test_invalid_repo_reference_message() {
    let error = AnalysisError::InvalidRepoReference("not a url".to_string());

    assert_eq!(
        error.to_string(),
        "Malformed or unsupported repository URL: 'not a url'"
    );
}

#[test]
fn test_user_message_hides_transport_details() {
    let error = AnalysisError::UpstreamFailure(PlatformError::Transport(
        "dns error: api.github.com".to_string(),
    ));

    assert!(!error.user_message().contains("dns"));
    assert_eq!(
        error.user_message(),
        "A temporary failure occurred while fetching repository data. Please try again."
    );
}

#[test]
fn test_user_messages_are_distinct_per_category() {
    let denied = AnalysisError::AccessDenied {
        owner: "acme".to_string(),
        name: "widgets".to_string(),
    };
    let unauthenticated = AnalysisError::Unauthenticated(1);
    let invalid = AnalysisError::InvalidRepoReference(String::new());

    assert_ne!(denied.user_message(), unauthenticated.user_message());
    assert_ne!(denied.user_message(), invalid.user_message());
    assert_ne!(unauthenticated.user_message(), invalid.user_message());
}
