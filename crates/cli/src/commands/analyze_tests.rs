use super::*;
use tempfile::TempDir;
use vc_data_fetcher_developer_platforms::models::{Contributor, ContributorWithCommits};

fn args(concurrency: Option<usize>) -> AnalyzeArgs {
    AnalyzeArgs {
        repo: "https://github.com/acme/widgets".to_string(),
        user_id: LOCAL_USER_ID,
        concurrency,
        output: None,
    }
}

#[test]
fn test_apply_overrides_concurrency() {
    let config = apply_overrides(AppConfig::default(), &args(Some(6)));

    assert_eq!(config.analysis.max_concurrent_contributors, 6);
}

#[test]
fn test_apply_overrides_keeps_configured_value() {
    let mut config = AppConfig::default();
    config.analysis.max_concurrent_contributors = 3;

    let config = apply_overrides(config, &args(None));

    assert_eq!(config.analysis.max_concurrent_contributors, 3);
}

#[test]
fn test_write_output_to_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("report.json");
    let report = vec![ContributorWithCommits::new(
        Contributor {
            author_name: "alice".to_string(),
            github_url: "https://github.com/alice".to_string(),
            contributions: 0,
        },
        Vec::new(),
    )];

    write_output(&report, Some(path.clone())).expect("Failed to write report");

    let content = fs::read_to_string(&path).expect("Failed to read report");
    let json: serde_json::Value = serde_json::from_str(&content).expect("Report should be JSON");
    assert_eq!(json[0]["authorName"], "alice");
    assert_eq!(json[0]["githubUrl"], "https://github.com/alice");
    assert_eq!(json[0]["commits"], serde_json::json!([]));
}

#[test]
fn test_write_output_to_missing_directory_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("missing").join("report.json");

    let result = write_output(&Vec::<ContributorWithCommits>::new(), Some(path));

    match result {
        Err(CliError::Other(message)) => {
            assert!(message.starts_with("Failed to write the report to"));
        }
        other => panic!("Expected a write error, got {:?}", other),
    }
}
