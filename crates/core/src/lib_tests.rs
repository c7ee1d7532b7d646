use crate::{
    config::AnalyzerConfig,
    errors::AnalysisError,
    mock_provider::{file_entry, linked_commit, unlinked_commit, MockProvider, SummaryOutcome},
    tokens::InMemoryTokenStore,
    ContributionAnalyzer,
};
use tokio::test;
use tokio_util::sync::CancellationToken;
use vc_data_fetcher_developer_platforms::models::AccessCredential;

const REPO_URL: &str = "https://github.com/acme/widgets";
const USER_ID: u64 = 42;

async fn analyzer_for(
    provider: MockProvider,
    config: AnalyzerConfig,
) -> ContributionAnalyzer<MockProvider, InMemoryTokenStore> {
    let tokens = InMemoryTokenStore::new();
    tokens.store(USER_ID, AccessCredential::new("gho_token")).await;
    ContributionAnalyzer::with_config(provider, tokens, config)
}

fn acme_widgets_history() -> MockProvider {
    MockProvider::new(vec![
        vec![
            linked_commit("c1", "alice"),
            linked_commit("c2", "bob"),
            linked_commit("c3", "alice"),
        ],
        vec![unlinked_commit("c4", Some("Carol")), linked_commit("c5", "bob")],
    ])
    .with_files(
        "c1",
        vec![
            file_entry("src/widget.rs", "modified", Some("@@ -1 +1 @@\n-old\n+new")),
            file_entry("src/gear.rs", "added", None),
        ],
    )
}

#[test]
async fn test_run_end_to_end() {
    let analyzer = analyzer_for(acme_widgets_history(), AnalyzerConfig::default()).await;

    let report = analyzer
        .run(REPO_URL, USER_ID, &CancellationToken::new())
        .await
        .expect("Run should succeed");

    let names: Vec<&str> = report.iter().map(|c| c.author_name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob", "Carol"]);

    let alice = &report[0];
    assert_eq!(alice.contributions, 2);
    assert_eq!(alice.github_url, "https://github.com/alice");
    let shas: Vec<&str> = alice.commits.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["c1", "c3"]);
    assert_eq!(alice.commits[0].files.len(), 2);
    assert_eq!(alice.commits[0].files[0].extension, "rs");
    assert_eq!(alice.commits[0].files[1].code, "// New file added");

    let bob = &report[1];
    assert_eq!(bob.contributions, 2);
    assert_eq!(bob.commits.len(), 2);

    let carol = &report[2];
    assert_eq!(carol.github_url, "https://github.com/Carol");
    assert_eq!(carol.commits.len(), 1);
}

#[test]
async fn test_run_patch_and_placeholder_per_author() {
    let mut alice_file = file_entry("src/widget.rs", "added", Some("@@ -0,0 +1,10 @@\n+fn widget() {}"));
    alice_file.additions = Some(10);
    alice_file.deletions = Some(0);
    alice_file.changes = Some(10);
    let mut bob_file = file_entry("src/gear.rs", "modified", None);
    bob_file.additions = Some(2);
    bob_file.deletions = Some(1);
    bob_file.changes = Some(3);
    let provider = MockProvider::new(vec![vec![
        linked_commit("a1", "alice"),
        linked_commit("b1", "bob"),
    ]])
    .with_files("a1", vec![alice_file])
    .with_files("b1", vec![bob_file]);
    let analyzer = analyzer_for(provider, AnalyzerConfig::default()).await;

    let report = analyzer
        .run(REPO_URL, USER_ID, &CancellationToken::new())
        .await
        .expect("Run should succeed");

    assert_eq!(report.len(), 2);

    let alice = &report[0];
    assert_eq!(alice.author_name, "alice");
    assert_eq!(alice.contributions, 1);
    assert_eq!(alice.commits.len(), 1);
    let alice_change = &alice.commits[0].files[0];
    assert_eq!(alice_change.code, "@@ -0,0 +1,10 @@\n+fn widget() {}");
    assert_eq!(alice_change.operation, "added");
    assert_eq!(alice_change.additions, 10);
    assert_eq!(alice_change.deletions, 0);

    let bob = &report[1];
    assert_eq!(bob.author_name, "bob");
    assert_eq!(bob.contributions, 1);
    assert_eq!(bob.commits.len(), 1);
    let bob_change = &bob.commits[0].files[0];
    assert_eq!(bob_change.code, "// No patch data available");
    assert_eq!(bob_change.operation, "modified");
    assert_eq!(bob_change.changes, 3);
}

#[test]
async fn test_run_commit_counts_match_contributions() {
    let analyzer = analyzer_for(acme_widgets_history(), AnalyzerConfig::default()).await;

    let report = analyzer
        .run(REPO_URL, USER_ID, &CancellationToken::new())
        .await
        .expect("Run should succeed");

    for contributor in report {
        assert_eq!(
            contributor.commits.len() as u64,
            contributor.contributions,
            "commit count of '{}'",
            contributor.author_name
        );
    }
}

#[test]
async fn test_run_isolates_failing_contributor() {
    // Calls 0 and 1 build the roster, calls 2 and 3 page through history for
    // alice, call 4 is bob's first page.
    let provider = acme_widgets_history().failing_history_call(4);
    let analyzer = analyzer_for(provider, AnalyzerConfig::default()).await;

    let report = analyzer
        .run(REPO_URL, USER_ID, &CancellationToken::new())
        .await
        .expect("Run should succeed");

    assert_eq!(report.len(), 3);
    assert_eq!(report[0].commits.len(), 2);
    assert_eq!(report[1].author_name, "bob");
    assert_eq!(report[1].contributions, 2);
    assert!(report[1].commits.is_empty());
    assert_eq!(report[2].commits.len(), 1);
}

#[test]
async fn test_run_roster_failure_fails_run() {
    let provider = acme_widgets_history().failing_history_call(0);
    let analyzer = analyzer_for(provider, AnalyzerConfig::default()).await;

    let result = analyzer
        .run(REPO_URL, USER_ID, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AnalysisError::UpstreamFailure(_))));
}

#[test]
async fn test_run_empty_repository() {
    let analyzer = analyzer_for(MockProvider::without_default_branch(), AnalyzerConfig::default()).await;

    let report = analyzer
        .run(REPO_URL, USER_ID, &CancellationToken::new())
        .await
        .expect("Run should succeed");

    assert!(report.is_empty());
}

#[test]
async fn test_run_keeps_order_under_concurrency() {
    let config = AnalyzerConfig {
        max_concurrent_contributors: 4,
        ..AnalyzerConfig::default()
    };
    let analyzer = analyzer_for(acme_widgets_history(), config).await;

    let report = analyzer
        .run(REPO_URL, USER_ID, &CancellationToken::new())
        .await
        .expect("Run should succeed");

    let names: Vec<&str> = report.iter().map(|c| c.author_name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob", "Carol"]);
    assert_eq!(report[0].commits.len(), 2);
}

#[test]
async fn test_run_cancelled_mid_collection_returns_no_report() {
    let cancel = CancellationToken::new();
    let provider = acme_widgets_history().cancelling_on_file_call(cancel.clone());
    let analyzer = analyzer_for(provider, AnalyzerConfig::default()).await;

    let result = analyzer.run(REPO_URL, USER_ID, &cancel).await;

    assert!(matches!(result, Err(AnalysisError::Cancelled)));
}

#[test]
async fn test_run_without_token_is_unauthenticated_without_network_calls() {
    let analyzer = ContributionAnalyzer::new(acme_widgets_history(), InMemoryTokenStore::new());

    let result = analyzer
        .run(REPO_URL, USER_ID, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AnalysisError::Unauthenticated(USER_ID))));
    assert_eq!(analyzer.provider.total_calls(), 0);
}

#[test]
async fn test_invalid_url_is_rejected_without_network_calls() {
    let analyzer = analyzer_for(acme_widgets_history(), AnalyzerConfig::default()).await;

    let result = analyzer
        .run("git@github.com:acme/widgets.git", USER_ID, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AnalysisError::InvalidRepoReference(_))));
    assert_eq!(analyzer.provider.total_calls(), 0);
}

#[test]
async fn test_check_access_accessible() {
    let analyzer = analyzer_for(acme_widgets_history(), AnalyzerConfig::default()).await;

    let summary = analyzer
        .check_access(REPO_URL, USER_ID, &CancellationToken::new())
        .await
        .expect("Repository should be accessible");

    assert_eq!(summary.name, "widgets");
    assert_eq!(summary.owner.login, "acme");
    assert_eq!(analyzer.provider.summary_calls(), 1);
    assert_eq!(analyzer.provider.history_calls(), 0);
}

#[test]
async fn test_check_access_denied() {
    let provider = acme_widgets_history().with_summary(SummaryOutcome::Unresolvable);
    let analyzer = analyzer_for(provider, AnalyzerConfig::default()).await;

    let result = analyzer
        .check_access(REPO_URL, USER_ID, &CancellationToken::new())
        .await;

    match result {
        Err(AnalysisError::AccessDenied { owner, name }) => {
            assert_eq!(owner, "acme");
            assert_eq!(name, "widgets");
        }
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
async fn test_check_access_upstream_failure() {
    let provider = acme_widgets_history().with_summary(SummaryOutcome::Failing);
    let analyzer = analyzer_for(provider, AnalyzerConfig::default()).await;

    let result = analyzer
        .check_access(REPO_URL, USER_ID, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AnalysisError::UpstreamFailure(_))));
}

#[test]
async fn test_check_access_cancelled() {
    let analyzer = analyzer_for(acme_widgets_history(), AnalyzerConfig::default()).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = analyzer.check_access(REPO_URL, USER_ID, &cancel).await;

    assert!(matches!(result, Err(AnalysisError::Cancelled)));
}

#[test]
async fn test_contributors() {
    let analyzer = analyzer_for(acme_widgets_history(), AnalyzerConfig::default()).await;

    let contributors = analyzer
        .contributors(REPO_URL, USER_ID, &CancellationToken::new())
        .await
        .expect("Contributors should be returned");

    let summary: Vec<(&str, u64)> = contributors
        .iter()
        .map(|c| (c.author_name.as_str(), c.contributions))
        .collect();
    assert_eq!(summary, vec![("alice", 2), ("bob", 2), ("Carol", 1)]);
    assert_eq!(analyzer.provider.file_calls(), 0);
}

#[test]
async fn test_commits_by_author() {
    let analyzer = analyzer_for(acme_widgets_history(), AnalyzerConfig::default()).await;

    let result = analyzer
        .commits_by_author(REPO_URL, "bob", USER_ID, &CancellationToken::new())
        .await
        .expect("Commits should be returned");

    assert_eq!(result.author_name, "bob");
    assert_eq!(result.total_commits, 2);
    let shas: Vec<&str> = result.commits.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["c2", "c5"]);

    let json = serde_json::to_value(&result).expect("Failed to serialize");
    assert_eq!(json["authorName"], "bob");
    assert_eq!(json["totalCommits"], 2);
    assert_eq!(json["commits"][0]["msg"], "Commit c2");
}

#[test]
async fn test_commits_by_author_history_failure_is_upstream_failure() {
    let provider = acme_widgets_history().failing_history_call(0);
    let analyzer = analyzer_for(provider, AnalyzerConfig::default()).await;

    let result = analyzer
        .commits_by_author(REPO_URL, "bob", USER_ID, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AnalysisError::UpstreamFailure(_))));
}
