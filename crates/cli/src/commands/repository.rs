use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;
use vc_data_fetcher_core::tokens::UserId;

use crate::commands::{analyze::write_output, auth::LOCAL_USER_ID, Analyzer};
use crate::errors::CliError;

/// Arguments of the commands that only name a repository
#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Repository URL, e.g. https://github.com/owner/repo
    #[arg(short, long)]
    pub repo: String,

    /// The identity whose stored token is used
    #[arg(long, default_value_t = LOCAL_USER_ID)]
    pub user_id: UserId,
}

/// Arguments of the commits command
#[derive(Args, Debug)]
pub struct CommitsArgs {
    /// Repository URL, e.g. https://github.com/owner/repo
    #[arg(short, long)]
    pub repo: String,

    /// Login, or git author name for authors without a GitHub account
    #[arg(short, long)]
    pub author: String,

    /// The identity whose stored token is used
    #[arg(long, default_value_t = LOCAL_USER_ID)]
    pub user_id: UserId,
}

/// Check that the stored token can read the repository
pub async fn check_access(
    analyzer: &Analyzer,
    args: RepoArgs,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let summary = analyzer
        .check_access(&args.repo, args.user_id, cancel)
        .await?;

    info!(repository = summary.name.as_str(), "Repository is accessible");
    println!(
        "Repository {}/{} is accessible ({})",
        summary.owner.login,
        summary.name,
        if summary.is_private { "private" } else { "public" }
    );
    Ok(())
}

/// Print the commits of one author as JSON
pub async fn commits(
    analyzer: &Analyzer,
    args: CommitsArgs,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let commits = analyzer
        .commits_by_author(&args.repo, &args.author, args.user_id, cancel)
        .await?;

    write_output(&commits, None)
}

/// Print the contributor roster as JSON
pub async fn contributors(
    analyzer: &Analyzer,
    args: RepoArgs,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let contributors = analyzer
        .contributors(&args.repo, args.user_id, cancel)
        .await?;

    write_output(&contributors, None)
}
