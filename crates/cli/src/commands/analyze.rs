use anyhow::Context;
use clap::Args;
use serde::Serialize;
use std::{fs, path::PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use vc_data_fetcher_core::tokens::UserId;

use crate::commands::{auth::LOCAL_USER_ID, create_analyzer};
use crate::config::AppConfig;
use crate::errors::CliError;

#[cfg(test)]
#[path = "analyze_tests.rs"]
mod tests;

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Repository URL, e.g. https://github.com/owner/repo
    #[arg(short, long)]
    pub repo: String,

    /// The identity whose stored token is used
    #[arg(long, default_value_t = LOCAL_USER_ID)]
    pub user_id: UserId,

    /// Number of contributors collected at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Applies the command line overrides to the loaded configuration.
pub fn apply_overrides(mut config: AppConfig, args: &AnalyzeArgs) -> AppConfig {
    if let Some(concurrency) = args.concurrency {
        config.analysis.max_concurrent_contributors = concurrency;
    }
    config
}

/// Run the full analysis of a repository
#[instrument(skip(config, cancel))]
pub async fn execute(
    args: AnalyzeArgs,
    config: AppConfig,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let analyzer = create_analyzer(apply_overrides(config, &args))?;

    let report = analyzer.run(&args.repo, args.user_id, cancel).await?;
    info!(contributors = report.len(), "Analysis finished");

    write_output(&report, args.output)
}

/// Writes a value as pretty printed JSON to a file, or to stdout without a path.
pub fn write_output<T: Serialize>(value: &T, path: Option<PathBuf>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize the report")?;

    match path {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write the report to {:?}", path))?;
            info!("Report written to {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
