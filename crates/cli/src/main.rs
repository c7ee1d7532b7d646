//! # VC Data Fetcher CLI
//!
//! Command-line interface for fetching contributor and commit data of GitHub
//! repositories.
//!
//! The CLI reads GitHub personal access tokens from the OS keyring and runs
//! the same analysis pipeline as the HTTP service, printing the results as
//! JSON.
//!
//! # Commands
//!
//! - `auth github` - Store a GitHub token in the keyring
//! - `check-access` - Check that a repository can be read
//! - `analyze` - Fetch all contributors with their commits and file changes
//! - `contributors` - Fetch the contributor roster
//! - `commits` - Fetch the commits of one author
//!
//! # Examples
//!
//! ```bash
//! # Store a token
//! echo "$GITHUB_TOKEN" | vc-data-fetcher auth github
//!
//! # Analyze a repository, four contributors at a time
//! vc-data-fetcher analyze --repo https://github.com/owner/repo --concurrency 4 --output report.json
//! ```

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use std::process::{ExitCode, Termination};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Command implementations for the CLI.
mod commands;

/// Configuration management for the CLI.
mod config;

/// Error types specific to the CLI.
mod errors;

use commands::{
    analyze::AnalyzeArgs,
    auth::AuthCommands,
    repository::{CommitsArgs, RepoArgs},
};
use config::{get_config_path, AppConfig};
use errors::CliError;

/// Environment variable holding the log filter
const LOG_ENV: &str = "VC_DATA_FETCHER_LOG";

/// Command-line interface structure for VC Data Fetcher.
///
/// This struct defines the top-level CLI interface using clap's derive API.
/// It includes global options like verbose logging and the main command structure.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Alternate config file
    #[arg(short, long)]
    config: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands for the VC Data Fetcher CLI.
#[derive(Subcommand)]
enum Commands {
    /// Fetch all contributors with their commits and file changes
    Analyze(AnalyzeArgs),

    /// Authenticate with Git providers
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Check that a repository can be read with the stored token
    CheckAccess(RepoArgs),

    /// Fetch the commits of one author
    Commits(CommitsArgs),

    /// Fetch the contributors of a repository
    Contributors(RepoArgs),
}

/// Cancels `cancel` when Ctrl-C is pressed.
fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted. Cancelling");
                cancel.cancel();
            }
            Err(e) => error!(error = e.to_string(), "Failed to listen for Ctrl-C"),
        }
    });
}

/// Executes the parsed command.
#[instrument(skip(cli))]
async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config_path = get_config_path(cli.config.as_deref());
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    match cli.command {
        Commands::Analyze(args) => {
            let config = AppConfig::load_or_default(&config_path)?;
            commands::analyze::execute(args, config, &cancel).await
        }
        Commands::Auth(cmd) => commands::auth::execute(cmd).await,
        Commands::CheckAccess(args) => {
            let analyzer = commands::create_analyzer(AppConfig::load_or_default(&config_path)?)?;
            commands::repository::check_access(&analyzer, args, &cancel).await
        }
        Commands::Commits(args) => {
            let analyzer = commands::create_analyzer(AppConfig::load_or_default(&config_path)?)?;
            commands::repository::commits(&analyzer, args, &cancel).await
        }
        Commands::Contributors(args) => {
            let analyzer = commands::create_analyzer(AppConfig::load_or_default(&config_path)?)?;
            commands::repository::contributors(&analyzer, args, &cancel).await
        }
    }
}

/// Main entry point for the VC Data Fetcher CLI.
///
/// Initializes logging, parses the command line and runs the command. Errors
/// are printed to stderr and mapped to the exit code of their category.
#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().pretty().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            e.report()
        }
    }
}
