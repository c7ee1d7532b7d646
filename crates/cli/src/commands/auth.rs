use async_trait::async_trait;
use clap::Subcommand;
use keyring::Entry;
use std::io::BufRead;
use tracing::{debug, info, instrument};
use vc_data_fetcher_core::{
    errors::TokenLookupError,
    tokens::{TokenProvider, UserId},
};
use vc_data_fetcher_developer_platforms::models::AccessCredential;

use crate::errors::CliError;

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;

/// Service name of the keyring entries
pub const KEY_RING_SERVICE_NAME: &str = "vc_data_fetcher_cli";

/// Identity used when `--user-id` is not given
pub const LOCAL_USER_ID: UserId = 0;

/// Subcommands for the auth command
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a GitHub personal access token, read from stdin
    #[command(name = "github")]
    GitHub {
        /// The identity the token belongs to
        #[arg(long, default_value_t = LOCAL_USER_ID)]
        user_id: UserId,
    },
}

/// Execute the auth command
pub async fn execute(cmd: AuthCommands) -> Result<(), CliError> {
    match cmd {
        AuthCommands::GitHub { user_id } => auth_github(user_id).await,
    }
}

/// Authenticate with GitHub
async fn auth_github(user_id: UserId) -> Result<(), CliError> {
    debug!(user_id, "Storing GitHub token");

    println!("GitHub Personal Access Token Authentication");
    println!("------------------------------------------");
    println!("Please provide your GitHub Personal Access Token:");

    let token = read_token(std::io::stdin().lock())?;
    KeyringTokenStore.store(user_id, &token)?;

    println!("GitHub token stored successfully!");
    Ok(())
}

/// Maps a keyring read failure onto a token lookup failure.
fn lookup_error(user_id: UserId, error: keyring::Error) -> TokenLookupError {
    match error {
        keyring::Error::NoEntry => TokenLookupError::NotFound(user_id),
        e => TokenLookupError::Store(e.to_string()),
    }
}

/// Reads a single token line. Surrounding whitespace is removed.
pub fn read_token<R: BufRead>(mut reader: R) -> Result<String, CliError> {
    let mut token = String::new();
    reader
        .read_line(&mut token)
        .map_err(|e| CliError::AuthError(format!("Failed to read input: {}", e)))?;

    let token = token.trim();
    if token.is_empty() {
        return Err(CliError::AuthError("Token cannot be empty".to_string()));
    }

    Ok(token.to_string())
}

/// The keyring entry holding the token of a user.
pub fn token_entry_name(user_id: UserId) -> String {
    format!("github_token_{}", user_id)
}

/// Token storage in the OS keyring, one entry per identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    fn entry(user_id: UserId) -> Result<Entry, keyring::Error> {
        Entry::new(KEY_RING_SERVICE_NAME, &token_entry_name(user_id))
    }

    /// Stores the token of a user, replacing an earlier one.
    #[instrument(skip(self, token))]
    pub fn store(&self, user_id: UserId, token: &str) -> Result<(), CliError> {
        let entry = Self::entry(user_id).map_err(|e| {
            CliError::AuthError(format!("Failed to create an entry in the keyring: {}", e))
        })?;
        entry
            .set_password(token)
            .map_err(|e| CliError::AuthError(format!("Failed to save token to keyring: {}", e)))?;

        info!(user_id, "Stored GitHub token in the keyring");
        Ok(())
    }
}

#[async_trait]
impl TokenProvider for KeyringTokenStore {
    async fn resolve(&self, user_id: UserId) -> Result<AccessCredential, TokenLookupError> {
        debug!(user_id, "Reading GitHub token from the keyring");
        let token = Self::entry(user_id)
            .and_then(|entry| entry.get_password())
            .map_err(|e| lookup_error(user_id, e))?;

        Ok(AccessCredential::new(token))
    }
}
