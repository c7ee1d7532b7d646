//! Lookup of the access credentials stored for users.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use vc_data_fetcher_developer_platforms::models::AccessCredential;

use crate::errors::TokenLookupError;

#[cfg(test)]
#[path = "tokens_tests.rs"]
mod tests;

/// Identity of a user of the analysis service.
pub type UserId = u64;

/// Resolves a user to the platform credential stored for them.
///
/// A user has at most one live credential. An identity without a credential
/// resolves to [`TokenLookupError::NotFound`], which callers treat as an
/// unauthenticated user rather than as a failure.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn resolve(&self, user_id: UserId) -> Result<AccessCredential, TokenLookupError>;
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    async fn resolve(&self, user_id: UserId) -> Result<AccessCredential, TokenLookupError> {
        (**self).resolve(user_id).await
    }
}

/// A process local credential store.
///
/// Storing a credential for a user replaces the previous one, matching the
/// behavior of the OAuth exchange that produces these tokens.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<UserId, AccessCredential>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a credential is stored for the user.
    pub async fn has_token(&self, user_id: UserId) -> bool {
        self.tokens.read().await.contains_key(&user_id)
    }

    /// Removes the credential of a user. Returns whether one was stored.
    pub async fn remove(&self, user_id: UserId) -> bool {
        self.tokens.write().await.remove(&user_id).is_some()
    }

    /// Stores the credential of a user, replacing any earlier one.
    ///
    /// Returns `true` when an earlier credential was replaced.
    #[instrument(skip(self, credential))]
    pub async fn store(&self, user_id: UserId, credential: AccessCredential) -> bool {
        let replaced = self
            .tokens
            .write()
            .await
            .insert(user_id, credential)
            .is_some();
        info!(user_id, replaced, "Stored access token");
        replaced
    }
}

#[async_trait]
impl TokenProvider for InMemoryTokenStore {
    async fn resolve(&self, user_id: UserId) -> Result<AccessCredential, TokenLookupError> {
        debug!(user_id, "Fetching access token");
        self.tokens
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(TokenLookupError::NotFound(user_id))
    }
}
