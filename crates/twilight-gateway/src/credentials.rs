//! Credential providers.
//!
//! The gateway asks its provider for a token every time a transport opens,
//! so a token updated between sessions is picked up on the next reconnect.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

/// Supplies the auth token sent in the identify frame.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// The current auth token, if one is available.
    async fn token(&self) -> Option<String>;
}

/// A fixed token.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// Provider that always returns `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Provider that never has a token.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A shared, updatable in-memory token.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenCell {
    /// An empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored token.
    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write() = Some(token.into());
    }

    /// Remove the stored token.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    /// Current token.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }
}

#[async_trait]
impl CredentialProvider for TokenCell {
    async fn token(&self) -> Option<String> {
        self.get()
    }
}
