//! In-memory store for the signed-in user's profile.

use std::sync::Arc;

use parking_lot::RwLock;
use twilight_proto::{Account, Actor};

#[derive(Debug, Default)]
struct UserState {
    actor: Option<Actor>,
    account: Option<Account>,
}

/// Shared handle to the current actor and account.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    inner: Arc<RwLock<UserState>>,
}

impl UserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current actor, if any.
    #[must_use]
    pub fn actor(&self) -> Option<Actor> {
        self.inner.read().actor.clone()
    }

    /// Current account, if any.
    #[must_use]
    pub fn account(&self) -> Option<Account> {
        self.inner.read().account.clone()
    }

    /// Replace the actor.
    pub fn set_actor(&self, actor: Option<Actor>) {
        self.inner.write().actor = actor;
    }

    /// Replace the account.
    pub fn set_account(&self, account: Option<Account>) {
        self.inner.write().account = account;
    }

    /// Forget both.
    pub fn clear(&self) {
        let mut state = self.inner.write();
        state.actor = None;
        state.account = None;
    }

    /// Whether an account is loaded.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.inner.read().account.is_some()
    }
}
