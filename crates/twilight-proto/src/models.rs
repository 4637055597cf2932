//! Profile models returned by the account API.

use serde::{Deserialize, Serialize};

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor ID.
    pub id: String,
    /// Home server, `None` for local actors.
    #[serde(default)]
    pub server_id: Option<String>,
    /// Unique handle.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Banner URL.
    #[serde(default)]
    pub banner_url: Option<String>,
    /// Bio.
    #[serde(default)]
    pub bio: Option<String>,
}

impl Actor {
    /// Display name if set, otherwise the username.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Private account record backing an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: String,
    /// The actor this account owns.
    pub actor_id: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Account flag bits.
    #[serde(default)]
    pub flags: Option<i64>,
}
