use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session-change events delivered to auth-state subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    /// A session was established for this user
    SignedIn { user_id: Uuid },

    /// The session ended
    SignedOut,

    /// The signed-in user's profile changed server-side
    UserUpdated { user_id: Uuid },
}

impl AuthEvent {
    /// Returns the user whose profile should be (re)loaded, if any.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::SignedIn { user_id } | Self::UserUpdated { user_id } => Some(*user_id),
            Self::SignedOut => None,
        }
    }
}
