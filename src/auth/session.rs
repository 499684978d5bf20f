use serde::{Serialize, Deserialize};

use crate::datetime::Timestamp;


/// Stable user identifier, used as a prefix of storage keys.
pub type UserId = uuid::Uuid;


/// Registered user. Never carries credentials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Login email
    pub email: String,

    /// Registration time
    pub created_at: Timestamp,
}


/// Logged-in user context.
///
/// Created at login and destroyed at logout. Everything that
/// reads or writes user's records receives it explicitly.
#[derive(Debug)]
pub struct Session {
    user: User,
}


impl Session {
    /// Opens a session for an already authenticated user.
    ///
    /// * `user` - authenticated user
    pub fn new(user: User) -> Self {
        tracing::info!(user = %user.id, "session started");
        Session { user: user }
    }

    /// User, that owns the session.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Storage key prefix of the user.
    pub fn key_prefix(&self) -> String {
        self.user
            .id
            .hyphenated()
            .to_string()
    }

    /// Ends the session.
    pub fn logout(self) {
        tracing::info!(user = %self.user.id, "session ended");
    }
}
