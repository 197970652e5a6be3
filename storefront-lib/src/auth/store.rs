//! CredentialStore trait and StoredSession

use serde_json::Value;

use super::MemoryStorage;
use super::StorageCredentialStore;

/// Credentials persisted for the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    /// Bearer token attached to API requests.
    pub token: String,
    /// Profile of the signed-in user, as returned by the login call.
    pub user_info: Option<Value>,
}

impl StoredSession {
    /// Creates a session with just a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_info: None,
        }
    }

    /// Attaches the user's profile.
    pub fn with_user_info(mut self, user_info: Value) -> Self {
        self.user_info = Some(user_info);
        self
    }

    /// Returns the token as a bearer authorization header value.
    pub fn as_bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Single-writer store for the signed-in user's credentials.
///
/// The transport reads the token before each request. Only the login flow
/// sets it and only the session-expired dispatch path clears it; a request
/// that already captured the token keeps using it.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored session, if any.
    fn get(&self) -> Option<StoredSession>;

    /// Stores a new session, replacing the previous one.
    fn set(&self, session: StoredSession);

    /// Removes the stored session.
    fn clear(&self);

    /// Returns the stored token, if any.
    fn token(&self) -> Option<String> {
        self.get().map(|session| session.token)
    }
}

/// In-memory credential store.
pub type MemoryCredentialStore = StorageCredentialStore<MemoryStorage>;
