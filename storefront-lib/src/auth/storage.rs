//! Key-value storage backing the credential store.

use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;

use super::CredentialStore;
use super::StoredSession;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the signed-in user's profile as JSON.
pub const USER_INFO_KEY: &str = "userInfo";

/// Backend trait for persisted string storage.
pub trait KeyValueStorage: Send + Sync {
    /// Reads a key.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a key.
    fn set(&self, key: &str, value: String);

    /// Deletes a key.
    fn remove(&self, key: &str);
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Credential store over the `token` and `userInfo` storage keys.
#[derive(Debug, Default)]
pub struct StorageCredentialStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> StorageCredentialStore<S> {
    /// Creates a store over the given storage.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: KeyValueStorage> CredentialStore for StorageCredentialStore<S> {
    fn get(&self) -> Option<StoredSession> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user_info = self.storage.get(USER_INFO_KEY).and_then(|raw| {
            serde_json::from_str(&raw)
                .inspect_err(|e| log::warn!("[auth] ignoring unreadable {}: {}", USER_INFO_KEY, e))
                .ok()
        });
        Some(StoredSession { token, user_info })
    }

    fn set(&self, session: StoredSession) {
        self.storage.set(TOKEN_KEY, session.token);
        match session.user_info {
            Some(info) => self.storage.set(USER_INFO_KEY, info.to_string()),
            None => self.storage.remove(USER_INFO_KEY),
        }
    }

    fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_INFO_KEY);
        log::info!("[auth] stored credentials cleared");
    }

    fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::MemoryCredentialStore;

    #[test]
    fn test_set_get_clear() {
        let store = MemoryCredentialStore::default();
        assert!(store.get().is_none());

        store.set(StoredSession::new("abc").with_user_info(json!({ "id": 7 })));
        assert_eq!(store.token().as_deref(), Some("abc"));
        assert_eq!(store.storage().get(USER_INFO_KEY).as_deref(), Some(r#"{"id":7}"#));
        assert_eq!(store.get().unwrap().user_info, Some(json!({ "id": 7 })));

        store.clear();
        assert!(store.get().is_none());
        assert!(store.storage().get(USER_INFO_KEY).is_none());
    }

    #[test]
    fn test_unreadable_user_info_is_ignored() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "abc".into());
        storage.set(USER_INFO_KEY, "{not json".into());

        let session = StorageCredentialStore::new(storage).get().unwrap();
        assert_eq!(session.token, "abc");
        assert!(session.user_info.is_none());
    }
}
