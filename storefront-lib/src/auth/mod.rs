//! Stored credentials

mod storage;
mod store;

pub use storage::KeyValueStorage;
pub use storage::MemoryStorage;
pub use storage::StorageCredentialStore;
pub use storage::TOKEN_KEY;
pub use storage::USER_INFO_KEY;
pub use store::CredentialStore;
pub use store::MemoryCredentialStore;
pub use store::StoredSession;
