use super::*;
use std::collections::HashMap;
use std::sync::Mutex;

/// Durable identity key → canonical id store.
///
/// Lookups are synchronous and never reach the network. A mapping is
/// visible to every later lookup once `put` returns; re-putting a key
/// overwrites, which is harmless because keys never remap to a
/// different account.
pub trait IdentityStore: Send + Sync {
    /// The id previously stored under this key, if any.
    fn get(&self, key: &str) -> Result<Option<SteamId>, StoreError>;
    /// Persist a resolved mapping.
    fn put(&self, key: &str, id: SteamId) -> Result<(), StoreError>;
    /// Cheap liveness check against the backing store.
    fn ping(&self) -> Result<(), StoreError> {
        self.get("").map(|_| ())
    }
}

/// Storage-layer failure, carrying the backend's message.
#[derive(Debug, Clone)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self(e.to_string())
    }
}

/// In-memory store for tests and cache-less runs.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, SteamId>>,
}

impl IdentityStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<SteamId>, StoreError> {
        self.map
            .lock()
            .map_err(|e| StoreError(e.to_string()))
            .map(|map| map.get(key).copied())
    }

    fn put(&self, key: &str, id: SteamId) -> Result<(), StoreError> {
        self.map
            .lock()
            .map_err(|e| StoreError(e.to_string()))
            .map(|mut map| map.insert(key.to_string(), id))
            .map(|_| ())
    }
}
