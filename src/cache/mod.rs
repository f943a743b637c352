//! Durable identity cache: key → canonical Steam ID.

mod sqlite;
mod store;

pub use sqlite::SqliteStore;
pub use store::IdentityStore;
pub use store::MemoryStore;
pub use store::StoreError;

use crate::steam::IdentityKey;
use crate::steam::Profile;
use crate::steam::SteamId;

/// Remote end of the cache: turns a vanity name into profile identity.
#[async_trait::async_trait]
pub trait ResolveSource: Send + Sync {
    async fn fetch(&self, vanity: &str) -> Result<Profile, ResolutionError>;
}

/// Errors from resolving an identity key to a canonical id.
#[derive(Debug, Clone)]
pub enum ResolutionError {
    /// Steam could not be reached or never yielded a usable page.
    RemoteUnavailable(String),
    /// Steam confirmed the identity does not exist.
    NotFound(String),
    /// The mapping could not be read from or written to the store.
    Storage(String),
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoteUnavailable(why) => write!(f, "steam unavailable: {}", why),
            Self::NotFound(why) => write!(f, "identity not found: {}", why),
            Self::Storage(why) => write!(f, "cache storage failed: {}", why),
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Identity cache: durable key → id mappings in front of the resolver.
///
/// `lookup` never fetches. `resolve` fetches on miss and persists the
/// answer before returning it, so a mapping is paid for at most once
/// across process restarts. Keys that already carry the canonical id
/// skip both the store and the network.
pub struct ProfileCache {
    store: Box<dyn IdentityStore>,
    source: Box<dyn ResolveSource>,
}

impl ProfileCache {
    pub fn new(store: Box<dyn IdentityStore>, source: Box<dyn ResolveSource>) -> Self {
        Self { store, source }
    }

    /// The cached id for a key, if the store already holds one.
    pub fn lookup(&self, key: &IdentityKey) -> Option<SteamId> {
        match key {
            IdentityKey::Id(id) => Some(*id),
            IdentityKey::Vanity(name) => self
                .store
                .get(name)
                .inspect_err(|e| log::error!("cache lookup {}: {}", name, e))
                .ok()
                .flatten(),
        }
    }

    /// Resolve a key to its canonical id, fetching and persisting on
    /// miss. The store write lands before the id is handed back.
    pub async fn resolve(&self, key: &IdentityKey) -> Result<SteamId, ResolutionError> {
        match key {
            IdentityKey::Id(id) => Ok(*id),
            IdentityKey::Vanity(name) => match self.store.get(name) {
                Err(e) => Err(ResolutionError::Storage(e.to_string())),
                Ok(Some(id)) => Ok(id),
                Ok(None) => {
                    let profile = self.source.fetch(name).await?;
                    self.store
                        .put(name, profile.id)
                        .map_err(|e| ResolutionError::Storage(e.to_string()))?;
                    log::info!("resolved {} to {} ({})", name, profile.id, profile.name);
                    Ok(profile.id)
                }
            },
        }
    }

    /// Liveness of the backing store.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.store.ping()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    struct FakeSource {
        id: SteamId,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ResolveSource for FakeSource {
        async fn fetch(&self, vanity: &str) -> Result<Profile, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Profile {
                url: format!("https://steamcommunity.com/id/{}/", vanity),
                name: vanity.to_string(),
                id: self.id,
            })
        }
    }

    struct DownSource;

    #[async_trait::async_trait]
    impl ResolveSource for DownSource {
        async fn fetch(&self, _: &str) -> Result<Profile, ResolutionError> {
            Err(ResolutionError::RemoteUnavailable("down".to_string()))
        }
    }

    fn id(n: u64) -> SteamId {
        SteamId::try_from(crate::STEAM_ID_BASE + n).unwrap()
    }

    fn caching(source: FakeSource) -> ProfileCache {
        ProfileCache::new(Box::new(MemoryStore::default()), Box::new(source))
    }

    #[tokio::test]
    async fn resolve_fetches_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = caching(FakeSource {
            id: id(42),
            calls: calls.clone(),
        });
        let key = IdentityKey::try_from("https://steamcommunity.com/id/examplevanity").unwrap();
        assert!(cache.resolve(&key).await.unwrap() == id(42));
        assert!(cache.resolve(&key).await.unwrap() == id(42));
        assert!(calls.load(Ordering::SeqCst) == 1);
    }

    #[tokio::test]
    async fn url_and_bare_vanity_share_one_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = caching(FakeSource {
            id: id(42),
            calls: calls.clone(),
        });
        let url = IdentityKey::try_from("https://steamcommunity.com/id/examplevanity").unwrap();
        let bare = IdentityKey::try_from("examplevanity").unwrap();
        assert!(cache.resolve(&url).await.unwrap() == id(42));
        assert!(cache.resolve(&bare).await.unwrap() == id(42));
        assert!(calls.load(Ordering::SeqCst) == 1);
    }

    #[tokio::test]
    async fn numeric_key_skips_store_and_network() {
        let cache = ProfileCache::new(Box::new(MemoryStore::default()), Box::new(DownSource));
        let key = IdentityKey::try_from("76561198023716890").unwrap();
        assert!(cache.resolve(&key).await.unwrap() == "76561198023716890".parse().unwrap());
        assert!(cache.lookup(&key) == Some("76561198023716890".parse().unwrap()));
    }

    #[tokio::test]
    async fn miss_with_remote_down_fails() {
        let cache = ProfileCache::new(Box::new(MemoryStore::default()), Box::new(DownSource));
        let key = IdentityKey::try_from("examplevanity").unwrap();
        assert!(matches!(
            cache.resolve(&key).await,
            Err(ResolutionError::RemoteUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn lookup_never_fetches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = caching(FakeSource {
            id: id(42),
            calls: calls.clone(),
        });
        let key = IdentityKey::try_from("examplevanity").unwrap();
        assert!(cache.lookup(&key) == None);
        assert!(calls.load(Ordering::SeqCst) == 0);
    }

    #[tokio::test]
    async fn resolve_persists_for_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = caching(FakeSource {
            id: id(42),
            calls: calls.clone(),
        });
        let key = IdentityKey::try_from("examplevanity").unwrap();
        cache.resolve(&key).await.unwrap();
        assert!(cache.lookup(&key) == Some(id(42)));
    }
}
