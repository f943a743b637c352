use super::*;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

/// Remote end of the gate: the full member set of a Steam group.
#[async_trait::async_trait]
pub trait RosterSource: Send + Sync {
    /// The complete member list, or failure. Never partial.
    async fn fetch(&self, group: &str) -> Result<HashSet<SteamId>, RosterError>;
}

/// Errors from fetching a group member list.
#[derive(Debug, Clone)]
pub enum RosterError {
    /// The roster could not be fetched in full.
    Unavailable(String),
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(why) => write!(f, "roster unavailable: {}", why),
        }
    }
}

impl std::error::Error for RosterError {}

/// One complete fetch of the member list.
struct Snapshot {
    members: Arc<HashSet<SteamId>>,
    taken: Instant,
}

/// TTL snapshot cache over a roster source.
///
/// Holds the member set for a short window so a join storm costs one
/// upstream fetch instead of one per player. The lock is held across
/// the refresh, which serializes concurrent refreshers behind a single
/// fetch. An aged-out snapshot is never served: when the refresh fails
/// the failure is the answer.
pub struct CachedRoster {
    source: Box<dyn RosterSource>,
    group: String,
    ttl: Duration,
    snapshot: tokio::sync::Mutex<Option<Snapshot>>,
}

impl CachedRoster {
    pub fn new(source: Box<dyn RosterSource>, group: &str, ttl: Duration) -> Self {
        Self {
            source,
            group: group.to_string(),
            ttl,
            snapshot: tokio::sync::Mutex::new(None),
        }
    }

    /// Current member set, refreshed through the source when the held
    /// snapshot has aged out.
    pub async fn members(&self) -> Result<Arc<HashSet<SteamId>>, RosterError> {
        let mut slot = self.snapshot.lock().await;
        if let Some(held) = slot.as_ref() {
            if held.taken.elapsed() < self.ttl {
                return Ok(held.members.clone());
            }
        }
        let members = Arc::new(self.source.fetch(&self.group).await?);
        log::info!("group {} roster: {} members", self.group, members.len());
        *slot = Some(Snapshot {
            members: members.clone(),
            taken: Instant::now(),
        });
        Ok(members)
    }
}
