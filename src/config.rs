use crate::steam::SteamId;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

/// Operator configuration.
///
/// Loaded once at startup; edits take effect on restart. The allow and
/// deny objects map an operator-facing name to a Steam ID string; only
/// the ids participate in decisions, the names are for the humans
/// maintaining the file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Group URL or bare group id; the gate admits its members.
    pub group_url: String,
    /// Listen address. Keep it loopback unless the transport in front
    /// of it is trusted; the service authenticates nobody.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Identity cache database path.
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    /// Roster snapshot lifetime in seconds.
    #[serde(default = "default_roster_ttl")]
    pub roster_ttl_secs: u64,
    /// Admitted regardless of the roster (unless also denied).
    #[serde(default)]
    pub allowed: HashMap<String, String>,
    /// Never admitted, whatever the other sources say.
    #[serde(default)]
    pub denied: HashMap<String, String>,
}

fn default_bind() -> String {
    crate::BIND_ADDR.to_string()
}

fn default_cache_file() -> PathBuf {
    PathBuf::from(crate::CACHE_FILE)
}

fn default_roster_ttl() -> u64 {
    crate::ROSTER_TTL.as_secs()
}

impl Config {
    /// Read and parse the config document. Unreadable config is fatal;
    /// the service never starts half-configured.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = serde_json::from_str::<Self>(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        anyhow::ensure!(!config.group().is_empty(), "group_url names no group");
        Ok(config)
    }

    /// Group id: the last path segment of `group_url`, or the value
    /// itself when it is already a bare id.
    pub fn group(&self) -> &str {
        self.group_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(self.group_url.as_str())
    }

    /// Parse the allow and deny objects into id sets.
    pub fn lists(&self) -> anyhow::Result<(HashSet<SteamId>, HashSet<SteamId>)> {
        Ok((Self::list(&self.allowed)?, Self::list(&self.denied)?))
    }

    fn list(entries: &HashMap<String, String>) -> anyhow::Result<HashSet<SteamId>> {
        entries
            .iter()
            .map(|(name, id)| {
                id.parse::<SteamId>()
                    .map_err(|_| anyhow::anyhow!("bad steam id for {}: {}", name, id))
            })
            .collect()
    }
}
