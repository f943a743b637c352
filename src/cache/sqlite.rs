use super::*;
use const_format::concatcp;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::Path;
use std::sync::Mutex;

/// Cache table. One row per resolved identity key; rows never expire
/// because an account's canonical id never changes.
const TABLE: &str = "profile_cache";

const SCHEMA: &str = concatcp!(
    "CREATE TABLE IF NOT EXISTS ",
    TABLE,
    " (
        identity_key    TEXT NOT NULL PRIMARY KEY,
        steam_id        TEXT NOT NULL,
        resolved_at     TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"
);
const GET: &str = concatcp!(
    "SELECT steam_id FROM ",
    TABLE,
    " WHERE identity_key = ?1"
);
const PUT: &str = concatcp!(
    "INSERT INTO ",
    TABLE,
    " (identity_key, steam_id) VALUES (?1, ?2)
     ON CONFLICT (identity_key) DO UPDATE SET steam_id = excluded.steam_id"
);

/// SQLite-backed identity store.
///
/// One mutex-guarded connection is plenty: SQLite serializes writers
/// anyway and the traffic here is point lookups on a join hook.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the cache database and ensure the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute(SCHEMA, [])?;
        log::info!("identity cache open at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl IdentityStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<SteamId>, StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError(e.to_string()))?;
        let row = conn
            .query_row(GET, [key], |row| row.get::<_, String>(0))
            .optional()?;
        match row {
            None => Ok(None),
            Some(id) => id
                .parse::<SteamId>()
                .map(Some)
                .map_err(|_| StoreError(format!("corrupt steam id for key {}", key))),
        }
    }

    fn put(&self, key: &str, id: SteamId) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError(e.to_string()))?;
        conn.execute(PUT, rusqlite::params![key, id.to_string()])?;
        Ok(())
    }
}
