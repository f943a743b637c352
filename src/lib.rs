//! Steam group join gate.
//!
//! Answers a single question over HTTP: is this Steam identity
//! permitted to join? Raw identifiers are normalized, resolved to
//! canonical Steam IDs through a durable cache, and judged against a
//! group roster plus static allow/deny overrides. Anything the service
//! cannot vouch for is refused.
//!
//! ## Submodules
//!
//! - [`steam`] — identity normalization and community web scraping
//! - [`cache`] — durable identity key → canonical id store
//! - [`gate`] — membership decisions and roster snapshots
//! - [`service`] — HTTP adapter for the join-control hook
//! - [`config`] — operator configuration

pub mod cache;
pub mod config;
pub mod gate;
pub mod service;
pub mod steam;

pub use cache::ProfileCache;
pub use config::Config;
pub use gate::Gate;
pub use gate::Verdict;
pub use steam::IdentityKey;
pub use steam::SteamId;

// ============================================================================
// STEAM WEB PARAMETERS
// ============================================================================
/// User-Agent sent on every Steam request.
pub const USER_AGENT: &str = "joingate/0.1";
/// Hard cap on any single Steam request.
pub const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// Profile resolution attempts before reporting the remote unavailable.
pub const FETCH_ATTEMPTS: usize = 3;

// ============================================================================
// STEAM ID RANGE
// Public individual accounts occupy a 32-bit span above a fixed base.
// ============================================================================
/// First SteamID64 of universe-1 individual accounts.
pub const STEAM_ID_BASE: u64 = 76561197960265728;
/// Number of account ids above the base.
pub const STEAM_ID_SPAN: u64 = 1 << 32;

// ============================================================================
// SERVICE DEFAULTS
// Each of these yields to its counterpart in the config document.
// ============================================================================
/// Roster snapshot lifetime.
pub const ROSTER_TTL: std::time::Duration = std::time::Duration::from_secs(60);
/// Listen address. Loopback: the service trusts its transport.
pub const BIND_ADDR: &str = "127.0.0.1:8412";
/// Identity cache location.
pub const CACHE_FILE: &str = "profiles.sqlite";

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
