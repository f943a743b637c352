//! Join Gate Binary
//!
//! Serves the join-control hook for one Steam group. Point it at a
//! config document and put nothing between it and the game server.

use clap::Parser;

/// Steam group join gate.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the config document.
    #[arg(long, default_value = "config.json")]
    config: std::path::PathBuf,
    /// Listen address override.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    joingate::log();
    let args = Args::parse();
    let mut config = joingate::Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    joingate::service::run(config).await
}
