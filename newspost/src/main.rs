/*
newspost - main.rs
Loads configuration, builds the news and completion clients, and serves the
form plus its JSON/WebSocket API with Rocket.
*/

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newspost::bootstrap::{build_orchestrator, load_config};
use newspost::server::launch_rocket;

#[derive(Parser, Debug)]
#[command(name = "newspost", about = "News-grounded social media content generator")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Credentials may live in a local .env file
    let _ = dotenv::dotenv();

    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = load_config(args.config).await?;

    // Missing credentials stop the process here, before anything is served.
    let orchestrator = match build_orchestrator(&config) {
        Ok(o) => Arc::new(o),
        Err(e) => {
            error!(%e, "failed to initialize services");
            return Err(e).context("configuration error");
        }
    };
    info!(platforms = orchestrator.catalog().len(), "orchestrator ready");

    launch_rocket(Arc::new(config), orchestrator).await?;

    info!("Shutdown complete");
    Ok(())
}
