//! Lodge Web Server Binary
//!
//! Starts the publish endpoint. Secrets and repository coordinates come from
//! the environment (`ADMIN_PIN`, `GITHUB_TOKEN`, `GITHUB_OWNER`, `GITHUB_REPO`,
//! `GITHUB_BRANCH`, `GITHUB_API_URL`).
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (127.0.0.1:3000)
//! lodge-web
//!
//! # Listen on all interfaces
//! lodge-web --host 0.0.0.0 --port 8080
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lodge::config::ServerConfig;
use lodge::web;

/// Lodge Web Server - publish endpoint for site content
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(
        "Publishing to branch {} via {}",
        config.github.branch, config.github.api_url
    );

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    web::run_server(config, addr).await
}
