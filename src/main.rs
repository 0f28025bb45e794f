//! Lodge - operator CLI for the Lodge photography site
//!
//! Edits a local draft of the site content, merges it into the live document
//! and publishes it through the publish endpoint.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lodge::cli::{ConfigArgs, DraftArgs, ExportArgs, PublishArgs, RenderArgs};
use lodge::constants::APP_BINARY_NAME;

/// Lodge - edit and publish site content
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Edit the local draft
    Draft(DraftArgs),
    /// Write the merged content.json without publishing
    Export(ExportArgs),
    /// Publish the draft to the live site
    Publish(PublishArgs),
    /// Render the public page HTML
    Render(RenderArgs),
    /// Show or change settings
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Command::Draft(args) => args.execute().await,
        Command::Export(args) => args.execute().await,
        Command::Publish(args) => args.execute().await,
        Command::Render(args) => args.execute().await,
        Command::Config(args) => args.execute(),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code as i32);
    }
}
