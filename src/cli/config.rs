//! Configuration management CLI commands.

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::config::Config;
use clap::{Args, Subcommand};
use serde::Serialize;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// URL or file path of the live content.json
    #[arg(long, value_name = "LOCATION")]
    live_content: Option<String>,

    /// Publish endpoint URL
    #[arg(long, value_name = "URL")]
    publish_url: Option<String>,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput<'a> {
    config_file: String,
    site: &'a crate::config::SiteConfig,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;
        let config_file = Config::config_file_path()?.display().to_string();

        if self.json {
            print_json(&ConfigOutput {
                config_file,
                site: &config.site,
            })
        } else {
            println!("Config file:  {config_file}");
            println!("Live content: {}", config.site.live_content);
            println!("Publish URL:  {}", config.site.publish_url);
            Ok(())
        }
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.live_content.is_none() && self.publish_url.is_none() {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --live-content or --publish-url",
            ));
        }

        let mut config = Config::load().unwrap_or_default();

        if let Some(live) = &self.live_content {
            config.site.live_content = live.trim().to_string();
        }
        if let Some(url) = &self.publish_url {
            config.site.publish_url = url.trim().to_string();
        }

        config
            .validate()
            .map_err(|e| CliError::validation(e.to_string()))?;
        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}
