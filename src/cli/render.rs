//! Render command: write the public page HTML.

use std::path::PathBuf;

use clap::Args;

use crate::cli::common::{load_config, CliError, CliResult};
use crate::render::render_page;
use crate::services::live::fetch_live;

/// Render the public page from a content document
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// URL or path of the content document (defaults to site.live_content)
    #[arg(short, long, value_name = "LOCATION")]
    input: Option<String>,

    /// Output HTML file (prints to stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute render command
    pub async fn execute(&self) -> CliResult<()> {
        let location = match &self.input {
            Some(input) => input.clone(),
            None => load_config()?.site.live_content,
        };
        let doc = fetch_live(&location).await?;
        let html = render_page(&doc);

        match &self.output {
            Some(path) => {
                std::fs::write(path, html).map_err(|e| {
                    CliError::io(format!("Failed to write {}: {e}", path.display()))
                })?;
                eprintln!("Wrote {}", path.display());
            }
            None => print!("{html}"),
        }

        Ok(())
    }
}
