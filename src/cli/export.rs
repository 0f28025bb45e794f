//! Export command: merge the draft into the live document without publishing.

use std::path::PathBuf;

use clap::Args;

use crate::cli::common::{draft_store, load_config, CliError, CliResult};
use crate::models::ContentDocument;
use crate::services::live::fetch_live;
use crate::services::{apply, merge_for_publish, EditorEvent, EditorState};

/// Write the merged content.json without publishing
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (prints to stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// URL or path of the live content (defaults to site.live_content)
    #[arg(long, value_name = "LOCATION")]
    from: Option<String>,
}

/// Fetches the live document fresh, renumbers pending uploads past its
/// gallery, and merges the draft into it.
///
/// Returns the merged document and the renumbered draft.
pub async fn merged_document(
    from: Option<&str>,
    state: EditorState,
) -> CliResult<(ContentDocument, EditorState)> {
    let location = match from {
        Some(from) => from.to_string(),
        None => load_config()?.site.live_content,
    };
    let live = fetch_live(&location).await?;
    let srcs = live.gallery.items.iter().map(|it| it.src.clone()).collect();
    let state = apply(state, EditorEvent::LiveRefreshed(srcs));
    let merged = merge_for_publish(live, &state);
    Ok((merged, state))
}

impl ExportArgs {
    /// Execute export command
    pub async fn execute(&self) -> CliResult<()> {
        let state = draft_store()?.load()?;
        let (doc, _) = merged_document(self.from.as_deref(), state).await?;
        let json = doc
            .to_pretty_json()
            .map_err(|e| CliError::io(format!("Failed to serialize content: {e}")))?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, format!("{json}\n")).map_err(|e| {
                    CliError::io(format!("Failed to write {}: {e}", path.display()))
                })?;
                eprintln!("Wrote {}", path.display());
            }
            None => println!("{json}"),
        }

        Ok(())
    }
}
