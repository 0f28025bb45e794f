//! Publish command: merge, encode uploads and post to the publish endpoint.

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::cli::common::{draft_store, load_config, CliError, CliResult};
use crate::cli::export::merged_document;
use crate::constants::USER_AGENT;
use crate::models::DraftImage;
use crate::services::{apply, EditorEvent, EditorState};

/// Publish the draft to the live site
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Operator PIN
    #[arg(long, env = "LODGE_PIN", hide_env_values = true)]
    pin: String,

    /// Publish endpoint (defaults to site.publish_url)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// URL or path of the live content (defaults to site.live_content)
    #[arg(long, value_name = "LOCATION")]
    from: Option<String>,
}

#[derive(Serialize, Debug)]
struct PublishRequest<'a> {
    pin: &'a str,
    content: Value,
    images: Vec<DraftImage>,
}

#[derive(Deserialize, Debug)]
struct PublishReply {
    #[serde(default)]
    ok: bool,
    commit: Option<String>,
    error: Option<String>,
    detail: Option<String>,
}

/// Reads every pending upload and encodes it for the wire.
pub fn encode_uploads(state: &EditorState) -> anyhow::Result<Vec<DraftImage>> {
    state
        .uploads()
        .into_iter()
        .map(|job| {
            let bytes = std::fs::read(job.path)
                .with_context(|| format!("Failed to read image: {}", job.path.display()))?;
            Ok(DraftImage {
                name: job.name.to_string(),
                b64: BASE64.encode(bytes),
                alt: Some(job.alt.to_string()),
            })
        })
        .collect()
}

impl PublishArgs {
    /// Execute publish command
    pub async fn execute(&self) -> CliResult<()> {
        let pin = self.pin.trim();
        if pin.is_empty() {
            return Err(CliError::validation("Enter Admin PIN"));
        }

        let url = match &self.url {
            Some(url) => url.clone(),
            None => load_config()?.site.publish_url,
        };

        let store = draft_store()?;
        let state = store.load()?;
        let (content, state) = merged_document(self.from.as_deref(), state).await?;
        let images = encode_uploads(&state)?;
        info!("Publishing {} image(s) to {}", images.len(), url);

        let request = PublishRequest {
            pin,
            content: content
                .to_value()
                .map_err(|e| CliError::io(format!("Failed to serialize content: {e}")))?,
            images,
        };

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError::io(format!("Failed to build HTTP client: {e}")))?;
        let resp = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CliError::io(format!("Failed to reach {url}: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| CliError::io(format!("Failed to read response from {url}: {e}")))?;
        debug!("publish response {}: {}", status, text);

        let reply: PublishReply = serde_json::from_str(&text).map_err(|_| {
            CliError::io(format!("Unexpected response from {url} (HTTP {status}): {text}"))
        })?;

        match reply {
            PublishReply {
                ok: true,
                commit: Some(commit),
                ..
            } => {
                store.save(&apply(state, EditorEvent::Published))?;
                println!("Published commit {commit}");
                Ok(())
            }
            PublishReply { error, detail, .. } => {
                let mut message = error.unwrap_or_else(|| format!("Publish failed (HTTP {status})"));
                if let Some(detail) = detail {
                    message = format!("{message}: {detail}");
                }
                if status.is_client_error() {
                    Err(CliError::validation(message))
                } else {
                    Err(CliError::io(message))
                }
            }
        }
    }
}
