//! Publish pipeline.
//!
//! A publish request carries the merged content document and any new
//! images. It is checked in a fixed order (PIN secret configured, PIN
//! matches, content present, images well formed, repository configured)
//! before a single upstream call is made, and then committed with the
//! [`pipeline`] state machine.
//!
//! ## Error taxonomy
//!
//! | Error | Status |
//! |---|---|
//! | [`PublishError::MethodNotAllowed`] | 405 |
//! | [`PublishError::BadPin`] | 401 |
//! | missing content, bad image | 400 |
//! | missing server configuration | 500 |
//! | [`PublishError::Upstream`] | 500 |

pub mod pipeline;

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{RepoTarget, ServerConfig};
use crate::github::UpstreamError;
use crate::services::naming;

pub use pipeline::{PublishState, Publisher};

/// One step of the upstream protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishStep {
    /// Read the branch ref.
    ReadRef,
    /// Read the tip commit.
    ReadCommit,
    /// Create the content document blob.
    CreateContentBlob,
    /// Create one image blob.
    CreateImageBlob,
    /// Create the new tree.
    CreateTree,
    /// Create the new commit.
    CreateCommit,
    /// Move the branch ref.
    UpdateRef,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadRef => write!(f, "Failed to read branch ref"),
            Self::ReadCommit => write!(f, "Failed to read commit"),
            Self::CreateContentBlob => write!(f, "Failed to create blob"),
            Self::CreateImageBlob => write!(f, "Failed to create image blob"),
            Self::CreateTree => write!(f, "Failed to create tree"),
            Self::CreateCommit => write!(f, "Failed to create commit"),
            Self::UpdateRef => write!(f, "Failed to update branch ref"),
        }
    }
}

/// Why a publish was rejected or failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The request did not use POST.
    #[error("Method not allowed")]
    MethodNotAllowed,
    /// The request body could not be read, usually because it is too large.
    #[error("Invalid request body")]
    UnreadableBody {
        /// Why the body was rejected.
        reason: String,
    },
    /// `ADMIN_PIN` is not configured.
    #[error("Server missing ADMIN_PIN")]
    MissingPinSecret,
    /// The PIN was absent, empty or wrong.
    #[error("Bad PIN")]
    BadPin,
    /// `content` was absent or not an object.
    #[error("Missing content payload")]
    MissingContent,
    /// An image entry was malformed or its name sanitized to nothing.
    #[error("Invalid image name")]
    InvalidImageName {
        /// Position in the `images` array.
        index: usize,
    },
    /// An image payload was not valid base64.
    #[error("Invalid image payload")]
    InvalidImagePayload {
        /// Sanitized image name.
        name: String,
    },
    /// Token, owner or repository is not configured.
    #[error("Server missing GitHub env vars")]
    MissingRepoConfig,
    /// An upstream call failed.
    #[error("{step}")]
    Upstream {
        /// The step that failed.
        step: PublishStep,
        /// The upstream failure.
        source: UpstreamError,
    },
}

impl PublishError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed => 405,
            Self::BadPin => 401,
            Self::UnreadableBody { .. }
            | Self::MissingContent
            | Self::InvalidImageName { .. }
            | Self::InvalidImagePayload { .. } => 400,
            Self::MissingPinSecret | Self::MissingRepoConfig | Self::Upstream { .. } => 500,
        }
    }

    /// Diagnostic detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Upstream { source, .. } => Some(source.detail().to_string()),
            Self::InvalidImageName { index } => Some(format!("images[{index}]")),
            Self::InvalidImagePayload { name } => Some(name.clone()),
            Self::UnreadableBody { reason } => Some(reason.clone()),
            _ => None,
        }
    }

    /// Returns the failed step for upstream errors.
    #[must_use]
    pub fn step(&self) -> Option<PublishStep> {
        match self {
            Self::Upstream { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub(crate) fn upstream(step: PublishStep) -> impl FnOnce(UpstreamError) -> Self {
        move |source| Self::Upstream { step, source }
    }
}

/// Raw publish request body.
///
/// Fields are kept as JSON values so each check can report its own error
/// instead of failing the whole body at once.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PublishPayload {
    /// Operator PIN (string or number).
    #[serde(default)]
    pub pin: Option<Value>,
    /// The merged content document.
    #[serde(default)]
    pub content: Option<Value>,
    /// New images: `[{name, b64, alt?}]`.
    #[serde(default)]
    pub images: Option<Value>,
}

impl PublishPayload {
    /// Parses a request body. Anything that is not a JSON object yields an
    /// empty payload.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// An image ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    /// Repository path.
    pub path: String,
    /// Base64 payload without prefix.
    pub b64: String,
}

/// Everything the pipeline needs, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    /// Pretty-printed content document.
    pub content_json: String,
    /// Images in request order, one per repository path.
    pub images: Vec<ImageBlob>,
    /// Commit message.
    pub message: String,
}

/// Coerces a PIN value to text. Null, booleans, zero, empty and non-scalar
/// values yield `None`.
fn pin_text(pin: Option<&Value>) -> Option<String> {
    let text = match pin? {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Strips an optional `data:*;base64,` prefix and checks the payload decodes.
fn clean_base64(raw: &str) -> Option<String> {
    let payload = match raw.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => raw,
    };
    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if payload.is_empty() {
        return None;
    }
    BASE64.decode(payload.as_bytes()).ok()?;
    Some(payload)
}

fn parse_images(images: Option<&Value>) -> Result<Vec<ImageBlob>, PublishError> {
    let entries = match images {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(PublishError::InvalidImageName { index: 0 }),
    };

    let mut blobs: Vec<ImageBlob> = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .map(naming::sanitize_filename)
            .filter(|n| !n.is_empty() && n.chars().any(|c| c != '.'))
            .ok_or(PublishError::InvalidImageName { index })?;

        let b64 = entry
            .get("b64")
            .and_then(Value::as_str)
            .and_then(clean_base64)
            .ok_or_else(|| PublishError::InvalidImagePayload { name: name.clone() })?;

        let path = naming::upload_path(&name);
        match blobs.iter_mut().find(|b| b.path == path) {
            Some(existing) => existing.b64 = b64,
            None => blobs.push(ImageBlob { path, b64 }),
        }
    }

    Ok(blobs)
}

/// Commit message for a publish at `now`.
#[must_use]
pub fn commit_message(image_count: usize, now: DateTime<Utc>) -> String {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    match image_count {
        0 => format!("publish: update content.json ({stamp})"),
        1 => format!("publish: update content.json + 1 image ({stamp})"),
        n => format!("publish: update content.json + {n} images ({stamp})"),
    }
}

/// Runs every pre-network check in order and builds the plan.
pub fn prepare(
    payload: &PublishPayload,
    config: &ServerConfig,
    now: DateTime<Utc>,
) -> Result<(PublishPlan, RepoTarget), PublishError> {
    let secret = config
        .admin_pin
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(PublishError::MissingPinSecret)?;

    match pin_text(payload.pin.as_ref()) {
        Some(pin) if pin == secret => {}
        _ => return Err(PublishError::BadPin),
    }

    let content: &Map<String, Value> = payload
        .content
        .as_ref()
        .and_then(Value::as_object)
        .ok_or(PublishError::MissingContent)?;

    let images = parse_images(payload.images.as_ref())?;

    let target = config.github.target().ok_or(PublishError::MissingRepoConfig)?;

    let content_json =
        serde_json::to_string_pretty(content).map_err(|_| PublishError::MissingContent)?;

    Ok((
        PublishPlan {
            message: commit_message(images.len(), now),
            content_json,
            images,
        },
        target,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitHubSettings;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn full_config() -> ServerConfig {
        ServerConfig {
            admin_pin: Some("1234".to_string()),
            github: GitHubSettings {
                token: Some("tok".to_string()),
                owner: Some("lodge".to_string()),
                repo: Some("site".to_string()),
                ..GitHubSettings::default()
            },
        }
    }

    fn payload(value: Value) -> PublishPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_secret_checked_first() {
        let config = ServerConfig::default();
        let err = prepare(&PublishPayload::default(), &config, now()).unwrap_err();
        assert_eq!(err, PublishError::MissingPinSecret);
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_pin_must_match_exactly() {
        let config = full_config();
        for pin in [json!("wrong"), json!(""), json!(null), json!("1234 "), json!(["1234"])] {
            let err = prepare(&payload(json!({ "pin": pin, "content": {} })), &config, now())
                .unwrap_err();
            assert_eq!(err, PublishError::BadPin);
            assert_eq!(err.status_code(), 401);
        }

        let err = prepare(&payload(json!({ "content": {} })), &config, now()).unwrap_err();
        assert_eq!(err, PublishError::BadPin);
    }

    #[test]
    fn test_numeric_pin_is_coerced() {
        let (plan, _) = prepare(&payload(json!({ "pin": 1234, "content": {} })), &full_config(), now())
            .unwrap();
        assert_eq!(plan.content_json, "{}");
    }

    #[test]
    fn test_falsy_pins_never_match() {
        for (secret, pin) in [("0", json!(0)), ("0", json!(0.0)), ("false", json!(false)), ("true", json!(true))] {
            let config = ServerConfig {
                admin_pin: Some(secret.to_string()),
                ..full_config()
            };
            let err = prepare(&payload(json!({ "pin": pin, "content": {} })), &config, now())
                .unwrap_err();
            assert_eq!(err, PublishError::BadPin, "{pin}");
        }
    }

    #[test]
    fn test_unreadable_body_is_bad_request() {
        let err = PublishError::UnreadableBody {
            reason: "length limit exceeded".to_string(),
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Invalid request body");
        assert_eq!(err.detail().as_deref(), Some("length limit exceeded"));
    }

    #[test]
    fn test_content_must_be_object() {
        let config = full_config();
        for content in [json!(null), json!("text"), json!([1, 2])] {
            let err = prepare(&payload(json!({ "pin": "1234", "content": content })), &config, now())
                .unwrap_err();
            assert_eq!(err, PublishError::MissingContent);
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn test_repo_config_checked_after_content() {
        let config = ServerConfig {
            admin_pin: Some("1234".to_string()),
            ..ServerConfig::default()
        };
        let err = prepare(&payload(json!({ "pin": "1234" })), &config, now()).unwrap_err();
        assert_eq!(err, PublishError::MissingContent);

        let err = prepare(&payload(json!({ "pin": "1234", "content": {} })), &config, now())
            .unwrap_err();
        assert_eq!(err, PublishError::MissingRepoConfig);
        assert_eq!(err.to_string(), "Server missing GitHub env vars");
    }

    #[test]
    fn test_plan_contents() {
        let body = json!({
            "pin": "1234",
            "content": { "brand": { "name": "LODGE" } },
            "images": [
                { "name": "hero_bg.webp", "b64": "AAAA", "alt": "Hero background" },
                { "name": "pic 11.jpg", "b64": "data:image/jpeg;base64,QUJD" }
            ]
        });
        let (plan, target) = prepare(&payload(body), &full_config(), now()).unwrap();

        assert_eq!(plan.content_json, "{\n  \"brand\": {\n    \"name\": \"LODGE\"\n  }\n}");
        assert_eq!(
            plan.images,
            vec![
                ImageBlob { path: "assets/background/hero_bg.webp".to_string(), b64: "AAAA".to_string() },
                ImageBlob { path: "assets/gallery/pic11.jpg".to_string(), b64: "QUJD".to_string() },
            ]
        );
        assert_eq!(
            plan.message,
            "publish: update content.json + 2 images (2026-03-14T09:30:00.000Z)"
        );
        assert_eq!(target.branch, "main");
    }

    #[test]
    fn test_duplicate_image_paths_keep_last_payload() {
        let body = json!({
            "pin": "1234",
            "content": {},
            "images": [
                { "name": "pic11.jpg", "b64": "AAAA" },
                { "name": "pic11.jpg", "b64": "QUJD" }
            ]
        });
        let (plan, _) = prepare(&payload(body), &full_config(), now()).unwrap();
        assert_eq!(plan.images.len(), 1);
        assert_eq!(plan.images[0].b64, "QUJD");
    }

    #[test]
    fn test_bad_images_rejected() {
        let config = full_config();

        let err = prepare(
            &payload(json!({ "pin": "1234", "content": {}, "images": [{ "name": "???", "b64": "AAAA" }] })),
            &config,
            now(),
        )
        .unwrap_err();
        assert_eq!(err, PublishError::InvalidImageName { index: 0 });

        let err = prepare(
            &payload(json!({ "pin": "1234", "content": {}, "images": [{ "name": "pic1.jpg", "b64": "not base64!" }] })),
            &config,
            now(),
        )
        .unwrap_err();
        assert_eq!(err, PublishError::InvalidImagePayload { name: "pic1.jpg".to_string() });
        assert_eq!(err.detail().as_deref(), Some("pic1.jpg"));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_from_body_tolerates_garbage() {
        let payload = PublishPayload::from_body(b"not json");
        assert!(payload.pin.is_none());
        assert!(payload.content.is_none());

        let payload = PublishPayload::from_body(b"[1,2,3]");
        assert!(payload.pin.is_none());
    }

    #[test]
    fn test_upstream_error_message_and_detail() {
        let err = PublishError::Upstream {
            step: PublishStep::UpdateRef,
            source: UpstreamError::status(422, "{\"message\":\"Update is not a fast forward\"}"),
        };
        assert_eq!(err.to_string(), "Failed to update branch ref");
        assert_eq!(err.status_code(), 500);
        assert!(err.detail().unwrap().contains("fast forward"));
        assert_eq!(err.step(), Some(PublishStep::UpdateRef));
    }

    #[test]
    fn test_commit_message_without_images() {
        assert_eq!(
            commit_message(0, now()),
            "publish: update content.json (2026-03-14T09:30:00.000Z)"
        );
        assert!(commit_message(1, now()).contains("+ 1 image ("));
    }
}
