//! Git Data API access.
//!
//! Publishing only needs six primitive operations on the hosting repository.
//! They are expressed as the [`GitDataApi`] trait so the publish state
//! machine can run against the real [`GitHubClient`] or an in-memory fake.

pub mod client;

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

pub use client::GitHubClient;

/// File mode for regular blobs in a tree.
pub const BLOB_MODE: &str = "100644";

/// A failed Git Data API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The API answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// No usable response: connection, TLS or decode failure.
    #[error("upstream request failed: {0}")]
    Transport(String),
}

impl UpstreamError {
    /// Error for a non-success response.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Error for a transport or decode failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Diagnostic text passed back to the caller: the raw upstream body, or
    /// the transport error.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Status { body, .. } => body,
            Self::Transport(message) => message,
        }
    }
}

/// Blob payload and its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobContent {
    /// UTF-8 text.
    Utf8(String),
    /// Base64-encoded bytes.
    Base64(String),
}

impl BlobContent {
    /// Encoding name as the API expects it.
    #[must_use]
    pub fn encoding(&self) -> &'static str {
        match self {
            Self::Utf8(_) => "utf-8",
            Self::Base64(_) => "base64",
        }
    }

    /// The payload text.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Utf8(text) | Self::Base64(text) => text,
        }
    }
}

/// One path in a new tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// Repository path.
    pub path: String,
    /// File mode.
    pub mode: &'static str,
    /// Object type.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Blob SHA.
    pub sha: String,
}

impl TreeEntry {
    /// A regular file entry pointing at a blob.
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: BLOB_MODE,
            kind: "blob",
            sha: sha.into(),
        }
    }
}

/// Result of a Git Data API call.
pub type ApiResult<T> = Result<T, UpstreamError>;

/// The primitive Git object operations publishing is built on.
///
/// Every method performs exactly one upstream call.
pub trait GitDataApi {
    /// Returns the commit SHA the branch points at.
    fn read_ref(&self, branch: &str) -> impl Future<Output = ApiResult<String>> + Send;

    /// Returns the tree SHA of a commit.
    fn read_commit(&self, sha: &str) -> impl Future<Output = ApiResult<String>> + Send;

    /// Creates a blob and returns its SHA.
    fn create_blob(&self, blob: &BlobContent) -> impl Future<Output = ApiResult<String>> + Send;

    /// Creates a tree on top of `base_tree` and returns its SHA.
    ///
    /// Paths not listed in `entries` are inherited from the base tree.
    fn create_tree(
        &self,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> impl Future<Output = ApiResult<String>> + Send;

    /// Creates a commit and returns its SHA.
    fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> impl Future<Output = ApiResult<String>> + Send;

    /// Moves the branch to `sha`.
    ///
    /// With `force == false` the update fails unless `sha` descends from the
    /// current tip.
    fn update_ref(
        &self,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> impl Future<Output = ApiResult<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_entry_wire_shape() {
        let entry = TreeEntry::blob("data/content.json", "abc123");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "path": "data/content.json",
                "mode": "100644",
                "type": "blob",
                "sha": "abc123"
            })
        );
    }

    #[test]
    fn test_upstream_error_detail() {
        assert_eq!(UpstreamError::status(404, "Not Found").detail(), "Not Found");
        assert_eq!(UpstreamError::transport("timed out").detail(), "timed out");
    }

    #[test]
    fn test_upstream_error_display() {
        assert_eq!(
            UpstreamError::status(422, "Update is not a fast forward").to_string(),
            "upstream returned HTTP 422: Update is not a fast forward"
        );
        assert_eq!(
            UpstreamError::transport("connection refused").to_string(),
            "upstream request failed: connection refused"
        );
    }

    #[test]
    fn test_blob_content_encoding() {
        assert_eq!(BlobContent::Utf8("{}".to_string()).encoding(), "utf-8");
        let blob = BlobContent::Base64("AAAA".to_string());
        assert_eq!(blob.encoding(), "base64");
        assert_eq!(blob.content(), "AAAA");
    }
}
