//! GitHub REST client for the Git Data API.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ApiResult, BlobContent, GitDataApi, TreeEntry, UpstreamError};
use crate::config::RepoTarget;
use crate::constants::USER_AGENT;

const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct ObjectSha {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ObjectSha,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    tree: ObjectSha,
}

/// Authenticated client bound to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    repo_url: String,
}

impl GitHubClient {
    /// Builds a client for the given repository.
    pub fn new(target: &RepoTarget) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", target.token))
            .map_err(|_| UpstreamError::transport("access token is not a valid header value"))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| UpstreamError::transport(e.to_string()))?;

        Ok(Self {
            http,
            repo_url: format!(
                "{}/repos/{}/{}",
                target.api_url.trim_end_matches('/'),
                target.owner,
                target.repo
            ),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.repo_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let resp = request
            .send()
            .await
            .map_err(|e| UpstreamError::transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| UpstreamError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(UpstreamError::status(status.as_u16(), body));
        }

        serde_json::from_str(&body)
            .map_err(|e| UpstreamError::transport(format!("unexpected response body: {e}")))
    }
}

impl GitDataApi for GitHubClient {
    async fn read_ref(&self, branch: &str) -> ApiResult<String> {
        debug!("GET ref heads/{}", branch);
        let resp: RefResponse = self
            .send(self.http.get(self.url(&format!("git/ref/heads/{branch}"))))
            .await?;
        Ok(resp.object.sha)
    }

    async fn read_commit(&self, sha: &str) -> ApiResult<String> {
        debug!("GET commit {}", sha);
        let resp: CommitResponse = self
            .send(self.http.get(self.url(&format!("git/commits/{sha}"))))
            .await?;
        Ok(resp.tree.sha)
    }

    async fn create_blob(&self, blob: &BlobContent) -> ApiResult<String> {
        debug!("POST blob ({}, {} bytes)", blob.encoding(), blob.content().len());
        let body = json!({ "content": blob.content(), "encoding": blob.encoding() });
        let resp: ObjectSha = self
            .send(self.http.post(self.url("git/blobs")).json(&body))
            .await?;
        Ok(resp.sha)
    }

    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> ApiResult<String> {
        debug!("POST tree on {} with {} entries", base_tree, entries.len());
        let body = json!({ "base_tree": base_tree, "tree": entries });
        let resp: ObjectSha = self
            .send(self.http.post(self.url("git/trees")).json(&body))
            .await?;
        Ok(resp.sha)
    }

    async fn create_commit(&self, message: &str, tree: &str, parents: &[String]) -> ApiResult<String> {
        debug!("POST commit tree={} parents={:?}", tree, parents);
        let body = json!({ "message": message, "tree": tree, "parents": parents });
        let resp: ObjectSha = self
            .send(self.http.post(self.url("git/commits")).json(&body))
            .await?;
        Ok(resp.sha)
    }

    async fn update_ref(&self, branch: &str, sha: &str, force: bool) -> ApiResult<()> {
        debug!("PATCH ref heads/{} -> {} (force={})", branch, sha, force);
        let body = json!({ "sha": sha, "force": force });
        let _: serde_json::Value = self
            .send(
                self.http
                    .patch(self.url(&format!("git/refs/heads/{branch}")))
                    .json(&body),
            )
            .await?;
        Ok(())
    }
}
