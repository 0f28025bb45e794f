//! In-process fake of the Git Data API endpoints used by publishing.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

type Reply = (StatusCode, Json<Value>);

/// One stored commit.
#[derive(Debug, Clone)]
pub struct FakeCommit {
    pub tree: String,
    pub parents: Vec<String>,
    pub message: String,
}

#[derive(Debug, Default)]
struct Repo {
    tip: String,
    commits: HashMap<String, FakeCommit>,
    trees: HashMap<String, BTreeMap<String, String>>,
    blobs: HashMap<String, (String, String)>,
    calls: Vec<String>,
    auth: Vec<String>,
    fail_on: Option<&'static str>,
    race_before_update: bool,
    counter: u32,
}

impl Repo {
    fn next_sha(&mut self, kind: &str) -> String {
        self.counter += 1;
        format!("{kind}{:04}", self.counter)
    }

    fn enter(&mut self, op: &'static str, headers: &HeaderMap) -> Result<(), Reply> {
        self.calls.push(op.to_string());
        if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            self.auth.push(auth.to_string());
        }
        if self.fail_on == Some(op) {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": format!("{op} is down") })),
            ));
        }
        Ok(())
    }
}

type Shared = Arc<Mutex<Repo>>;

/// Handle to a running fake server.
#[derive(Clone)]
pub struct FakeGitHub {
    addr: SocketAddr,
    repo: Shared,
}

impl FakeGitHub {
    /// Starts the fake on an ephemeral port with one seed commit.
    pub async fn start() -> Self {
        let mut repo = Repo::default();
        let mut tree = BTreeMap::new();
        tree.insert("index.html".to_string(), "blob-index".to_string());
        tree.insert("data/content.json".to_string(), "blob-old-content".to_string());
        repo.trees.insert("tree-seed".to_string(), tree);
        repo.commits.insert(
            "commit-seed".to_string(),
            FakeCommit {
                tree: "tree-seed".to_string(),
                parents: Vec::new(),
                message: "initial".to_string(),
            },
        );
        repo.tip = "commit-seed".to_string();
        let repo = Arc::new(Mutex::new(repo));

        let app = Router::new()
            .route("/repos/{owner}/{repo}/git/ref/heads/{branch}", get(read_ref))
            .route("/repos/{owner}/{repo}/git/commits/{sha}", get(read_commit))
            .route("/repos/{owner}/{repo}/git/blobs", post(create_blob))
            .route("/repos/{owner}/{repo}/git/trees", post(create_tree))
            .route("/repos/{owner}/{repo}/git/commits", post(create_commit))
            .route("/repos/{owner}/{repo}/git/refs/heads/{branch}", patch(update_ref))
            .layer(DefaultBodyLimit::disable())
            .with_state(repo.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake GitHub");
        let addr = listener.local_addr().expect("No local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, repo }
    }

    /// Base URL to use as `GITHUB_API_URL`.
    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Makes the named operation answer 500.
    pub fn fail_on(&self, op: &'static str) {
        self.repo.lock().unwrap().fail_on = Some(op);
    }

    /// Moves the branch just before the next ref update arrives.
    pub fn race_next_update(&self) {
        self.repo.lock().unwrap().race_before_update = true;
    }

    /// Operations received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.repo.lock().unwrap().calls.clone()
    }

    /// Authorization headers received.
    pub fn auth_headers(&self) -> Vec<String> {
        self.repo.lock().unwrap().auth.clone()
    }

    /// Current branch tip.
    pub fn tip(&self) -> String {
        self.repo.lock().unwrap().tip.clone()
    }

    /// A stored commit.
    pub fn commit(&self, sha: &str) -> Option<FakeCommit> {
        self.repo.lock().unwrap().commits.get(sha).cloned()
    }

    /// Path → blob SHA of the tip tree.
    pub fn tip_tree(&self) -> BTreeMap<String, String> {
        let repo = self.repo.lock().unwrap();
        let tree = &repo.commits[&repo.tip].tree;
        repo.trees[tree].clone()
    }

    /// `(encoding, content)` of a blob.
    pub fn blob(&self, sha: &str) -> Option<(String, String)> {
        self.repo.lock().unwrap().blobs.get(sha).cloned()
    }
}

async fn read_ref(
    State(repo): State<Shared>,
    Path((_owner, _repo, _branch)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Reply {
    let mut repo = repo.lock().unwrap();
    if let Err(reply) = repo.enter("read_ref", &headers) {
        return reply;
    }
    (StatusCode::OK, Json(json!({ "object": { "sha": repo.tip, "type": "commit" } })))
}

async fn read_commit(
    State(repo): State<Shared>,
    Path((_owner, _repo, sha)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Reply {
    let mut repo = repo.lock().unwrap();
    if let Err(reply) = repo.enter("read_commit", &headers) {
        return reply;
    }
    match repo.commits.get(&sha) {
        Some(commit) => (
            StatusCode::OK,
            Json(json!({ "sha": sha, "tree": { "sha": commit.tree } })),
        ),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))),
    }
}

async fn create_blob(State(repo): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut repo = repo.lock().unwrap();
    if let Err(reply) = repo.enter("create_blob", &headers) {
        return reply;
    }
    let encoding = body["encoding"].as_str().unwrap_or_default().to_string();
    let content = body["content"].as_str().unwrap_or_default().to_string();
    let sha = repo.next_sha("blob");
    repo.blobs.insert(sha.clone(), (encoding, content));
    (StatusCode::CREATED, Json(json!({ "sha": sha })))
}

async fn create_tree(State(repo): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut repo = repo.lock().unwrap();
    if let Err(reply) = repo.enter("create_tree", &headers) {
        return reply;
    }
    let base = body["base_tree"].as_str().unwrap_or_default();
    let Some(mut tree) = repo.trees.get(base).cloned() else {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": "base_tree not found" })));
    };
    for entry in body["tree"].as_array().into_iter().flatten() {
        let path = entry["path"].as_str().unwrap_or_default().to_string();
        let sha = entry["sha"].as_str().unwrap_or_default().to_string();
        tree.insert(path, sha);
    }
    let sha = repo.next_sha("tree");
    repo.trees.insert(sha.clone(), tree);
    (StatusCode::CREATED, Json(json!({ "sha": sha })))
}

async fn create_commit(State(repo): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut repo = repo.lock().unwrap();
    if let Err(reply) = repo.enter("create_commit", &headers) {
        return reply;
    }
    let commit = FakeCommit {
        tree: body["tree"].as_str().unwrap_or_default().to_string(),
        parents: body["parents"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|p| p.as_str().map(str::to_string))
            .collect(),
        message: body["message"].as_str().unwrap_or_default().to_string(),
    };
    let sha = repo.next_sha("commit");
    repo.commits.insert(sha.clone(), commit);
    (StatusCode::CREATED, Json(json!({ "sha": sha })))
}

async fn update_ref(
    State(repo): State<Shared>,
    Path((_owner, _repo, branch)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut repo = repo.lock().unwrap();
    if let Err(reply) = repo.enter("update_ref", &headers) {
        return reply;
    }

    if repo.race_before_update {
        repo.race_before_update = false;
        let other = repo.next_sha("commit");
        let seed_tree = repo.commits[&repo.tip].tree.clone();
        let parent = repo.tip.clone();
        repo.commits.insert(
            other.clone(),
            FakeCommit {
                tree: seed_tree,
                parents: vec![parent],
                message: "someone else".to_string(),
            },
        );
        repo.tip = other;
    }

    let sha = body["sha"].as_str().unwrap_or_default().to_string();
    let force = body["force"].as_bool().unwrap_or(false);
    let fast_forward = repo
        .commits
        .get(&sha)
        .is_some_and(|c| c.parents.contains(&repo.tip));
    if !force && !fast_forward {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Update is not a fast forward" })),
        );
    }

    repo.tip = sha.clone();
    (
        StatusCode::OK,
        Json(json!({ "ref": format!("refs/heads/{branch}"), "object": { "sha": sha } })),
    )
}
