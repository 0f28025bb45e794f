//! Publish state machine.
//!
//! Each [`PublishState`] names the next upstream call and carries everything
//! earlier calls produced. [`Publisher::advance`] performs exactly one call,
//! so a failure is always attributable to a single [`PublishStep`] and the
//! branch ref is only ever touched by the last step.

use tracing::{debug, info, warn};

use super::{PublishError, PublishPlan, PublishStep};
use crate::constants::CONTENT_PATH;
use crate::github::{BlobContent, GitDataApi, TreeEntry};

/// Progress through the publish protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
    /// Read the branch tip.
    ReadRef,
    /// Read the tip commit to find its tree.
    ReadCommit {
        /// Tip commit SHA.
        parent: String,
    },
    /// Upload the content document.
    CreateContentBlob {
        /// Tip commit SHA.
        parent: String,
        /// Tree of the tip commit.
        base_tree: String,
    },
    /// Upload image `next` of the plan.
    CreateImageBlobs {
        /// Tip commit SHA.
        parent: String,
        /// Tree of the tip commit.
        base_tree: String,
        /// Tree entries created so far.
        entries: Vec<TreeEntry>,
        /// Index of the next image.
        next: usize,
    },
    /// Build the new tree on top of the base tree.
    CreateTree {
        /// Tip commit SHA.
        parent: String,
        /// Tree of the tip commit.
        base_tree: String,
        /// Every changed path.
        entries: Vec<TreeEntry>,
    },
    /// Create the commit.
    CreateCommit {
        /// Tip commit SHA.
        parent: String,
        /// New tree SHA.
        tree: String,
    },
    /// Fast-forward the branch.
    UpdateRef {
        /// New commit SHA.
        commit: String,
    },
    /// The branch points at `commit`.
    Done {
        /// New commit SHA.
        commit: String,
    },
}

impl PublishState {
    /// The step the next [`Publisher::advance`] performs, or `None` when done.
    #[must_use]
    pub fn step(&self) -> Option<PublishStep> {
        match self {
            Self::ReadRef => Some(PublishStep::ReadRef),
            Self::ReadCommit { .. } => Some(PublishStep::ReadCommit),
            Self::CreateContentBlob { .. } => Some(PublishStep::CreateContentBlob),
            Self::CreateImageBlobs { .. } => Some(PublishStep::CreateImageBlob),
            Self::CreateTree { .. } => Some(PublishStep::CreateTree),
            Self::CreateCommit { .. } => Some(PublishStep::CreateCommit),
            Self::UpdateRef { .. } => Some(PublishStep::UpdateRef),
            Self::Done { .. } => None,
        }
    }
}

/// Drives a [`PublishPlan`] against a repository.
#[derive(Debug)]
pub struct Publisher<'a, A> {
    api: &'a A,
    branch: &'a str,
    plan: &'a PublishPlan,
}

impl<'a, A: GitDataApi + Sync> Publisher<'a, A> {
    /// Creates a publisher for `plan` on `branch`.
    pub fn new(api: &'a A, branch: &'a str, plan: &'a PublishPlan) -> Self {
        Self { api, branch, plan }
    }

    /// Performs the upstream call for `state` and returns the next state.
    pub async fn advance(&self, state: PublishState) -> Result<PublishState, PublishError> {
        let next = match state {
            PublishState::ReadRef => {
                let parent = self
                    .api
                    .read_ref(self.branch)
                    .await
                    .map_err(PublishError::upstream(PublishStep::ReadRef))?;
                PublishState::ReadCommit { parent }
            }
            PublishState::ReadCommit { parent } => {
                let base_tree = self
                    .api
                    .read_commit(&parent)
                    .await
                    .map_err(PublishError::upstream(PublishStep::ReadCommit))?;
                PublishState::CreateContentBlob { parent, base_tree }
            }
            PublishState::CreateContentBlob { parent, base_tree } => {
                let blob = BlobContent::Utf8(self.plan.content_json.clone());
                let sha = self
                    .api
                    .create_blob(&blob)
                    .await
                    .map_err(PublishError::upstream(PublishStep::CreateContentBlob))?;
                let entries = vec![TreeEntry::blob(CONTENT_PATH, sha)];
                self.after_blobs(parent, base_tree, entries, 0)
            }
            PublishState::CreateImageBlobs {
                parent,
                base_tree,
                mut entries,
                next,
            } => match self.plan.images.get(next) {
                Some(image) => {
                    let blob = BlobContent::Base64(image.b64.clone());
                    let sha = self
                        .api
                        .create_blob(&blob)
                        .await
                        .map_err(PublishError::upstream(PublishStep::CreateImageBlob))?;
                    entries.push(TreeEntry::blob(image.path.clone(), sha));
                    self.after_blobs(parent, base_tree, entries, next + 1)
                }
                None => PublishState::CreateTree {
                    parent,
                    base_tree,
                    entries,
                },
            },
            PublishState::CreateTree {
                parent,
                base_tree,
                entries,
            } => {
                let tree = self
                    .api
                    .create_tree(&base_tree, &entries)
                    .await
                    .map_err(PublishError::upstream(PublishStep::CreateTree))?;
                PublishState::CreateCommit { parent, tree }
            }
            PublishState::CreateCommit { parent, tree } => {
                let commit = self
                    .api
                    .create_commit(&self.plan.message, &tree, std::slice::from_ref(&parent))
                    .await
                    .map_err(PublishError::upstream(PublishStep::CreateCommit))?;
                PublishState::UpdateRef { commit }
            }
            PublishState::UpdateRef { commit } => {
                self.api
                    .update_ref(self.branch, &commit, false)
                    .await
                    .map_err(PublishError::upstream(PublishStep::UpdateRef))?;
                PublishState::Done { commit }
            }
            done @ PublishState::Done { .. } => done,
        };

        debug!("publish step -> {:?}", next.step());
        Ok(next)
    }

    fn after_blobs(
        &self,
        parent: String,
        base_tree: String,
        entries: Vec<TreeEntry>,
        next: usize,
    ) -> PublishState {
        if next < self.plan.images.len() {
            PublishState::CreateImageBlobs {
                parent,
                base_tree,
                entries,
                next,
            }
        } else {
            PublishState::CreateTree {
                parent,
                base_tree,
                entries,
            }
        }
    }

    /// Runs the whole protocol and returns the new commit SHA.
    pub async fn run(&self) -> Result<String, PublishError> {
        info!(
            "Publishing to {} ({} image(s))",
            self.branch,
            self.plan.images.len()
        );

        let mut state = PublishState::ReadRef;
        loop {
            state = match self.advance(state).await {
                Ok(PublishState::Done { commit }) => {
                    info!("Published commit {}", commit);
                    return Ok(commit);
                }
                Ok(next) => next,
                Err(err) => {
                    warn!("Publish failed: {} ({})", err, err.detail().unwrap_or_default());
                    return Err(err);
                }
            };
        }
    }
}
