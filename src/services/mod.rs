//! Service layer for editor logic.
//!
//! This module contains the pieces of the admin workflow that do not depend
//! on any UI: naming rules, the editor reducer, the draft/live merge, draft
//! persistence and the live content fetch.

pub mod draft_store;
pub mod editor;
pub mod live;
pub mod merge;
pub mod naming;

// Re-export commonly used types and functions
pub use draft_store::DraftStore;
pub use editor::{apply, EditorEvent, EditorState};
pub use merge::{merge_for_publish, merge_gallery};
