//! CLI command handlers for Lodge.
//!
//! The `lodge` binary is the operator's editor: it keeps a draft next to the
//! config file, merges it into the live document and posts it to the publish
//! endpoint.

pub mod common;
pub mod config;
pub mod draft;
pub mod export;
pub mod publish;
pub mod render;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use draft::DraftArgs;
pub use export::ExportArgs;
pub use publish::PublishArgs;
pub use render::RenderArgs;
