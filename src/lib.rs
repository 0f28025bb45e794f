//! Lodge Library
//!
//! Content tooling for the Lodge photography site: the content document
//! model, the editor draft and its merge into the live document, the public
//! page renderer, and the publish pipeline that commits content and images
//! to the site repository through the Git Data API.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod github;
pub mod models;
pub mod publish;
pub mod render;
pub mod services;
#[cfg(feature = "web")]
pub mod web;
