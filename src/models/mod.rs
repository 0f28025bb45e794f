//! Data models for the site content and the editor draft.
//!
//! Models are independent of the editor, the renderer and the publish
//! pipeline; they only describe data and its JSON shape.

pub mod content;
pub mod draft;

// Re-export all model types
pub use content::{
    Block, Brand, CallToAction, ContentDocument, Gallery, GalleryItem, Hero, LayoutBlock, Package,
};
pub use draft::{DraftGalleryItem, DraftImage, ImageSource, PendingUpload, RemovalSet};
