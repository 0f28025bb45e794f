//! Draft-side types: images held by the editor before publishing and the
//! wire form they are sent in.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::GALLERY_DIR;

/// Where a draft gallery image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    /// Already published; `src` is its path in the repository.
    Live {
        /// Repository path of the published image.
        src: String,
    },
    /// Picked locally and not yet uploaded.
    Upload {
        /// Local file to read when publishing.
        path: PathBuf,
    },
}

/// One image in the editor's gallery draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftGalleryItem {
    /// Sanitized filename (e.g., `pic11.jpg`).
    pub name: String,
    /// Alt text.
    pub alt: String,
    /// Origin of the image bytes.
    pub source: ImageSource,
}

impl DraftGalleryItem {
    /// Repository path this item is published at.
    ///
    /// Live items keep the path they were loaded from; uploads go under
    /// `assets/gallery/`.
    #[must_use]
    pub fn src(&self) -> String {
        match &self.source {
            ImageSource::Live { src } => src.clone(),
            ImageSource::Upload { .. } => format!("{GALLERY_DIR}/{}", self.name.trim()),
        }
    }

    /// Returns the local file if this item still needs uploading.
    #[must_use]
    pub fn upload_path(&self) -> Option<&PathBuf> {
        match &self.source {
            ImageSource::Upload { path } => Some(path),
            ImageSource::Live { .. } => None,
        }
    }
}

/// A locally picked file waiting to be uploaded under a fixed name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpload {
    /// Sanitized target filename (e.g., `hero_bg.webp`).
    pub name: String,
    /// Local file to read when publishing.
    pub path: PathBuf,
}

/// Set of live `src` paths marked for deletion from the gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemovalSet(BTreeSet<String>);

impl RemovalSet {
    /// Creates an empty removal set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `src` for removal. Blank paths are ignored.
    pub fn insert(&mut self, src: impl Into<String>) {
        let src = src.into();
        let src = src.trim();
        if !src.is_empty() {
            self.0.insert(src.to_string());
        }
    }

    /// Unmarks `src`.
    pub fn remove(&mut self, src: &str) {
        self.0.remove(src);
    }

    /// Returns true if `src` is marked for removal.
    #[must_use]
    pub fn contains(&self, src: &str) -> bool {
        self.0.contains(src)
    }

    /// Iterates over the marked paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of marked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for RemovalSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for src in iter {
            set.insert(src);
        }
        set
    }
}

/// An image as sent to the publish endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftImage {
    /// Target filename; the server sanitizes it again.
    pub name: String,
    /// Base64 payload without any `data:` prefix.
    pub b64: String,
    /// Alt text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}
