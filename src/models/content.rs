//! Content document model.
//!
//! `ContentDocument` is the whole editable state of the site as stored in
//! `data/content.json`. Fields this crate does not know about are kept in the
//! flattened `extra` maps so a fetched document can be re-serialized without
//! dropping anything.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The site's content document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    /// Brand information shown in the navigation bar.
    #[serde(default)]
    pub brand: Brand,
    /// Hero section.
    #[serde(default)]
    pub hero: Hero,
    /// Ordered package list.
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Photo gallery.
    #[serde(default)]
    pub gallery: Gallery,
    /// Optional generic layout blocks, rendered instead of the fixed sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
    /// Unknown top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Top-level key order of the parsed text. [`Self::to_value`] emits
    /// these keys first, in this order.
    #[serde(skip)]
    pub key_order: Vec<String>,
}

impl ContentDocument {
    /// Parses a content document from JSON text, remembering its top-level
    /// key order.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let key_order = value
            .as_object()
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default();
        let mut doc: Self = serde_json::from_value(value)?;
        doc.key_order = key_order;
        Ok(doc)
    }

    /// Converts the document to JSON with the parsed key order restored.
    /// Keys the parsed text did not have follow in field order.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        let mut fields = match serde_json::to_value(self)? {
            Value::Object(fields) => fields,
            other => return Ok(other),
        };
        let mut ordered = Map::with_capacity(fields.len());
        for key in &self.key_order {
            if let Some(value) = fields.shift_remove(key) {
                ordered.insert(key.clone(), value);
            }
        }
        ordered.extend(fields);
        Ok(Value::Object(ordered))
    }

    /// Serializes the document the way it is stored: pretty-printed with
    /// 2-space indentation.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_value()?)
    }

    /// Returns the blocks to render in blocks mode, if any.
    #[must_use]
    pub fn layout_blocks(&self) -> Option<&[Block]> {
        self.blocks.as_deref().filter(|blocks| !blocks.is_empty())
    }
}

/// Brand information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Brand name (e.g., "LODGE").
    #[serde(default)]
    pub name: String,
    /// Unknown brand fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Hero section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Sub-headline.
    #[serde(default)]
    pub subtitle: String,
    /// Primary call to action.
    #[serde(default)]
    pub cta_primary: CallToAction,
    /// Secondary call to action.
    #[serde(default)]
    pub cta_secondary: CallToAction,
    /// Background image path relative to the repository root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_image: Option<String>,
    /// Unknown hero fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A call-to-action button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToAction {
    /// Button label.
    #[serde(default)]
    pub label: String,
    /// Link target.
    #[serde(default)]
    pub href: String,
}

impl CallToAction {
    /// Creates a call to action.
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// A pricing package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name.
    #[serde(default)]
    pub name: String,
    /// Display price (free text, e.g., "£450").
    #[serde(default)]
    pub price: String,
    /// One-line detail.
    #[serde(default)]
    pub detail: String,
    /// Feature bullet points.
    #[serde(default)]
    pub features: Vec<String>,
    /// Optional badge text ("" for none).
    #[serde(default)]
    pub badge: String,
    /// Whether the package is highlighted.
    #[serde(default)]
    pub featured: bool,
}

/// Photo gallery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    /// Gallery items, unique by `src`.
    #[serde(default)]
    pub items: Vec<GalleryItem>,
    /// Unknown gallery fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One gallery photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Image path relative to the repository root (no leading slash).
    #[serde(default)]
    pub src: String,
    /// Alt text.
    #[serde(default)]
    pub alt: String,
}

impl GalleryItem {
    /// Creates a gallery item.
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
        }
    }

    /// Returns the filename component of `src`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.src.rsplit('/').next().unwrap_or_default()
    }
}

/// A layout block in blocks mode.
///
/// Blocks of a type this crate does not know are kept verbatim so they
/// survive a round trip through the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Block {
    /// A block this crate knows how to render.
    Known(LayoutBlock),
    /// Any other JSON value.
    Other(Value),
}

/// Typed layout blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutBlock {
    /// The hero section.
    Hero,
    /// The packages grid.
    Packages,
    /// The gallery grid, optionally truncated.
    Gallery {
        /// Maximum number of items to show.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
    /// A heading and body text.
    Text {
        /// Optional heading.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Body text.
        #[serde(default)]
        body: String,
    },
    /// A single image.
    Image {
        /// Image path.
        src: String,
        /// Alt text.
        #[serde(default)]
        alt: String,
    },
}
