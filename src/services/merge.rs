//! Draft/live merge policy.
//!
//! Publishing never sends the draft alone. The live document is fetched
//! fresh and the draft is laid over it:
//!
//! - gallery: live items first (minus the removal set), then draft items;
//!   entries are keyed by `src` and the draft wins on a duplicate key
//! - hero text and packages: replaced wholesale from the editor
//! - everything else: kept from the live document

use std::collections::HashMap;

use crate::constants::{DEFAULT_ALT, DEFAULT_PRIMARY_HREF, DEFAULT_SECONDARY_HREF};
use crate::models::{CallToAction, ContentDocument, DraftGalleryItem, GalleryItem, Package, RemovalSet};
use crate::services::editor::EditorState;
use crate::services::naming;

/// Ordered gallery map keyed by `src`.
///
/// Insertion order is kept; re-inserting an existing key replaces the entry
/// in place.
#[derive(Debug, Default)]
pub struct GalleryIndex {
    items: Vec<GalleryItem>,
    positions: HashMap<String, usize>,
}

impl GalleryIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `item.src`.
    pub fn upsert(&mut self, item: GalleryItem) {
        match self.positions.get(&item.src) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.positions.insert(item.src.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Flattens the index into the gallery list.
    #[must_use]
    pub fn into_items(self) -> Vec<GalleryItem> {
        self.items
    }
}

fn alt_or_default(alt: &str) -> String {
    let alt = alt.trim();
    if alt.is_empty() {
        DEFAULT_ALT.to_string()
    } else {
        alt.to_string()
    }
}

/// Merges the live gallery with the draft.
///
/// Live entries without a `src` or marked in `removed` are dropped; draft
/// entries with a blank name are skipped.
#[must_use]
pub fn merge_gallery(
    live: &[GalleryItem],
    draft: &[DraftGalleryItem],
    removed: &RemovalSet,
) -> Vec<GalleryItem> {
    let mut index = GalleryIndex::new();

    for item in live {
        if item.src.is_empty() || removed.contains(&item.src) {
            continue;
        }
        index.upsert(GalleryItem::new(item.src.clone(), alt_or_default(&item.alt)));
    }

    for item in draft {
        if item.name.trim().is_empty() {
            continue;
        }
        index.upsert(GalleryItem::new(item.src(), alt_or_default(&item.alt)));
    }

    index.into_items()
}

fn trimmed_cta(cta: &CallToAction, fallback_href: &str) -> CallToAction {
    let href = cta.href.trim();
    CallToAction::new(
        cta.label.trim(),
        if href.is_empty() { fallback_href } else { href },
    )
}

/// Normalizes a package from the editor: text fields trimmed, blank
/// features dropped.
#[must_use]
pub fn normalize_package(package: &Package) -> Package {
    Package {
        name: package.name.trim().to_string(),
        price: package.price.trim().to_string(),
        detail: package.detail.trim().to_string(),
        features: package
            .features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect(),
        badge: package.badge.trim().to_string(),
        featured: package.featured,
    }
}

/// Builds the document to publish from the freshly fetched live document and
/// the editor state.
#[must_use]
pub fn merge_for_publish(live: ContentDocument, editor: &EditorState) -> ContentDocument {
    let mut doc = live;

    doc.gallery.items = merge_gallery(&doc.gallery.items, &editor.gallery, &editor.removed);

    let form = &editor.hero;
    doc.hero.title = form.title.trim().to_string();
    doc.hero.subtitle = form.subtitle.trim().to_string();
    doc.hero.cta_primary = trimmed_cta(&form.cta_primary, DEFAULT_PRIMARY_HREF);
    doc.hero.cta_secondary = trimmed_cta(&form.cta_secondary, DEFAULT_SECONDARY_HREF);

    if let Some(background) = &editor.hero_background {
        doc.hero.bg_image = Some(naming::upload_path(&background.name));
    }

    doc.packages = editor.packages.iter().map(normalize_package).collect();

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageSource, PendingUpload};
    use std::path::PathBuf;

    fn live_item(src: &str, alt: &str) -> GalleryItem {
        GalleryItem::new(src, alt)
    }

    fn upload(name: &str, alt: &str) -> DraftGalleryItem {
        DraftGalleryItem {
            name: name.to_string(),
            alt: alt.to_string(),
            source: ImageSource::Upload {
                path: PathBuf::from(format!("/photos/{name}")),
            },
        }
    }

    fn live_draft(src: &str, alt: &str) -> DraftGalleryItem {
        DraftGalleryItem {
            name: src.rsplit('/').next().unwrap().to_string(),
            alt: alt.to_string(),
            source: ImageSource::Live { src: src.to_string() },
        }
    }

    #[test]
    fn test_gallery_index_replaces_in_place() {
        let mut index = GalleryIndex::new();
        index.upsert(live_item("a", "1"));
        index.upsert(live_item("b", "2"));
        index.upsert(live_item("a", "3"));

        let items = index.into_items();
        assert_eq!(items, vec![live_item("a", "3"), live_item("b", "2")]);
    }

    #[test]
    fn test_merge_empty_draft_is_identity() {
        let live = vec![
            live_item("assets/gallery/pic10.jpg", "Lake"),
            live_item("assets/gallery/pic11.jpg", "Dock"),
            live_item("assets/other/cover.jpg", "Cover"),
        ];

        let merged = merge_gallery(&live, &[], &RemovalSet::new());
        assert_eq!(merged, live);
    }

    #[test]
    fn test_merge_with_live_loaded_draft_is_identity() {
        let live = vec![
            live_item("assets/gallery/pic10.jpg", "Lake"),
            live_item("assets/other/cover.jpg", "Cover"),
        ];
        let draft: Vec<_> = live.iter().map(|it| live_draft(&it.src, &it.alt)).collect();

        let merged = merge_gallery(&live, &draft, &RemovalSet::new());
        assert_eq!(merged, live);
    }

    #[test]
    fn test_merge_adds_upload_after_live() {
        let live = vec![live_item("assets/gallery/pic10.jpg", "Lake")];
        let draft = vec![upload("pic11.webp", "")];

        let merged = merge_gallery(&live, &draft, &RemovalSet::new());
        assert_eq!(
            merged,
            vec![
                live_item("assets/gallery/pic10.jpg", "Lake"),
                live_item("assets/gallery/pic11.webp", DEFAULT_ALT),
            ]
        );
    }

    #[test]
    fn test_merge_removal_suppresses_live_entry() {
        let live = vec![
            live_item("assets/gallery/pic10.jpg", "Lake"),
            live_item("assets/gallery/pic11.jpg", "Dock"),
        ];
        let removed: RemovalSet = ["assets/gallery/pic10.jpg"].into_iter().collect();

        let merged = merge_gallery(&live, &[], &removed);
        assert_eq!(merged, vec![live_item("assets/gallery/pic11.jpg", "Dock")]);
    }

    #[test]
    fn test_merge_draft_wins_on_duplicate_src() {
        let live = vec![
            live_item("assets/gallery/pic10.jpg", "Old alt"),
            live_item("assets/gallery/pic11.jpg", "Dock"),
        ];
        let draft = vec![live_draft("assets/gallery/pic10.jpg", "New alt")];

        let merged = merge_gallery(&live, &draft, &RemovalSet::new());
        assert_eq!(merged[0], live_item("assets/gallery/pic10.jpg", "New alt"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_keeps_concurrent_live_additions() {
        // Another publisher added pic12 after this draft was loaded
        let live = vec![
            live_item("assets/gallery/pic10.jpg", "Lake"),
            live_item("assets/gallery/pic12.jpg", "Someone else"),
        ];
        let draft = vec![live_draft("assets/gallery/pic10.jpg", "Lake")];

        let merged = merge_gallery(&live, &draft, &RemovalSet::new());
        assert!(merged.iter().any(|it| it.src == "assets/gallery/pic12.jpg"));
    }

    #[test]
    fn test_merge_skips_blank_entries() {
        let live = vec![live_item("", "ghost")];
        let draft = vec![upload("  ", "blank")];

        assert!(merge_gallery(&live, &draft, &RemovalSet::new()).is_empty());
    }

    #[test]
    fn test_merge_for_publish_overwrites_hero_and_packages() {
        let mut live = ContentDocument::default();
        live.brand.name = "LODGE".to_string();
        live.hero.title = "Live title".to_string();
        live.hero.bg_image = Some("assets/background/pic1.jpg".to_string());
        live.packages = vec![Package {
            name: "Live package".to_string(),
            ..Package::default()
        }];

        let mut editor = EditorState::default();
        editor.hero.title = "  Draft title ".to_string();
        editor.hero.cta_primary = CallToAction::new(" Portfolio ", "  ");
        editor.hero.cta_secondary = CallToAction::new("Pricing", "#pricing");
        editor.packages = vec![Package {
            name: " Weekend ".to_string(),
            price: " £450 ".to_string(),
            features: vec![" 2 days ".to_string(), "   ".to_string()],
            featured: true,
            ..Package::default()
        }];

        let merged = merge_for_publish(live, &editor);

        assert_eq!(merged.brand.name, "LODGE");
        assert_eq!(merged.hero.title, "Draft title");
        assert_eq!(merged.hero.cta_primary, CallToAction::new("Portfolio", "#work"));
        assert_eq!(merged.hero.cta_secondary.href, "#pricing");
        assert_eq!(merged.hero.bg_image.as_deref(), Some("assets/background/pic1.jpg"));
        assert_eq!(merged.packages.len(), 1);
        assert_eq!(merged.packages[0].name, "Weekend");
        assert_eq!(merged.packages[0].price, "£450");
        assert_eq!(merged.packages[0].features, vec!["2 days".to_string()]);
        assert!(merged.packages[0].featured);
    }

    #[test]
    fn test_merge_for_publish_points_hero_at_new_background() {
        let mut editor = EditorState::default();
        editor.hero_background = Some(PendingUpload {
            name: "hero_bg.webp".to_string(),
            path: PathBuf::from("/photos/sunset.webp"),
        });

        let merged = merge_for_publish(ContentDocument::default(), &editor);
        assert_eq!(merged.hero.bg_image.as_deref(), Some("assets/background/hero_bg.webp"));
        assert_eq!(merged.hero.cta_secondary.href, "#packages");
    }
}
