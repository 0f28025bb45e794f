//! Editor state and its reducer.
//!
//! The editor is a plain serializable value. Every change goes through
//! [`apply`], which takes the current state and an [`EditorEvent`] and
//! returns the next state, so gallery numbering, removals and package edits
//! can be exercised without any UI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ALT, HERO_BG_ALT, MAX_GALLERY_ITEMS};
use crate::models::{
    CallToAction, ContentDocument, DraftGalleryItem, Hero, ImageSource, Package, PendingUpload,
    RemovalSet,
};
use crate::services::naming;

/// Hero text fields as edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroForm {
    /// Headline.
    pub title: String,
    /// Sub-headline.
    pub subtitle: String,
    /// Primary call to action.
    pub cta_primary: CallToAction,
    /// Secondary call to action.
    pub cta_secondary: CallToAction,
}

impl From<&Hero> for HeroForm {
    fn from(hero: &Hero) -> Self {
        Self {
            title: hero.title.clone(),
            subtitle: hero.subtitle.clone(),
            cta_primary: hero.cta_primary.clone(),
            cta_secondary: hero.cta_secondary.clone(),
        }
    }
}

/// The operator's unpublished edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorState {
    /// Hero form.
    #[serde(default)]
    pub hero: HeroForm,
    /// Package list, replaced wholesale on publish.
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Gallery draft, in display order.
    #[serde(default)]
    pub gallery: Vec<DraftGalleryItem>,
    /// Live paths to drop on publish.
    #[serde(default)]
    pub removed: RemovalSet,
    /// Hero background picked this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_background: Option<PendingUpload>,
    /// Largest `pic<N>` number seen or issued.
    #[serde(default)]
    pub high_water: u32,
}

/// One image to read from disk and upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob<'a> {
    /// Target filename.
    pub name: &'a str,
    /// Local file.
    pub path: &'a Path,
    /// Alt text sent with the image.
    pub alt: &'a str,
}

impl EditorState {
    /// Returns true if publishing would add, replace or drop any image.
    #[must_use]
    pub fn has_gallery_changes(&self) -> bool {
        !self.removed.is_empty()
            || self.hero_background.is_some()
            || self.gallery.iter().any(|it| it.upload_path().is_some())
    }

    /// Lists the files that must be uploaded: the hero background first,
    /// then gallery uploads in draft order.
    pub fn uploads(&self) -> Vec<UploadJob<'_>> {
        let background = self.hero_background.iter().map(|bg| UploadJob {
            name: &bg.name,
            path: bg.path.as_path(),
            alt: HERO_BG_ALT,
        });
        let gallery = self.gallery.iter().filter_map(|item| {
            item.upload_path().map(|path| UploadJob {
                name: &item.name,
                path: path.as_path(),
                alt: &item.alt,
            })
        });
        background.chain(gallery).collect()
    }

    fn issued_names(&self) -> impl Iterator<Item = &str> {
        self.gallery
            .iter()
            .map(|it| it.name.as_str())
            .chain(self.removed.iter())
    }
}

/// Direction for reordering a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the start of the list.
    Up,
    /// Towards the end of the list.
    Down,
}

/// A single package field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageEdit {
    /// Set the name.
    Name(String),
    /// Set the price.
    Price(String),
    /// Set the detail line.
    Detail(String),
    /// Set the badge.
    Badge(String),
    /// Set the featured flag.
    Featured(bool),
    /// Replace the features from text, one per line.
    Features(String),
}

/// Everything that can happen to the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The live document was fetched.
    LiveLoaded(ContentDocument),
    /// The live gallery was re-read just before merging; carries every live
    /// `src`. Pending uploads whose number is no longer past the live
    /// gallery are renumbered.
    LiveRefreshed(Vec<String>),
    /// Hero headline typed.
    HeroTitleChanged(String),
    /// Hero sub-headline typed.
    HeroSubtitleChanged(String),
    /// Primary call to action edited.
    PrimaryCtaChanged(CallToAction),
    /// Secondary call to action edited.
    SecondaryCtaChanged(CallToAction),
    /// A hero background file was picked.
    HeroBackgroundPicked(PathBuf),
    /// The picked hero background was dropped.
    HeroBackgroundCleared,
    /// Files were picked for the gallery.
    PhotosAdded(Vec<PathBuf>),
    /// The gallery item at this index was deleted.
    PhotoRemoved(usize),
    /// Alt text edited for the gallery item at `index`.
    AltChanged {
        /// Gallery index.
        index: usize,
        /// New alt text.
        alt: String,
    },
    /// A package with default values was appended.
    PackageAdded,
    /// The package at this index was deleted.
    PackageRemoved(usize),
    /// A package was moved one step.
    PackageMoved {
        /// Package index.
        index: usize,
        /// Direction.
        direction: MoveDirection,
    },
    /// A package field was edited.
    PackageEdited {
        /// Package index.
        index: usize,
        /// The change.
        edit: PackageEdit,
    },
    /// A publish succeeded; uploads are now live.
    Published,
    /// The gallery draft was discarded.
    Cleared,
}

fn default_package() -> Package {
    Package {
        name: "New Package".to_string(),
        price: "£0".to_string(),
        ..Package::default()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn load_live(mut state: EditorState, live: ContentDocument) -> EditorState {
    state.hero = HeroForm::from(&live.hero);
    state.packages = live.packages;

    let live_max = live
        .gallery
        .items
        .iter()
        .filter_map(|it| naming::pic_number(&it.src))
        .max()
        .unwrap_or(0);
    state.high_water = state.high_water.max(live_max);

    if state.gallery.is_empty() {
        state.gallery = live
            .gallery
            .items
            .into_iter()
            .filter(|it| !it.src.is_empty())
            .map(|it| {
                let name = match it.file_name() {
                    "" => "unknown.jpg".to_string(),
                    name => name.to_string(),
                };
                let alt = if it.alt.trim().is_empty() {
                    DEFAULT_ALT.to_string()
                } else {
                    it.alt
                };
                DraftGalleryItem {
                    name,
                    alt,
                    source: ImageSource::Live { src: it.src },
                }
            })
            .collect();
    }

    state
}

fn add_photos(mut state: EditorState, files: Vec<PathBuf>) -> EditorState {
    let space = MAX_GALLERY_ITEMS.saturating_sub(state.gallery.len());

    for path in files.into_iter().filter(|p| naming::is_image_file(p)).take(space) {
        let name = naming::next_pic_name(state.issued_names(), state.high_water, &file_name_of(&path));
        if let Some(n) = naming::pic_number(&name) {
            state.high_water = state.high_water.max(n);
        }
        state.gallery.push(DraftGalleryItem {
            name,
            alt: DEFAULT_ALT.to_string(),
            source: ImageSource::Upload { path },
        });
    }

    state
}

fn rebase_uploads(mut state: EditorState, live_srcs: Vec<String>) -> EditorState {
    let live_max = live_srcs
        .iter()
        .filter_map(|src| naming::pic_number(src))
        .max()
        .unwrap_or(0);
    state.high_water = state.high_water.max(live_max);

    for index in 0..state.gallery.len() {
        let item = &state.gallery[index];
        if item.upload_path().is_none() {
            continue;
        }
        let stale = !matches!(naming::pic_number(&item.name), Some(n) if n > live_max)
            || live_srcs.contains(&item.src());
        if !stale {
            continue;
        }

        let name = naming::next_pic_name(
            state
                .issued_names()
                .chain(live_srcs.iter().map(String::as_str)),
            state.high_water,
            &item.name,
        );
        if let Some(n) = naming::pic_number(&name) {
            state.high_water = state.high_water.max(n);
        }
        state.gallery[index].name = name;
    }

    state
}

fn edit_package(package: &mut Package, edit: PackageEdit) {
    match edit {
        PackageEdit::Name(v) => package.name = v,
        PackageEdit::Price(v) => package.price = v,
        PackageEdit::Detail(v) => package.detail = v,
        PackageEdit::Badge(v) => package.badge = v,
        PackageEdit::Featured(v) => package.featured = v,
        PackageEdit::Features(text) => {
            package.features = text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}

/// Applies one event to the editor state.
///
/// Out-of-range indices leave the state unchanged.
#[must_use]
pub fn apply(mut state: EditorState, event: EditorEvent) -> EditorState {
    match event {
        EditorEvent::LiveLoaded(live) => return load_live(state, live),
        EditorEvent::LiveRefreshed(srcs) => return rebase_uploads(state, srcs),
        EditorEvent::HeroTitleChanged(title) => state.hero.title = title,
        EditorEvent::HeroSubtitleChanged(subtitle) => state.hero.subtitle = subtitle,
        EditorEvent::PrimaryCtaChanged(cta) => state.hero.cta_primary = cta,
        EditorEvent::SecondaryCtaChanged(cta) => state.hero.cta_secondary = cta,
        EditorEvent::HeroBackgroundPicked(path) => {
            let name = naming::hero_background_name(&file_name_of(&path));
            state.hero_background = Some(PendingUpload { name, path });
        }
        EditorEvent::HeroBackgroundCleared => state.hero_background = None,
        EditorEvent::PhotosAdded(files) => return add_photos(state, files),
        EditorEvent::PhotoRemoved(index) => {
            if index < state.gallery.len() {
                let item = state.gallery.remove(index);
                if let ImageSource::Live { src } = item.source {
                    state.removed.insert(src);
                }
                // Numbers are never renumbered or reissued
                if let Some(n) = naming::pic_number(&item.name) {
                    state.high_water = state.high_water.max(n);
                }
            }
        }
        EditorEvent::AltChanged { index, alt } => {
            if let Some(item) = state.gallery.get_mut(index) {
                item.alt = alt;
            }
        }
        EditorEvent::PackageAdded => state.packages.push(default_package()),
        EditorEvent::PackageRemoved(index) => {
            if index < state.packages.len() {
                state.packages.remove(index);
            }
        }
        EditorEvent::PackageMoved { index, direction } => {
            let target = match direction {
                MoveDirection::Up => index.checked_sub(1),
                MoveDirection::Down => index.checked_add(1),
            };
            if let Some(target) = target {
                if index < state.packages.len() && target < state.packages.len() {
                    state.packages.swap(index, target);
                }
            }
        }
        EditorEvent::PackageEdited { index, edit } => {
            if let Some(package) = state.packages.get_mut(index) {
                edit_package(package, edit);
            }
        }
        EditorEvent::Published => {
            for item in &mut state.gallery {
                if item.upload_path().is_some() {
                    item.source = ImageSource::Live { src: item.src() };
                }
            }
            state.hero_background = None;
            state.removed = RemovalSet::new();
        }
        EditorEvent::Cleared => {
            state.gallery.clear();
            state.removed = RemovalSet::new();
            state.hero_background = None;
        }
    }
    state
}

/// Applies a sequence of events in order.
#[must_use]
pub fn apply_all(state: EditorState, events: impl IntoIterator<Item = EditorEvent>) -> EditorState {
    events.into_iter().fold(state, apply)
}
