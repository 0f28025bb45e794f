//! Filename rules for uploaded images.
//!
//! Gallery uploads are named `pic<N>.<ext>` with `N` strictly above every
//! number issued so far, so a published URL is never reused for a different
//! photo. The hero background always lands on `hero_bg.<ext>`.

use std::path::Path;

use crate::constants::{BACKGROUND_DIR, DEFAULT_PIC_START, GALLERY_DIR, HERO_BG_STEM, PIC_PREFIX};

/// Image extensions accepted from the local filesystem.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif"];

/// Strips every character outside `[A-Za-z0-9._-]`.
///
/// Characters are removed, never substituted, so the function is idempotent.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Extracts `N` from a `pic<N>.<ext>` filename.
///
/// Accepts a bare filename or a repository path.
#[must_use]
pub fn pic_number(name: &str) -> Option<u32> {
    let file = name.rsplit('/').next().unwrap_or(name);
    let rest = file.strip_prefix(PIC_PREFIX)?;
    let (digits, _ext) = rest.split_once('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Returns the lowercased, sanitized extension of `original`, or `fallback`.
fn extension_of(original: &str, fallback: &str) -> String {
    Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| sanitize_filename(&ext.to_ascii_lowercase()))
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Returns true if `path` looks like an image by extension.
#[must_use]
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Picks the next gallery filename.
///
/// `used` holds every name or path that has ever carried a number: current
/// draft items, live items, and paths marked for removal. `high_water` is the
/// largest number issued before; numbering starts at `pic10` when nothing has
/// been issued.
///
/// # Examples
///
/// ```
/// use lodge::services::naming::next_pic_name;
///
/// let used = ["assets/gallery/pic10.jpg"];
/// assert_eq!(next_pic_name(used, 0, "IMG_2231.JPG"), "pic11.jpg");
/// ```
pub fn next_pic_name<I, S>(used: I, high_water: u32, original: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ext = extension_of(original, "jpg");
    let max = used
        .into_iter()
        .filter_map(|name| pic_number(name.as_ref()))
        .fold(high_water.max(DEFAULT_PIC_START - 1), u32::max);

    format!("{PIC_PREFIX}{}.{ext}", max.saturating_add(1))
}

/// Name for a hero background upload: always `hero_bg.<ext>`.
#[must_use]
pub fn hero_background_name(original: &str) -> String {
    format!("{HERO_BG_STEM}.{}", extension_of(original, "webp"))
}

/// Returns true if a sanitized name is a hero background upload.
#[must_use]
pub fn is_hero_background(name: &str) -> bool {
    name.strip_prefix(HERO_BG_STEM)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Repository path an uploaded image is committed to.
#[must_use]
pub fn upload_path(safe_name: &str) -> String {
    if is_hero_background(safe_name) {
        format!("{BACKGROUND_DIR}/{safe_name}")
    } else {
        format!("{GALLERY_DIR}/{safe_name}")
    }
}
