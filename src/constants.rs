//! Application-wide constants.
//!
//! This module defines the repository layout the site is published into and
//! the defaults the editor falls back to.

/// The display name of the application.
pub const APP_NAME: &str = "Lodge";

/// The binary name of the operator CLI (used in command examples).
pub const APP_BINARY_NAME: &str = "lodge";

/// User-Agent sent to the Git hosting API.
pub const USER_AGENT: &str = "lodge-publisher";

/// Repository path of the content document.
pub const CONTENT_PATH: &str = "data/content.json";

/// Repository directory for operator-uploaded gallery photos.
pub const GALLERY_DIR: &str = "assets/gallery";

/// Repository directory for the hero background image.
pub const BACKGROUND_DIR: &str = "assets/background";

/// Filename prefix for gallery uploads (`pic<N>.<ext>`).
pub const PIC_PREFIX: &str = "pic";

/// First number issued when no `pic<N>` names exist yet.
pub const DEFAULT_PIC_START: u32 = 10;

/// Stem of the hero background upload (`hero_bg.<ext>`).
pub const HERO_BG_STEM: &str = "hero_bg";

/// Maximum number of items the draft gallery holds.
pub const MAX_GALLERY_ITEMS: usize = 100;

/// Number of gallery items shown on the home page.
pub const HOME_GALLERY_LIMIT: usize = 6;

/// Alt text used when a gallery item has none.
pub const DEFAULT_ALT: &str = "Lodge photo";

/// Alt text sent with the hero background upload.
pub const HERO_BG_ALT: &str = "Hero background";

/// Fallback href for the primary call to action.
pub const DEFAULT_PRIMARY_HREF: &str = "#work";

/// Fallback href for the secondary call to action.
pub const DEFAULT_SECONDARY_HREF: &str = "#packages";

/// Largest request body `/api/publish` accepts (content plus base64 images).
pub const MAX_PUBLISH_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Default branch when `GITHUB_BRANCH` is unset.
pub const DEFAULT_BRANCH: &str = "main";

/// Default Git hosting API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
