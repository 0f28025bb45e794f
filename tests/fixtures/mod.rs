//! Shared test fixtures for integration tests.
#![allow(dead_code)] // Not every test binary uses every fixture

#[cfg(feature = "web")]
pub mod fake_github;

use lodge::config::{GitHubSettings, ServerConfig};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// PIN used by every test server.
pub const TEST_PIN: &str = "4321";

/// A live content document with two gallery photos and one package.
pub fn sample_content() -> Value {
    json!({
        "brand": { "name": "LODGE" },
        "hero": {
            "title": "Quiet light",
            "subtitle": "Portraits and landscapes",
            "ctaPrimary": { "label": "See work", "href": "#work" },
            "ctaSecondary": { "label": "Packages", "href": "#packages" },
            "bgImage": "assets/background/hero_bg.webp"
        },
        "packages": [
            {
                "name": "Portrait",
                "price": "£120",
                "detail": "One hour on location",
                "features": ["10 edited photos", "Online gallery"],
                "badge": "",
                "featured": false
            }
        ],
        "gallery": {
            "items": [
                { "src": "assets/gallery/pic10.jpg", "alt": "Lake at dawn" },
                { "src": "assets/gallery/pic11.jpg", "alt": "Fog" }
            ]
        },
        "footer": { "note": "kept as-is" }
    })
}

/// Writes the sample content to `dir/content.json` and returns its path.
pub fn write_sample_content(dir: &Path) -> PathBuf {
    let path = dir.join("content.json");
    fs::write(&path, serde_json::to_string_pretty(&sample_content()).unwrap())
        .expect("Failed to write sample content");
    path
}

/// Writes a small fake image file.
pub fn write_image(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("Failed to write image");
    path
}

/// Server configuration with every value set, pointing at `api_url`.
pub fn server_config(api_url: &str) -> ServerConfig {
    ServerConfig {
        admin_pin: Some(TEST_PIN.to_string()),
        github: GitHubSettings {
            token: Some("test-token".to_string()),
            owner: Some("lodge".to_string()),
            repo: Some("site".to_string()),
            branch: "main".to_string(),
            api_url: api_url.to_string(),
        },
    }
}
