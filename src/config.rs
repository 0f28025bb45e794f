//! Configuration management for the application.
//!
//! Two layers live here:
//!
//! - [`ServerConfig`]: secrets and repository coordinates for the publish
//!   endpoint, read from the process environment.
//! - [`Config`]: operator settings for the CLI, stored as TOML in the
//!   platform config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::constants::{CONTENT_PATH, DEFAULT_BRANCH, DEFAULT_GITHUB_API_URL};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "LODGE_CONFIG_DIR";

// ============================================================================
// Server configuration (environment)
// ============================================================================

/// Git hosting settings for the publish endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    /// Access token with contents write permission.
    pub token: Option<String>,
    /// Repository owner.
    pub owner: Option<String>,
    /// Repository name.
    pub repo: Option<String>,
    /// Branch to publish to.
    pub branch: String,
    /// API base URL.
    pub api_url: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo: None,
            branch: DEFAULT_BRANCH.to_string(),
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
        }
    }
}

/// Complete repository coordinates, available only when every required
/// setting is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    /// Access token.
    pub token: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch to publish to.
    pub branch: String,
    /// API base URL without a trailing slash.
    pub api_url: String,
}

impl GitHubSettings {
    /// Returns the repository target if token, owner and repo are all set.
    #[must_use]
    pub fn target(&self) -> Option<RepoTarget> {
        Some(RepoTarget {
            token: self.token.clone()?,
            owner: self.owner.clone()?,
            repo: self.repo.clone()?,
            branch: self.branch.clone(),
            api_url: self.api_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Publish endpoint configuration.
///
/// Values are read once at startup; whether they are present is checked per
/// request so a misconfigured server still answers with a clear error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// PIN the operator must supply.
    pub admin_pin: Option<String>,
    /// Repository settings.
    pub github: GitHubSettings,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            admin_pin: get("ADMIN_PIN"),
            github: GitHubSettings {
                token: get("GITHUB_TOKEN"),
                owner: get("GITHUB_OWNER"),
                repo: get("GITHUB_REPO"),
                branch: get("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
                api_url: get("GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            },
        }
    }
}

// ============================================================================
// Operator configuration (TOML)
// ============================================================================

/// Where the CLI reads and publishes content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// URL or file path of the live `data/content.json`.
    #[serde(default = "default_live_content")]
    pub live_content: String,
    /// Publish endpoint URL.
    #[serde(default = "default_publish_url")]
    pub publish_url: String,
}

fn default_live_content() -> String {
    CONTENT_PATH.to_string()
}

fn default_publish_url() -> String {
    "http://127.0.0.1:3000/api/publish".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            live_content: default_live_content(),
            publish_url: default_publish_url(),
        }
    }
}

/// Operator configuration.
///
/// # File Location
///
/// - `$LODGE_CONFIG_DIR/config.toml` when the variable is set
/// - Linux: `~/.config/lodge/config.toml`
/// - macOS: `~/Library/Application Support/lodge/config.toml`
/// - Windows: `%APPDATA%\lodge\config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Site locations.
    #[serde(default)]
    pub site: SiteConfig,
}

impl Config {
    /// Gets the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("lodge");

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Gets the path of the persisted editor draft.
    pub fn draft_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("draft.json"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.validate()?;

        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let config_path = Self::config_file_path()?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, &config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - `live_content` is not empty
    /// - `publish_url` is an http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.site.live_content.trim().is_empty() {
            anyhow::bail!("site.live_content must not be empty");
        }

        let url = self.site.publish_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!(
                "site.publish_url must start with http:// or https:// (got '{}')",
                url
            );
        }

        Ok(())
    }
}
