//! Configuration management for reviewbot
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REVIEWBOT_*)
//! 3. Config file (`--config` or ~/.config/reviewbot/config.toml)
//! 4. Default values
//!
//! Credentials never live here, see [`crate::Secrets`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Default chat message budget, below Discord's 2000/4096 character ceilings
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 1900;

/// Longest embed description Discord accepts
pub const MESSAGE_LEN_LIMIT: usize = 4096;

/// GitHub access settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL
    pub api_url: String,

    /// Timeout for each GitHub call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Language-model settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Gemini model name
    pub model: String,

    /// Generative language API base URL
    pub api_url: String,

    /// Timeout for the generation call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            api_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Chat webhook settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Display name of the bot in the channel
    pub username: String,

    /// Embed accent color (0xRRGGBB)
    pub color: u32,

    /// Maximum characters per message body
    pub max_message_len: usize,

    /// Timeout for each webhook post
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            username: "AI 코드 리뷰 봇".to_string(),
            color: 0x7289DA,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Additions to the built-in resource tables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Extra extensions (without the dot) to treat as resource files
    pub extra_extensions: Vec<String>,

    /// Extra path prefixes to treat as resource directories
    pub extra_directories: Vec<String>,
}

/// Pull-request handling policy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PullRequestConfig {
    /// Run pull-request diffs through the resource filter
    pub filter_diff: bool,
}

impl Default for PullRequestConfig {
    fn default() -> Self {
        Self { filter_diff: true }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub review: ReviewConfig,
    pub notify: NotifyConfig,
    pub resources: ResourcesConfig,
    pub pull_request: PullRequestConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(config.validated())
    }

    /// Defaults with environment and CLI overrides, for when no file can be used
    pub fn fallback(model: Option<String>) -> Self {
        Self::default()
            .with_env_overrides()
            .with_cli_overrides(model)
            .validated()
    }

    /// Bring out-of-range values back within what the chat platform accepts
    pub fn validated(mut self) -> Self {
        let len = self.notify.max_message_len;
        if len == 0 {
            warn!(default = DEFAULT_MAX_MESSAGE_LEN, "notify.max_message_len is 0, using default");
            self.notify.max_message_len = DEFAULT_MAX_MESSAGE_LEN;
        } else if len > MESSAGE_LEN_LIMIT {
            warn!(
                value = len,
                limit = MESSAGE_LEN_LIMIT,
                "notify.max_message_len exceeds the platform limit, capping"
            );
            self.notify.max_message_len = MESSAGE_LEN_LIMIT;
        }

        self
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/reviewbot/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reviewbot").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REVIEWBOT_MODEL: Gemini model name
    /// - REVIEWBOT_MAX_MESSAGE_LEN: characters per chat message
    /// - REVIEWBOT_GITHUB_API_URL: GitHub REST base URL (GitHub Enterprise)
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup("REVIEWBOT_MODEL") {
            self.review.model = model;
        }

        if let Some(raw) = lookup("REVIEWBOT_MAX_MESSAGE_LEN") {
            match raw.trim().parse::<usize>() {
                Ok(len) if len > 0 => self.notify.max_message_len = len,
                _ => warn!(value = %raw, "Ignoring invalid REVIEWBOT_MAX_MESSAGE_LEN"),
            }
        }

        if let Some(url) = lookup("REVIEWBOT_GITHUB_API_URL") {
            self.github.api_url = url;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, model: Option<String>) -> Self {
        if let Some(m) = model {
            self.review.model = m;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. An explicit `path` must exist.
    pub fn load_with_overrides(path: Option<&Path>, model: Option<String>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::load_from_file(p)?,
            None => Self::load()?,
        };

        Ok(base.with_env_overrides().with_cli_overrides(model).validated())
    }
}
