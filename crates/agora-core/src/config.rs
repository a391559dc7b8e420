//! Configuration for the visibility core
//!
//! Configuration is layered: defaults, then an optional TOML file, then
//! `AGORA_*` environment variables, then validation. Every section uses
//! `#[serde(default)]` so partial files are accepted.

use crate::errors::{AgoraError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "AGORA_";

/// What decoding does with a stored visibility mode it does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownVisibilityPolicy {
    /// Reject the document as malformed
    #[default]
    Reject,
    /// Legacy fail-open behavior: treat as public
    TreatAsPublic,
}

/// Feed assembly settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Page size used when the caller does not pass one
    pub default_page_size: usize,
    /// Largest page size a caller may request
    pub max_page_size: usize,
    /// Candidate window is `page_size * overfetch_factor`; at least 2
    pub overfetch_factor: usize,
    /// Read further windows when a cursor page comes back short
    pub retry_short_pages: bool,
    /// Upper bound on candidate windows read per call
    pub max_fetch_rounds: usize,
    /// Handling of unrecognized visibility modes
    pub unknown_visibility: UnknownVisibilityPolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            overfetch_factor: 3,
            retry_short_pages: true,
            max_fetch_rounds: 3,
            unknown_visibility: UnknownVisibilityPolicy::Reject,
        }
    }
}

impl FeedConfig {
    /// Candidate window for a requested page size.
    pub fn window_for(&self, page_size: usize) -> usize {
        page_size.saturating_mul(self.overfetch_factor)
    }
}

/// Story lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Seconds between creation and expiry
    pub ttl_secs: u64,
    /// Longest emoji string accepted for a reaction, in chars
    pub max_emoji_len: usize,
}

impl StoryConfig {
    /// Stories expire 24 hours after creation.
    pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            ttl_secs: Self::DEFAULT_TTL_SECS,
            max_emoji_len: 16,
        }
    }
}

/// Logging settings consumed by binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgoraConfig {
    /// Feed assembly
    pub feed: FeedConfig,
    /// Story lifecycle
    pub stories: StoryConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl AgoraConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AgoraError::validation(format!("Invalid TOML: {e}")))
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgoraError::internal(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when it exists, otherwise start from defaults; then
    /// apply the process environment and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from_file(path)?,
            _ => Self::default(),
        };
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_env_vars(std::env::vars())
    }

    /// Merge with an explicit set of `AGORA_*` variables.
    pub fn merge_env_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match name {
                "FEED_DEFAULT_PAGE_SIZE" => {
                    self.feed.default_page_size = parse_env(name, value)?;
                }
                "FEED_MAX_PAGE_SIZE" => self.feed.max_page_size = parse_env(name, value)?,
                "FEED_OVERFETCH_FACTOR" => self.feed.overfetch_factor = parse_env(name, value)?,
                "FEED_MAX_FETCH_ROUNDS" => self.feed.max_fetch_rounds = parse_env(name, value)?,
                "FEED_RETRY_SHORT_PAGES" => self.feed.retry_short_pages = parse_env(name, value)?,
                "STORY_TTL_SECS" => self.stories.ttl_secs = parse_env(name, value)?,
                "LOG_LEVEL" => self.logging.level = value.to_string(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.feed.overfetch_factor < 2 {
            return Err(AgoraError::validation(
                "feed.overfetch_factor must be at least 2",
            ));
        }
        if self.feed.max_page_size == 0 {
            return Err(AgoraError::validation("feed.max_page_size must be positive"));
        }
        if self.feed.default_page_size == 0
            || self.feed.default_page_size > self.feed.max_page_size
        {
            return Err(AgoraError::validation(
                "feed.default_page_size must be within 1..=max_page_size",
            ));
        }
        if self.feed.max_fetch_rounds == 0 {
            return Err(AgoraError::validation(
                "feed.max_fetch_rounds must be at least 1",
            ));
        }
        if self.stories.ttl_secs == 0 {
            return Err(AgoraError::validation("stories.ttl_secs must be positive"));
        }
        if self.stories.max_emoji_len == 0 {
            return Err(AgoraError::validation(
                "stories.max_emoji_len must be positive",
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AgoraError::validation(format!("{ENV_PREFIX}{name}: cannot parse `{value}`")))
}
