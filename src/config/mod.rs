//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `SCHOLAR_FANOUT__` (sections and keys
//! separated by `__`).
//!
//! # Configuration File Format
//!
//! ```toml
//! [search]
//! per_source_limit = 10
//! source_timeout_secs = 15
//! dedup = false
//!
//! [api_keys]
//! semantic_scholar = "your-api-key"
//! openalex_email = "you@example.org"
//!
//! [sources]
//! enabled = "semantic-scholar,arxiv,openalex"
//! disabled = ""
//!
//! [logging]
//! level = "info"
//! format = "plain"
//! ```
//!
//! # Environment Overrides
//!
//! ```bash
//! export SCHOLAR_FANOUT__SEARCH__SOURCE_TIMEOUT_SECS=5
//! export SCHOLAR_FANOUT__SOURCES__DISABLED="arxiv"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{SourceKind, DEFAULT_PER_SOURCE_LIMIT};
use crate::utils::DedupPolicy;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SCHOLAR_FANOUT";

/// File name searched for in the working directory
pub const CONFIG_FILE_NAME: &str = "scholar-fanout.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search behavior
    #[serde(default)]
    pub search: SearchConfig,

    /// API keys for various services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Which sources take part in a search
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum records requested from each source
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,

    /// Upper bound on how long a single source may take
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,

    /// Drop cross-source duplicates after merging
    #[serde(default)]
    pub dedup: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_source_limit: default_per_source_limit(),
            source_timeout_secs: default_source_timeout_secs(),
            dedup: false,
        }
    }
}

impl SearchConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs.max(1))
    }

    pub fn dedup_policy(&self) -> DedupPolicy {
        if self.dedup {
            DedupPolicy::KeepFirst
        } else {
            DedupPolicy::Off
        }
    }
}

fn default_per_source_limit() -> usize {
    DEFAULT_PER_SOURCE_LIMIT
}

fn default_source_timeout_secs() -> u64 {
    15
}

/// API keys for external services
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default)]
    pub semantic_scholar: Option<String>,

    /// Contact email for the OpenAlex polite pool (optional)
    #[serde(default)]
    pub openalex_email: Option<String>,
}

/// Source selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Only use these sources (comma-separated ids)
    #[serde(default)]
    pub enabled: Option<String>,

    /// Never use these sources (comma-separated ids); wins over `enabled`
    #[serde(default)]
    pub disabled: Option<String>,
}

impl SourcesConfig {
    /// Sources taking part in searches, in merge order
    pub fn selected(&self) -> Vec<SourceKind> {
        let enabled = parse_source_list(self.enabled.as_deref());
        let disabled = parse_source_list(self.disabled.as_deref());

        SourceKind::ALL
            .into_iter()
            .filter(|kind| enabled.is_empty() || enabled.contains(kind))
            .filter(|kind| !disabled.contains(kind))
            .collect()
    }
}

/// Parse a comma-separated list of source ids, ignoring unknown entries
fn parse_source_list(list: Option<&str>) -> Vec<SourceKind> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|id| {
            let kind = SourceKind::from_id(id);
            if kind.is_none() {
                tracing::warn!(source = id, "ignoring unknown source id in configuration");
            }
            kind
        })
        .collect()
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = ::config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(::config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Find a configuration file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("scholar-fanout").join("config.toml"))
        .filter(|path| path.is_file())
}
