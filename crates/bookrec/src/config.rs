//! Configuration handling for bookrec.

use anyhow::{Context, Result};
use bookrec_core::SelfMatch;
use bookrec_store::ArtifactFiles;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Artifact location
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Ranking defaults
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Fuzzy matching
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Tag lookup
    #[serde(default)]
    pub tags: TagsConfig,

    /// Top rated by year
    #[serde(default)]
    pub year: YearConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from the default config path, falling back to defaults when no
    /// file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path`, or from the default config path when `None`.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let explicit = path.is_some();
        let Some(path) = path.or_else(Self::config_path) else {
            return Ok(Self::default());
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Parse a TOML document.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Default config file location.
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Artifact directory: configured, else `<data dir>/artifacts`.
    pub fn artifact_dir(&self) -> Option<PathBuf> {
        self.artifacts
            .dir
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("artifacts")))
    }

    /// Sample configuration file with every default spelled out.
    pub fn sample_toml() -> &'static str {
        r#"# bookrec configuration

[artifacts]
# Directory holding the exported artifacts
# (default: <data dir>/artifacts)
# dir = "/var/lib/bookrec/artifacts"

[artifacts.files]
books = "books.json"
book_tags = "book_tags.json"
tags = "tags.json"
row_index = "row_index.json"
cbf_matrix = "cbf_matrix.json"
cf_matrix = "cf_matrix.json"

[ranking]
# 1.0 = content-based only, 0.0 = collaborative only
default_weight = 0.7
default_count = 5
max_count = 20
# Drop the query book from its own recommendations
exclude_query = false

[matching]
threshold = 70.0
suggestion_limit = 10

[tags]
max_tags = 10

[year]
limit = 5

[logging]
level = "info"
# file = "/tmp/bookrec.log"
"#
    }
}

/// Artifact-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArtifactsConfig {
    /// Artifact directory
    pub dir: Option<PathBuf>,

    /// File names within the directory
    #[serde(default)]
    pub files: ArtifactFiles,
}

/// Ranking-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Hybrid weight when none is given
    #[serde(default = "default_weight")]
    pub default_weight: f32,

    /// Result count when none is given
    #[serde(default = "default_count")]
    pub default_count: usize,

    /// Upper clamp for the result count
    #[serde(default = "default_max_count")]
    pub max_count: usize,

    /// Drop the query book from its own results
    #[serde(default)]
    pub exclude_query: bool,
}

fn default_weight() -> f32 {
    0.7
}

fn default_count() -> usize {
    5
}

fn default_max_count() -> usize {
    20
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_weight: default_weight(),
            default_count: default_count(),
            max_count: default_max_count(),
            exclude_query: false,
        }
    }
}

impl RankingConfig {
    /// Clamp a requested count to `[1, max_count]`.
    pub fn clamp_count(&self, n: usize) -> usize {
        n.clamp(1, self.max_count.max(1))
    }

    /// Self-inclusion policy.
    pub fn self_match(&self) -> SelfMatch {
        if self.exclude_query {
            SelfMatch::Exclude
        } else {
            SelfMatch::Keep
        }
    }
}

/// Fuzzy matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum score for a confident match
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Maximum number of title suggestions
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

fn default_threshold() -> f64 {
    bookrec_query::DEFAULT_THRESHOLD
}

fn default_suggestion_limit() -> usize {
    bookrec_query::DEFAULT_SUGGESTION_LIMIT
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

/// Tag lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Exclusive upper bound on tag positions
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
}

fn default_max_tags() -> usize {
    bookrec_query::DEFAULT_MAX_TAGS
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            max_tags: default_max_tags(),
        }
    }
}

/// Top-rated-by-year configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearConfig {
    /// Rows per year
    #[serde(default = "default_year_limit")]
    pub limit: usize,
}

fn default_year_limit() -> usize {
    bookrec_query::DEFAULT_YEAR_LIMIT
}

impl Default for YearConfig {
    fn default() -> Self {
        Self {
            limit: default_year_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional)
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "bookrec")
}

/// Get the XDG data directory for bookrec.
pub fn data_dir() -> Option<PathBuf> {
    env_dir("BOOKREC_DATA_DIR").or_else(|| project_dirs().map(|d| d.data_dir().to_path_buf()))
}

/// Get the XDG config directory for bookrec.
pub fn config_dir() -> Option<PathBuf> {
    env_dir("BOOKREC_CONFIG_DIR")
        .or_else(|| project_dirs().map(|d| d.config_dir().to_path_buf()))
}
