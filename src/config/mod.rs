//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `PLAGIARISM_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_EMBED_TIMEOUT_MS, DEFAULT_INDEX_CAPACITY, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MAX_EXACT_SCAN_WORDS, DEFAULT_MIN_MATCH_CHARS, DEFAULT_THRESHOLD,
};
use crate::detector::DetectorConfig;
use crate::embedding::SentenceEmbedderConfig;
use crate::index::IndexConfig;

/// Default directory of the on-disk corpus.
pub const DEFAULT_CORPUS_PATH: &str = "./.corpus";

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `PLAGIARISM_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Sentence model directory. `None` selects the stub embedder.
    pub model_path: Option<PathBuf>,

    /// Directory of the disk corpus. Default: `./.corpus`.
    pub corpus_path: PathBuf,

    /// Default similarity threshold for checks. Default: `0.7`.
    pub threshold: f32,

    /// Char floor for exact runs. Default: `50`.
    pub min_match_chars: usize,

    /// Corpus documents scanned concurrently per check. Default: `4`.
    pub max_concurrency: usize,

    /// Deadline for one embedding call. Default: 30s.
    pub embed_timeout: Duration,

    /// Max documents kept in the corpus index. Default: `10_000`.
    pub index_capacity: u64,

    /// Documents above this word count skip the exact scan. Default: `20_000`.
    pub max_exact_scan_words: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: None,
            corpus_path: PathBuf::from(DEFAULT_CORPUS_PATH),
            threshold: DEFAULT_THRESHOLD,
            min_match_chars: DEFAULT_MIN_MATCH_CHARS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            embed_timeout: Duration::from_millis(DEFAULT_EMBED_TIMEOUT_MS),
            index_capacity: DEFAULT_INDEX_CAPACITY,
            max_exact_scan_words: DEFAULT_MAX_EXACT_SCAN_WORDS,
        }
    }
}

impl Config {
    pub const ENV_MODEL_PATH: &'static str = "PLAGIARISM_MODEL_PATH";
    pub const ENV_CORPUS_PATH: &'static str = "PLAGIARISM_CORPUS_PATH";
    pub const ENV_THRESHOLD: &'static str = "PLAGIARISM_THRESHOLD";
    pub const ENV_MIN_MATCH_CHARS: &'static str = "PLAGIARISM_MIN_MATCH_CHARS";
    pub const ENV_MAX_CONCURRENCY: &'static str = "PLAGIARISM_MAX_CONCURRENCY";
    pub const ENV_EMBED_TIMEOUT_MS: &'static str = "PLAGIARISM_EMBED_TIMEOUT_MS";
    pub const ENV_INDEX_CAPACITY: &'static str = "PLAGIARISM_INDEX_CAPACITY";
    pub const ENV_MAX_EXACT_SCAN_WORDS: &'static str = "PLAGIARISM_MAX_EXACT_SCAN_WORDS";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Values that fail to parse are errors; range checks are left to [`Config::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let model_path = Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH);
        let corpus_path = Self::parse_path_from_env(Self::ENV_CORPUS_PATH, defaults.corpus_path);
        let threshold = Self::parse_from_env(Self::ENV_THRESHOLD, defaults.threshold)?;
        let min_match_chars =
            Self::parse_from_env(Self::ENV_MIN_MATCH_CHARS, defaults.min_match_chars)?;
        let max_concurrency =
            Self::parse_from_env(Self::ENV_MAX_CONCURRENCY, defaults.max_concurrency)?;
        let embed_timeout_ms = Self::parse_from_env(
            Self::ENV_EMBED_TIMEOUT_MS,
            u64::try_from(defaults.embed_timeout.as_millis()).unwrap_or(DEFAULT_EMBED_TIMEOUT_MS),
        )?;
        let index_capacity =
            Self::parse_from_env(Self::ENV_INDEX_CAPACITY, defaults.index_capacity)?;
        let max_exact_scan_words =
            Self::parse_from_env(Self::ENV_MAX_EXACT_SCAN_WORDS, defaults.max_exact_scan_words)?;

        Ok(Self {
            model_path,
            corpus_path,
            threshold,
            min_match_chars,
            max_concurrency,
            embed_timeout: Duration::from_millis(embed_timeout_ms),
            index_capacity,
            max_exact_scan_words,
        })
    }

    /// Validates ranges and paths (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_THRESHOLD,
                reason: format!("{} is not within [0, 1]", self.threshold),
            });
        }
        if self.min_match_chars == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MIN_MATCH_CHARS,
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MAX_CONCURRENCY,
                reason: "must be at least 1".to_string(),
            });
        }
        if self.embed_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_EMBED_TIMEOUT_MS,
                reason: "must be at least 1ms".to_string(),
            });
        }
        if self.index_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_INDEX_CAPACITY,
                reason: "must be at least 1".to_string(),
            });
        }

        if self.corpus_path.exists() && !self.corpus_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.corpus_path.clone(),
            });
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Settings for the check pipeline.
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            min_match_chars: self.min_match_chars,
            max_concurrency: self.max_concurrency,
            embed_timeout: self.embed_timeout,
            max_exact_scan_words: self.max_exact_scan_words,
        }
    }

    /// Settings for the corpus index.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            capacity: self.index_capacity,
            embed_timeout: self.embed_timeout,
        }
    }

    /// Sentence embedder settings: the model directory, or stub mode when none is set.
    pub fn embedder_config(&self) -> SentenceEmbedderConfig {
        match self.model_path {
            Some(ref dir) => SentenceEmbedderConfig::new(dir.clone()),
            None => SentenceEmbedderConfig::stub(),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        Self::parse_optional_path_from_env(var_name).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: var_name,
                value: value.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    }
}
