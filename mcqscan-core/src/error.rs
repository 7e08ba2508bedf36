use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a `ParsingConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid option bounds: min_options={min}, max_options={max}")]
    InvalidOptionBounds { min: usize, max: usize },

    #[error("id width must be between 1 and 12, got {0}")]
    InvalidIdWidth(usize),
}

/// Errors raised while reading, parsing or writing a keyword taxonomy.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to access taxonomy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid taxonomy JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid taxonomy YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("taxonomy contains no keywords")]
    Empty,
}

/// Internal classifier faults. Construction errors surface to the caller,
/// scoring errors are swallowed by the fail-open path.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("keyword '{keyword}' could not be compiled: {source}")]
    KeywordPattern {
        keyword: String,
        #[source]
        source: regex::Error,
    },

    #[error("non-finite score for {subject}/{topic}")]
    NonFiniteScore { subject: String, topic: String },
}

#[derive(Debug, Error)]
pub enum McqError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("failed to serialize for fingerprinting: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, McqError>;
