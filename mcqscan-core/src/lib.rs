// mcqscan Core Library
//
// Turns noisy extracted document text into validated multiple-choice
// questions and labels each one with a subject/topic from a keyword taxonomy.

pub mod analytics;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod preprocessors;
pub mod processor;
pub mod rules;
pub mod taxonomy;
pub mod types;

// Re-export main types and functions for easy use
pub use analytics::QuestionSummary;
pub use classifier::{ClassifierHandle, KeywordClassifier};
pub use config::ParsingConfig;
pub use error::{ClassifierError, ConfigError, McqError, Result, TaxonomyError};
pub use preprocessors::{Preprocessor, TextNormalizer};
pub use processor::{McqProcessor, PipelineStages, ProcessingOutcome, StepProfiler};
pub use rules::{DebugConfig, RuleEngine};
pub use taxonomy::{KeywordTaxonomy, TaxonomyStats};
pub use types::*;
