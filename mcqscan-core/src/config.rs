use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_min_options() -> usize {
    2
}

fn default_max_options() -> usize {
    6
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Text cleanup applied before segmentation
    #[serde(default)]
    pub normalization: NormalizationConfig,
    /// Acceptance gate for extracted candidates
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Question id rendering
    #[serde(default)]
    pub ids: IdConfig,
    /// Tunable weight table for parse confidence and keyword scoring
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Subject/topic labelling
    #[serde(default)]
    pub classification: ClassificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Keep newlines instead of collapsing every whitespace run to one space.
    /// Off by default: collapsing can merge adjacent questions when the
    /// document has no blank-line separation, since segmentation anchors on
    /// line starts.
    #[serde(default)]
    pub preserve_line_breaks: bool,
    /// Known OCR confusions, applied in order after whitespace cleanup
    #[serde(default = "default_ocr_corrections")]
    pub ocr_corrections: Vec<OcrCorrection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrCorrection {
    /// Regex matched against the cleaned text
    pub pattern: String,
    pub replacement: String,
}

fn default_ocr_corrections() -> Vec<OcrCorrection> {
    vec![
        OcrCorrection {
            pattern: r"(?i)0ption".to_string(),
            replacement: "Option".to_string(),
        },
        OcrCorrection {
            pattern: r"(?i)0uestion".to_string(),
            replacement: "Question".to_string(),
        },
    ]
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            preserve_line_breaks: false,
            ocr_corrections: default_ocr_corrections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum number of options for a valid MCQ
    #[serde(default = "default_min_options")]
    pub min_options: usize,
    /// Maximum number of options for a valid MCQ
    #[serde(default = "default_max_options")]
    pub max_options: usize,
    /// Shortest accepted stem, in characters
    #[serde(default = "default_min_stem_chars")]
    pub min_stem_chars: usize,
    /// Parse confidence below this drops the candidate
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

fn default_min_stem_chars() -> usize {
    5
}

fn default_min_confidence() -> f64 {
    0.1 // Low bar, favours recall
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_options: default_min_options(),
            max_options: default_max_options(),
            min_stem_chars: default_min_stem_chars(),
            min_confidence: default_min_confidence(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdConfig {
    #[serde(default = "default_id_prefix")]
    pub prefix: String,
    /// Zero-padded width of the counter ("Q007" for width 3)
    #[serde(default = "default_id_width")]
    pub width: usize,
}

fn default_id_prefix() -> String {
    "Q".to_string()
}

fn default_id_width() -> usize {
    3
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            prefix: default_id_prefix(),
            width: default_id_width(),
        }
    }
}

impl IdConfig {
    pub fn render(&self, counter: usize) -> String {
        format!("{}{:0width$}", self.prefix, counter, width = self.width)
    }
}

/// Empirically tuned weights. Bump `version` whenever a value changes so
/// stored confidences can be traced back to the table that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_scoring_version")]
    pub version: String,
    #[serde(default)]
    pub confidence: ConfidenceWeights,
    #[serde(default)]
    pub classification: ClassificationWeights,
}

fn default_scoring_version() -> String {
    "1".to_string()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            version: default_scoring_version(),
            confidence: ConfidenceWeights::default(),
            classification: ClassificationWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    /// Stem ends with '?'
    pub question_mark: f64,
    /// Stem longer than `long_stem_chars`
    pub long_stem: f64,
    pub long_stem_chars: usize,
    /// Stem contains one of `interrogatives` (case-insensitive substring)
    pub interrogative: f64,
    pub interrogatives: Vec<String>,
    /// At least `many_options_min` options
    pub many_options: f64,
    pub many_options_min: usize,
    /// Otherwise at least `some_options_min` options
    pub some_options: f64,
    pub some_options_min: usize,
    /// Mean option length above `long_option_chars`
    pub long_options: f64,
    pub long_option_chars: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            question_mark: 0.3,
            long_stem: 0.2,
            long_stem_chars: 20,
            interrogative: 0.2,
            interrogatives: ["what", "which", "how", "when", "where", "why"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            many_options: 0.2,
            many_options_min: 4,
            some_options: 0.1,
            some_options_min: 2,
            long_options: 0.1,
            long_option_chars: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationWeights {
    /// Per distinct matched keyword
    pub base: f64,
    /// Per keyword occurrence
    pub frequency: f64,
    /// Per word of each matched keyword phrase
    pub length_bonus: f64,
    /// Multiplier on occurrences per text word
    pub density: f64,
    /// Winner score divided by this gives the raw confidence
    pub normalization: f64,
}

impl Default for ClassificationWeights {
    fn default() -> Self {
        Self {
            base: 1.0,
            frequency: 0.5,
            length_bonus: 0.1,
            density: 10.0,
            normalization: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Whether parsed questions get a subject/topic label
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Keyword taxonomy resource (JSON or YAML). Built-in default when absent.
    #[serde(default)]
    pub taxonomy_path: Option<PathBuf>,
    /// Classifications below this are counted as low-certainty
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

fn default_confidence_threshold() -> f64 {
    0.3
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            taxonomy_path: None,
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl ParsingConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ParsingConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("⚠️  Failed to load config from {}: {e}, using defaults", p.display());
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.validation;
        if v.min_options == 0 || v.min_options > v.max_options {
            return Err(ConfigError::InvalidOptionBounds {
                min: v.min_options,
                max: v.max_options,
            });
        }
        if self.ids.width == 0 || self.ids.width > 12 {
            return Err(ConfigError::InvalidIdWidth(self.ids.width));
        }
        Ok(())
    }
}
