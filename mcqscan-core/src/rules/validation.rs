use crate::config::ValidationConfig;
use crate::types::QuestionCandidate;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

// Validator - acceptance gate between extraction and id assignment
pub struct Validator<'a> {
    config: &'a ValidationConfig,
}

/// Why a block did not become a question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ValidationIssue {
    MissingQuestionText,
    StemTooShort {
        chars: usize,
        min: usize,
    },
    OptionCountOutOfRange {
        count: usize,
        min: usize,
        max: usize,
    },
    DuplicateOptionText {
        text: String,
    },
    DuplicateLabel {
        label: char,
    },
    LowConfidence {
        confidence: f64,
        min: f64,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingQuestionText => write!(f, "no question text"),
            ValidationIssue::StemTooShort { chars, min } => {
                write!(f, "stem has {chars} chars (< {min})")
            }
            ValidationIssue::OptionCountOutOfRange { count, min, max } => {
                write!(f, "{count} options outside [{min}, {max}]")
            }
            ValidationIssue::DuplicateOptionText { text } => {
                write!(f, "duplicate option text \"{text}\"")
            }
            ValidationIssue::DuplicateLabel { label } => write!(f, "duplicate label ({label})"),
            ValidationIssue::LowConfidence { confidence, min } => {
                write!(f, "confidence {confidence:.2} below {min:.2}")
            }
        }
    }
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config }
    }

    /// Every failed check for the candidate. Empty means accepted.
    pub fn validate(&self, candidate: &QuestionCandidate, confidence: f64) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let chars = candidate.question_text.trim().chars().count();
        if chars == 0 {
            issues.push(ValidationIssue::MissingQuestionText);
        } else if chars < self.config.min_stem_chars {
            issues.push(ValidationIssue::StemTooShort {
                chars,
                min: self.config.min_stem_chars,
            });
        }

        let count = candidate.options.len();
        if count < self.config.min_options || count > self.config.max_options {
            issues.push(ValidationIssue::OptionCountOutOfRange {
                count,
                min: self.config.min_options,
                max: self.config.max_options,
            });
        }

        self.check_duplicates(candidate, &mut issues);

        if confidence < self.config.min_confidence {
            issues.push(ValidationIssue::LowConfidence {
                confidence,
                min: self.config.min_confidence,
            });
        }

        issues
    }

    fn check_duplicates(&self, candidate: &QuestionCandidate, issues: &mut Vec<ValidationIssue>) {
        let mut seen_texts = HashSet::new();
        let mut seen_labels = HashSet::new();

        for option in &candidate.options {
            let key = option.text.trim().to_lowercase();
            if !seen_texts.insert(key.clone()) {
                issues.push(ValidationIssue::DuplicateOptionText { text: key });
            }
            let label = option.label.to_ascii_lowercase();
            if !seen_labels.insert(label) {
                issues.push(ValidationIssue::DuplicateLabel { label });
            }
        }
    }

    /// Log a rejected block's issues
    pub fn log_report(block_ordinal: usize, issues: &[ValidationIssue]) {
        if issues.is_empty() {
            return;
        }
        tracing::debug!("   ⚠️  Block {} rejected ({} issues):", block_ordinal, issues.len());
        for issue in issues {
            tracing::debug!("      🤔 {issue}");
        }
    }
}
