use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ===== QUESTION RECORD TYPES =====

/// One labelled answer choice. Labels are canonicalized to lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqOption {
    pub label: char,
    pub text: String,
}

impl McqOption {
    pub fn new(label: char, text: impl Into<String>) -> Self {
        Self {
            label: label.to_ascii_lowercase(),
            text: text.into(),
        }
    }
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable per-run sequence token, e.g. "Q007"
    pub id: String,
    pub question_text: String,
    pub options: Vec<McqOption>,
    /// Answer key as printed in the block. Not checked against `options`.
    pub correct_answer: Option<char>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    /// Parse confidence, blended with classification confidence once classified
    pub confidence: f64,
    /// Reserved; segmentation does not track pages
    pub page_number: Option<u32>,
}

impl Question {
    pub fn from_candidate(candidate: QuestionCandidate, id: String, confidence: f64) -> Self {
        Self {
            id,
            question_text: candidate.question_text,
            options: candidate.options,
            correct_answer: candidate.correct_answer,
            subject: None,
            topic: None,
            confidence,
            page_number: None,
        }
    }

    /// Option texts joined with single spaces, as fed to the classifier
    pub fn options_text(&self) -> String {
        self.options
            .iter()
            .map(|option| option.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_classified(&self) -> bool {
        self.subject.is_some()
    }

    /// Label the question and blend confidences. A question is classified at
    /// most once; later calls leave it untouched and return false.
    pub fn apply_classification(&mut self, result: &ClassificationResult) -> bool {
        if self.is_classified() {
            tracing::debug!("{} already classified, keeping {:?}", self.id, self.subject);
            return false;
        }
        self.subject = Some(result.subject.clone());
        self.topic = Some(result.topic.clone());
        self.confidence = (self.confidence + result.confidence) / 2.0;
        true
    }
}

/// Fields pulled from one block before scoring, validation and id assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionCandidate {
    pub question_text: String,
    pub options: Vec<McqOption>,
    pub correct_answer: Option<char>,
}

// ===== SEGMENTATION TYPES =====

/// A trimmed span of normalized text believed to hold one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position among emitted blocks; drives id assignment
    pub ordinal: usize,
    /// Byte offsets into the normalized text
    pub start: usize,
    pub end: usize,
    pub text: String,
}

// ===== CLASSIFICATION TYPES =====

pub const FALLBACK_SUBJECT: &str = "General";
pub const FALLBACK_TOPIC: &str = "Miscellaneous";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub subject: String,
    pub topic: String,
    pub confidence: f64,
    /// Taxonomy surface forms of the keywords that matched the winner
    pub matched_keywords: BTreeSet<String>,
}

impl ClassificationResult {
    /// Result used when nothing matches or classification faults
    pub fn fallback() -> Self {
        Self {
            subject: FALLBACK_SUBJECT.to_string(),
            topic: FALLBACK_TOPIC.to_string(),
            confidence: 0.0,
            matched_keywords: BTreeSet::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.subject == FALLBACK_SUBJECT
            && self.topic == FALLBACK_TOPIC
            && self.matched_keywords.is_empty()
    }
}
