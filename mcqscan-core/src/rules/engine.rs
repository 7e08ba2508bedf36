use crate::config::ParsingConfig;
use crate::error::ConfigError;
use crate::types::{Block, Question};
use regex::Regex;
use serde::Serialize;

use super::extraction::FieldExtractor;
use super::grammar::Grammar;
use super::scoring::ConfidenceScorer;
use super::segmentation::BlockSegmenter;
use super::validation::{ValidationIssue, Validator};

// Debug configuration for pipeline tracing
#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub filter_patterns: Vec<String>,
}

impl DebugConfig {
    pub fn new(enabled: bool, filter_patterns: Vec<String>) -> Self {
        Self {
            enabled,
            filter_patterns,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            filter_patterns: Vec::new(),
        }
    }
}

/// Debug utility function to trace blocks matching the filter patterns
pub fn debug_pipeline_blocks(stage: &str, blocks: &[Block], debug_config: &DebugConfig) {
    if !debug_config.enabled || debug_config.filter_patterns.is_empty() {
        return;
    }

    let matching_blocks: Vec<_> = blocks
        .iter()
        .filter(|block| {
            debug_config.filter_patterns.iter().any(|pattern| {
                // Try regex first, fall back to simple string contains
                if let Ok(regex) = Regex::new(pattern) {
                    regex.is_match(&block.text)
                } else {
                    block.text.contains(pattern.as_str())
                }
            })
        })
        .collect();

    if !matching_blocks.is_empty() {
        tracing::info!("🔍 [{}] {} matching blocks:", stage, matching_blocks.len());
        for block in matching_blocks {
            let text_preview = if block.text.chars().count() > 50 {
                format!("{}...", block.text.chars().take(47).collect::<String>())
            } else {
                block.text.clone()
            };
            tracing::info!(
                "  Block {}: \"{}\" (bytes {}..{})",
                block.ordinal,
                text_preview,
                block.start,
                block.end
            );
        }
    }
}

/// What happened to one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BlockStatus {
    Accepted,
    Rejected { issues: Vec<ValidationIssue> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockOutcome {
    pub ordinal: usize,
    /// Id the block consumed, whether or not it survived
    pub id: String,
    #[serde(flatten)]
    pub status: BlockStatus,
}

impl BlockOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, BlockStatus::Accepted)
    }
}

/// Result of running the rules over one normalized document.
#[derive(Debug, Clone, Default)]
pub struct RuleOutput {
    pub blocks: Vec<Block>,
    pub outcomes: Vec<BlockOutcome>,
    pub questions: Vec<Question>,
}

impl RuleOutput {
    pub fn rejected_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_accepted()).count()
    }
}

/// Segment → extract → score → validate → assign ids.
pub struct RuleEngine {
    grammar: Grammar,
    debug_config: DebugConfig,
}

impl RuleEngine {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            grammar: Grammar::new()?,
            debug_config: DebugConfig::disabled(),
        })
    }

    pub fn set_debug_config(&mut self, debug_config: DebugConfig) {
        self.debug_config = debug_config;
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Never fails: a block that does not parse is dropped with its reasons
    /// recorded in `outcomes`.
    pub fn apply_rules(&self, text: &str, config: &ParsingConfig) -> RuleOutput {
        let blocks = BlockSegmenter::new(&self.grammar).segment(text);
        debug_pipeline_blocks("Segmentation", &blocks, &self.debug_config);
        tracing::debug!("📊 {} candidate blocks", blocks.len());

        let extractor = FieldExtractor::new(&self.grammar);
        let scorer = ConfidenceScorer::new(&config.scoring.confidence);
        let validator = Validator::new(&config.validation);

        let mut outcomes = Vec::with_capacity(blocks.len());
        let mut questions = Vec::new();

        for block in &blocks {
            // Ids count every emitted block, so rejected blocks leave gaps
            let id = config.ids.render(block.ordinal);

            let status = match extractor.extract(&block.text) {
                None => BlockStatus::Rejected {
                    issues: vec![ValidationIssue::MissingQuestionText],
                },
                Some(candidate) => {
                    let confidence =
                        scorer.score(&candidate.question_text, &candidate.options);
                    let issues = validator.validate(&candidate, confidence);
                    if issues.is_empty() {
                        tracing::debug!("   ✅ {} accepted (confidence {:.2})", id, confidence);
                        questions.push(Question::from_candidate(candidate, id.clone(), confidence));
                        BlockStatus::Accepted
                    } else {
                        BlockStatus::Rejected { issues }
                    }
                }
            };

            if let BlockStatus::Rejected { issues } = &status {
                Validator::log_report(block.ordinal, issues);
            }

            outcomes.push(BlockOutcome {
                ordinal: block.ordinal,
                id,
                status,
            });
        }

        let output = RuleOutput {
            blocks,
            outcomes,
            questions,
        };
        tracing::info!(
            "📝 {} questions from {} blocks ({} rejected)",
            output.questions.len(),
            output.blocks.len(),
            output.rejected_count()
        );
        output
    }
}
