// Main rules module - delegates to semantic sub-modules
// - grammar.rs: enumerated match rules (question numbers, options, answer keys)
// - segmentation.rs: BlockSegmenter
// - extraction.rs: FieldExtractor
// - scoring.rs: ConfidenceScorer
// - validation.rs: Validator and ValidationIssue
// - engine.rs: RuleEngine wiring the stages together

pub mod engine;
pub mod extraction;
pub mod grammar;
pub mod scoring;
pub mod segmentation;
pub mod validation;

pub use engine::*;
pub use extraction::FieldExtractor;
pub use grammar::{Grammar, QuestionNumberForm, SplitRule};
pub use scoring::ConfidenceScorer;
pub use segmentation::BlockSegmenter;
pub use validation::{ValidationIssue, Validator};
