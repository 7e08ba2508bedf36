//! Property-based tests for the parsing and classification pipeline
//!
//! These tests verify invariants that should hold for all inputs:
//! - Every accepted question respects the option bounds
//! - Option texts within a question are pairwise distinct
//! - Parse and classification confidences stay within [0, 1]
//! - Validation only filters: blocks seen >= questions kept
//! - Identical input produces identical output

use mcqscan_core::{KeywordClassifier, KeywordTaxonomy, McqProcessor, ParsingConfig};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

const VOCABULARY: &[&str] = &[
    "current", "voltage", "ohm's law", "resistor", "logic gate", "AND", "entropy", "pressure",
    "what", "which", "is", "the", "of", "a", "unit", "value", "Q", "1.", "(a)", "(b)", "Ans:",
    "?", "-", "\n", "  ",
];

/// Free-form noise drawn from words the grammar reacts to
fn noisy_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCABULARY), 0..60).prop_map(|words| words.join(" "))
}

/// A numbered question with 0-8 options, sometimes repeating an option
fn question_block() -> impl Strategy<Value = String> {
    (
        1u32..200,
        "[A-Za-z ]{0,40}\\??",
        prop::collection::vec("[A-Za-z0-9 ]{0,12}", 0..8),
        any::<bool>(),
    )
        .prop_map(|(number, stem, options, answer)| {
            let mut block = format!("{number}. {stem}\n");
            for (option, label) in options.iter().zip(['a', 'b', 'c', 'd', 'A', 'B', 'C', 'D']) {
                block.push_str(&format!("({label}) {option} "));
            }
            if answer {
                block.push_str("\nAnswer: b");
            }
            block
        })
}

fn document() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::collection::vec(question_block(), 0..6).prop_map(|blocks| blocks.join("\n\n")),
        noisy_text(),
        any::<String>(),
    ]
}

// Built once: each construction compiles every built-in keyword pattern
static COLLAPSE: LazyLock<McqProcessor> =
    LazyLock::new(|| McqProcessor::new(ParsingConfig::default()).unwrap());

static MULTILINE: LazyLock<McqProcessor> = LazyLock::new(|| {
    let mut config = ParsingConfig::default();
    config.normalization.preserve_line_breaks = true;
    McqProcessor::new(config).unwrap()
});

static CLASSIFIER: LazyLock<KeywordClassifier> = LazyLock::new(|| {
    KeywordClassifier::new(
        Arc::new(KeywordTaxonomy::builtin()),
        ParsingConfig::default().scoring.classification,
    )
    .unwrap()
});

fn processors() -> [&'static McqProcessor; 2] {
    [&*COLLAPSE, &*MULTILINE]
}

proptest! {
    /// Property: accepted questions satisfy the structural invariants
    #[test]
    fn prop_accepted_questions_are_well_formed(text in document()) {
        for processor in processors() {
            let config = processor.config().validation.clone();
            let outcome = processor.process_text(&text);

            prop_assert!(outcome.blocks_seen >= outcome.questions.len());
            prop_assert_eq!(outcome.blocks_seen - outcome.blocks_rejected, outcome.questions.len());

            for question in &outcome.questions {
                prop_assert!(question.options.len() >= config.min_options);
                prop_assert!(question.options.len() <= config.max_options);
                prop_assert!(question.question_text.chars().count() >= config.min_stem_chars);
                prop_assert!((0.0..=1.0).contains(&question.confidence));

                let texts: HashSet<String> = question
                    .options
                    .iter()
                    .map(|o| o.text.trim().to_lowercase())
                    .collect();
                prop_assert_eq!(texts.len(), question.options.len());
                prop_assert!(question.subject.is_some());
            }
        }
    }

    /// Property: the pipeline is deterministic
    #[test]
    fn prop_processing_is_deterministic(text in document()) {
        let [collapse, multiline] = processors();
        prop_assert_eq!(collapse.process_text(&text).questions, collapse.process_text(&text).questions);
        prop_assert_eq!(multiline.process_text(&text).questions, multiline.process_text(&text).questions);
    }

    /// Property: classification confidence is bounded and the fallback has no keywords
    #[test]
    fn prop_classification_confidence_is_bounded(stem in noisy_text(), options in noisy_text()) {
        let result = CLASSIFIER.classify(&stem, &options);

        prop_assert!((0.0..=1.0).contains(&result.confidence));
        if result.matched_keywords.is_empty() {
            prop_assert!(result.is_fallback());
            prop_assert_eq!(result.confidence, 0.0);
        }
    }
}
