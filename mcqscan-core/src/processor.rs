use crate::classifier::{ClassifierHandle, KeywordClassifier};
use crate::config::ParsingConfig;
use crate::error::{ClassifierError, Result};
use crate::fingerprint::{calculate_config_hash, calculate_text_hash};
use crate::preprocessors::{Preprocessor, TextNormalizer};
use crate::rules::{BlockOutcome, DebugConfig, RuleEngine};
use crate::taxonomy::KeywordTaxonomy;
use crate::types::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics to inspect each stage boundary
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStages {
    pub source_fingerprint: String,
    pub config_fingerprint: String,
    pub taxonomy_fingerprint: String,
    pub normalized_text: String,
    pub blocks: Vec<Block>,
    pub outcomes: Vec<BlockOutcome>,
    /// Validated questions before classification
    pub parsed_questions: Vec<Question>,
    pub questions: Vec<Question>,
}

/// Questions plus the counters a caller needs to tell "nothing found" from
/// "everything rejected".
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingOutcome {
    pub questions: Vec<Question>,
    pub blocks_seen: usize,
    pub blocks_rejected: usize,
    /// Classified below `classification.confidence_threshold`
    pub low_confidence_classifications: usize,
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        tracing::info!("⏱️  {}: {:.3}ms", step_name, elapsed.as_secs_f64() * 1000.0);

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        tracing::info!("📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            tracing::info!(
                "   {:.<35} {:.3}ms ({:.1}%)",
                step,
                duration.as_secs_f64() * 1000.0,
                percentage
            );
        }
        tracing::info!("   {:.<35} {:.3}ms", "Total", total.as_secs_f64() * 1000.0);
    }
}

/// Raw text → validated, classified questions.
///
/// Processing never fails; only construction does. The processor holds no
/// per-document state, so one instance can serve many threads.
pub struct McqProcessor {
    preprocessor: Box<dyn Preprocessor>,
    rule_engine: RuleEngine,
    classifier: ClassifierHandle,
    config: ParsingConfig,
}

impl McqProcessor {
    /// Build from config, loading the taxonomy named there (or the built-in one).
    pub fn new(config: ParsingConfig) -> Result<Self> {
        config.validate()?;
        let preprocessor = Box::new(TextNormalizer::new(&config.normalization)?);
        let taxonomy =
            KeywordTaxonomy::load_with_fallback(config.classification.taxonomy_path.as_deref());
        Self::new_with_dependencies(preprocessor, taxonomy, config)
    }

    /// Create McqProcessor with full dependency injection
    pub fn new_with_dependencies(
        preprocessor: Box<dyn Preprocessor>,
        taxonomy: KeywordTaxonomy,
        config: ParsingConfig,
    ) -> Result<Self> {
        config.validate()?;
        let classifier = KeywordClassifier::new(
            Arc::new(taxonomy),
            config.scoring.classification.clone(),
        )?;
        tracing::debug!(
            "🔧 Processor ready (preprocessor: {}, scoring v{})",
            preprocessor.name(),
            config.scoring.version
        );

        Ok(Self {
            preprocessor,
            rule_engine: RuleEngine::new()?,
            classifier: ClassifierHandle::new(classifier),
            config,
        })
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    pub fn set_debug_config(&mut self, debug_config: DebugConfig) {
        self.rule_engine.set_debug_config(debug_config);
    }

    /// Taxonomy of the classifier currently in use
    pub fn taxonomy(&self) -> Arc<KeywordTaxonomy> {
        Arc::clone(self.classifier.current().taxonomy())
    }

    /// Swap in a new taxonomy. Documents already being classified finish
    /// with the old one.
    pub fn reload_taxonomy(&self, taxonomy: KeywordTaxonomy) -> std::result::Result<(), ClassifierError> {
        self.classifier.reload(taxonomy)
    }

    /// Normalize, segment, extract and validate. No classification.
    pub fn parse_questions(&self, raw: &str) -> Vec<Question> {
        let normalized = self.preprocessor.normalize(raw);
        self.rule_engine.apply_rules(&normalized, &self.config).questions
    }

    /// Label every unclassified question and fold classification confidence
    /// into its stored confidence. Returns how many fell below the
    /// configured confidence threshold.
    pub fn classify_questions(&self, questions: &mut [Question]) -> usize {
        let classifier = self.classifier.current();
        let threshold = self.config.classification.confidence_threshold;
        let mut low_confidence = 0;

        for question in questions.iter_mut() {
            let result = classifier.classify(&question.question_text, &question.options_text());
            if !question.apply_classification(&result) {
                continue;
            }
            if result.confidence < threshold {
                low_confidence += 1;
            }
            tracing::debug!(
                "🏷️  {} → {}/{} ({:.2})",
                question.id,
                result.subject,
                result.topic,
                result.confidence
            );
        }

        low_confidence
    }

    pub fn process_text(&self, raw: &str) -> ProcessingOutcome {
        self.process_text_with_profiling(raw, false)
    }

    pub fn process_text_with_profiling(&self, raw: &str, enable_profiling: bool) -> ProcessingOutcome {
        let mut profiler = StepProfiler::new(enable_profiling);
        tracing::info!("📄 Processing {} bytes of text", raw.len());

        let normalized = profiler.time_step("Normalization", || self.preprocessor.normalize(raw));
        let output = profiler.time_step("Rule processing", || {
            self.rule_engine.apply_rules(&normalized, &self.config)
        });

        let blocks_seen = output.blocks.len();
        let blocks_rejected = output.rejected_count();
        let mut questions = output.questions;

        let low_confidence_classifications = if self.config.classification.enabled {
            profiler.time_step("Classification", || self.classify_questions(&mut questions))
        } else {
            0
        };

        profiler.print_summary();
        tracing::info!(
            "✅ {} questions ({} blocks, {} rejected)",
            questions.len(),
            blocks_seen,
            blocks_rejected
        );

        ProcessingOutcome {
            questions,
            blocks_seen,
            blocks_rejected,
            low_confidence_classifications,
        }
    }

    /// Process text and capture all intermediate stage outputs
    /// Used for pipeline diagnostics and testing stage boundaries
    pub fn process_text_capture_stages(&self, raw: &str) -> Result<PipelineStages> {
        let classifier = self.classifier.current();
        let source_fingerprint = calculate_text_hash(raw);
        let config_fingerprint = calculate_config_hash(&self.config)?;
        let taxonomy_fingerprint = classifier.taxonomy().fingerprint()?;

        // Stage 1: raw → normalized text
        let normalized_text = self.preprocessor.normalize(raw);
        tracing::info!("📋 Stage 1: normalized text captured ({} bytes)", normalized_text.len());

        // Stage 2: normalized text → blocks → validated questions
        let output = self.rule_engine.apply_rules(&normalized_text, &self.config);
        tracing::info!(
            "📋 Stage 2: {} blocks, {} questions captured",
            output.blocks.len(),
            output.questions.len()
        );

        // Stage 3: classification
        let parsed_questions = output.questions.clone();
        let mut questions = output.questions;
        if self.config.classification.enabled {
            self.classify_questions(&mut questions);
        }
        tracing::info!("📋 Stage 3: {} questions classified", questions.len());

        Ok(PipelineStages {
            source_fingerprint,
            config_fingerprint,
            taxonomy_fingerprint,
            normalized_text,
            blocks: output.blocks,
            outcomes: output.outcomes,
            parsed_questions,
            questions,
        })
    }
}
