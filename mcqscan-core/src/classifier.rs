use crate::config::ClassificationWeights;
use crate::error::ClassifierError;
use crate::taxonomy::KeywordTaxonomy;
use crate::types::ClassificationResult;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

struct CompiledKeyword {
    /// Spelling as listed in the taxonomy; reported in `matched_keywords`
    surface: String,
    pattern: Regex,
    /// Whitespace-separated words of `surface`; `ohm's law` counts two
    word_count: usize,
}

struct CompiledTopic {
    subject: String,
    topic: String,
    keywords: Vec<CompiledKeyword>,
}

struct ScoredTopic<'a> {
    topic: &'a CompiledTopic,
    matched: Vec<&'a CompiledKeyword>,
    score: f64,
}

/// Weighted keyword scoring over a frozen taxonomy.
///
/// Keyword patterns are compiled once at construction. Text and keywords go
/// through the same preparation (lowercase, punctuation to spaces, collapsed
/// whitespace) so `ohm's law` in a taxonomy matches "Ohm's law" in a stem.
pub struct KeywordClassifier {
    taxonomy: Arc<KeywordTaxonomy>,
    topics: Vec<CompiledTopic>,
    weights: ClassificationWeights,
}

impl KeywordClassifier {
    pub fn new(
        taxonomy: Arc<KeywordTaxonomy>,
        weights: ClassificationWeights,
    ) -> Result<Self, ClassifierError> {
        let mut topics = Vec::new();

        for (subject, entry) in taxonomy.topics() {
            let mut seen = HashSet::new();
            let mut keywords = Vec::with_capacity(entry.keywords.len());

            for surface in &entry.keywords {
                let prepared = prepare_text(surface);
                if prepared.is_empty() || !seen.insert(prepared.clone()) {
                    continue;
                }
                let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&prepared)))
                    .map_err(|source| ClassifierError::KeywordPattern {
                        keyword: surface.clone(),
                        source,
                    })?;
                keywords.push(CompiledKeyword {
                    surface: surface.clone(),
                    pattern,
                    word_count: surface.split_whitespace().count(),
                });
            }

            topics.push(CompiledTopic {
                subject: subject.to_string(),
                topic: entry.name.clone(),
                keywords,
            });
        }

        tracing::debug!("🏷️  Compiled keyword patterns for {} topics", topics.len());
        Ok(Self {
            taxonomy,
            topics,
            weights,
        })
    }

    pub fn taxonomy(&self) -> &Arc<KeywordTaxonomy> {
        &self.taxonomy
    }

    pub fn weights(&self) -> &ClassificationWeights {
        &self.weights
    }

    /// Fail-open: any internal fault yields the General/Miscellaneous fallback.
    pub fn classify(&self, question_text: &str, options_text: &str) -> ClassificationResult {
        match self.try_classify(question_text, options_text) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("⚠️  Classification failed, using fallback: {e}");
                ClassificationResult::fallback()
            }
        }
    }

    pub fn try_classify(
        &self,
        question_text: &str,
        options_text: &str,
    ) -> Result<ClassificationResult, ClassifierError> {
        let text = prepare_text(&format!("{question_text} {options_text}"));
        let total_words = text.split_whitespace().count().max(1) as f64;

        let mut scored = Vec::new();
        for topic in &self.topics {
            if let Some(candidate) = self.score_topic(topic, &text, total_words)? {
                scored.push(candidate);
            }
        }

        // Ties keep the earlier entry in taxonomy order
        let Some(best_index) = scored
            .iter()
            .enumerate()
            .fold(None, |best: Option<usize>, (i, candidate)| match best {
                Some(b) if scored[b].score >= candidate.score => Some(b),
                _ => Some(i),
            })
        else {
            return Ok(ClassificationResult::fallback());
        };

        let best = &scored[best_index];
        let runner_up = scored
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != best_index)
            .map(|(_, candidate)| candidate.score)
            .fold(0.0_f64, f64::max);

        let confidence = self.confidence(best.score, runner_up);
        if !confidence.is_finite() {
            return Err(ClassifierError::NonFiniteScore {
                subject: best.topic.subject.clone(),
                topic: best.topic.topic.clone(),
            });
        }

        Ok(ClassificationResult {
            subject: best.topic.subject.clone(),
            topic: best.topic.topic.clone(),
            confidence,
            matched_keywords: best
                .matched
                .iter()
                .map(|keyword| keyword.surface.clone())
                .collect::<BTreeSet<_>>(),
        })
    }

    fn score_topic<'a>(
        &self,
        topic: &'a CompiledTopic,
        text: &str,
        total_words: f64,
    ) -> Result<Option<ScoredTopic<'a>>, ClassifierError> {
        let mut matched = Vec::new();
        let mut frequency = 0usize;
        let mut matched_words = 0usize;

        for keyword in &topic.keywords {
            let hits = keyword.pattern.find_iter(text).count();
            if hits > 0 {
                matched.push(keyword);
                frequency += hits;
                matched_words += keyword.word_count;
            }
        }

        if matched.is_empty() {
            return Ok(None);
        }

        let w = &self.weights;
        let frequency = frequency as f64;
        let score = w.base * matched.len() as f64
            + w.frequency * frequency
            + w.length_bonus * matched_words as f64
            + frequency / total_words * w.density;

        if !score.is_finite() {
            return Err(ClassifierError::NonFiniteScore {
                subject: topic.subject.clone(),
                topic: topic.topic.clone(),
            });
        }

        Ok(Some(ScoredTopic {
            topic,
            matched,
            score,
        }))
    }

    /// `min(S / normalization, 1)`, scaled by `S / (S + S2)` when a runner-up scored.
    fn confidence(&self, best: f64, runner_up: f64) -> f64 {
        if best <= 0.0 {
            return 0.0;
        }
        let mut confidence = (best / self.weights.normalization).min(1.0);
        if runner_up > 0.0 {
            confidence *= best / (best + runner_up);
        }
        confidence.clamp(0.0, 1.0)
    }
}

/// Lowercase, replace anything but ASCII letters, digits and whitespace with a
/// space, collapse whitespace runs.
pub fn prepare_text(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shared, swappable classifier. Readers snapshot an `Arc` and keep it for a
/// whole document; `reload` builds the replacement before swapping it in.
pub struct ClassifierHandle {
    current: RwLock<Arc<KeywordClassifier>>,
}

impl ClassifierHandle {
    pub fn new(classifier: KeywordClassifier) -> Self {
        Self {
            current: RwLock::new(Arc::new(classifier)),
        }
    }

    pub fn current(&self) -> Arc<KeywordClassifier> {
        self.current.read().clone()
    }

    /// On error the previous classifier stays active.
    pub fn reload(&self, taxonomy: KeywordTaxonomy) -> Result<(), ClassifierError> {
        let weights = self.current().weights().clone();
        let next = KeywordClassifier::new(Arc::new(taxonomy), weights)?;
        *self.current.write() = Arc::new(next);
        tracing::info!("🔄 Classifier reloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{SubjectEntry, TopicEntry};

    fn builtin() -> KeywordClassifier {
        KeywordClassifier::new(
            Arc::new(KeywordTaxonomy::builtin()),
            ClassificationWeights::default(),
        )
        .unwrap()
    }

    fn taxonomy(entries: &[(&str, &str, &[&str])]) -> KeywordTaxonomy {
        let mut subjects: Vec<SubjectEntry> = Vec::new();
        for (subject, topic, keywords) in entries {
            let topic = TopicEntry {
                name: topic.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            };
            match subjects.iter_mut().find(|s| s.name == *subject) {
                Some(existing) => existing.topics.push(topic),
                None => subjects.push(SubjectEntry {
                    name: subject.to_string(),
                    topics: vec![topic],
                }),
            }
        }
        KeywordTaxonomy::new(subjects)
    }

    #[test]
    fn prepares_text_like_keywords() {
        assert_eq!(prepare_text("  What is Ohm's   LAW? "), "what is ohm s law");
        assert_eq!(prepare_text("op-amp"), "op amp");
        assert_eq!(prepare_text("?!"), "");
    }

    #[test]
    fn ohms_law_beats_bare_ohm() {
        let result = builtin().classify("What is Ohm's law?", "");
        assert_eq!(result.subject, "Electrical");
        assert_eq!(result.topic, "DC Circuits");
        assert!(result.matched_keywords.contains("ohm's law"));
        // 3.7 against 3.6 from Basic Electronics' "ohm"
        let expected = 0.37 * 3.7 / 7.3;
        assert!((result.confidence - expected).abs() < 1e-9, "{}", result.confidence);
    }

    #[test]
    fn punctuated_keyword_counts_words_as_written() {
        let classifier = KeywordClassifier::new(
            Arc::new(taxonomy(&[("Physics", "Quantum", &["wave-particle duality"])])),
            ClassificationWeights::default(),
        )
        .unwrap();
        let result = classifier.classify("Explain wave-particle duality", "");

        assert_eq!(result.topic, "Quantum");
        // base 1 + frequency 0.5 + two words 0.2 + density 1/4 * 10
        let expected = (1.0 + 0.5 + 0.2 + 2.5) / 10.0;
        assert!((result.confidence - expected).abs() < 1e-9, "{}", result.confidence);
    }

    #[test]
    fn logic_gate_question_is_digital() {
        let result = builtin().classify("Which logic gate performs AND operation?", "");
        assert_eq!(result.subject, "Electronics");
        assert_eq!(result.topic, "Digital Electronics");
        assert!(result.matched_keywords.contains("logic gate"));
        assert!(result.matched_keywords.contains("AND"));
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn no_keyword_gives_fallback() {
        let result = builtin().classify("Name the capital of Peru", "Lima Cusco");
        assert!(result.is_fallback());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn ties_go_to_first_listed_topic() {
        let classifier = KeywordClassifier::new(
            Arc::new(taxonomy(&[("B", "Second", &["lens"]), ("A", "First", &["lens"])])),
            ClassificationWeights::default(),
        )
        .unwrap();
        let result = classifier.classify("A convex lens", "");
        assert_eq!((result.subject.as_str(), result.topic.as_str()), ("B", "Second"));
        // Equal competition halves the confidence
        let score = 1.0 + 0.5 + 0.1 + 10.0 / 3.0;
        assert!((result.confidence - (score / 10.0) * 0.5).abs() < 1e-9);
    }

    #[test]
    fn non_finite_weights_fail_open() {
        let weights = ClassificationWeights {
            base: f64::NAN,
            ..ClassificationWeights::default()
        };
        let classifier =
            KeywordClassifier::new(Arc::new(KeywordTaxonomy::builtin()), weights).unwrap();
        assert!(matches!(
            classifier.try_classify("current in a resistor", ""),
            Err(ClassifierError::NonFiniteScore { .. })
        ));
        assert!(classifier.classify("current in a resistor", "").is_fallback());
    }

    #[test]
    fn punctuation_only_keywords_are_skipped() {
        let classifier = KeywordClassifier::new(
            Arc::new(taxonomy(&[("S", "T", &["--", "gear"])])),
            ClassificationWeights::default(),
        )
        .unwrap();
        let result = classifier.classify("-- gear --", "");
        assert_eq!(result.matched_keywords, BTreeSet::from(["gear".to_string()]));
    }

    #[test]
    fn handle_reload_swaps_taxonomy() {
        let handle = ClassifierHandle::new(builtin());
        let before = handle.current();
        handle
            .reload(taxonomy(&[("Optics", "Lenses", &["focal length"])]))
            .unwrap();

        let after = handle.current();
        assert_eq!(after.classify("Find the focal length", "").subject, "Optics");
        // The earlier snapshot is unaffected
        assert_eq!(before.classify("Find the focal length", "").subject, "General");
    }
}
