use crate::config::ConfidenceWeights;
use crate::types::McqOption;

/// Additive parse-quality heuristic over stem and options, clamped to [0, 1].
pub struct ConfidenceScorer<'a> {
    weights: &'a ConfidenceWeights,
}

impl<'a> ConfidenceScorer<'a> {
    pub fn new(weights: &'a ConfidenceWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, question_text: &str, options: &[McqOption]) -> f64 {
        let w = self.weights;
        let mut score = 0.0;

        if !question_text.is_empty() {
            if question_text.ends_with('?') {
                score += w.question_mark;
            }
            if question_text.chars().count() > w.long_stem_chars {
                score += w.long_stem;
            }
            let lowered = question_text.to_lowercase();
            if w.interrogatives.iter().any(|word| lowered.contains(word.as_str())) {
                score += w.interrogative;
            }
        }

        if options.len() >= w.many_options_min {
            score += w.many_options;
        } else if options.len() >= w.some_options_min {
            score += w.some_options;
        }

        if !options.is_empty() {
            let total: usize = options.iter().map(|o| o.text.chars().count()).sum();
            let mean = total as f64 / options.len() as f64;
            if mean > w.long_option_chars {
                score += w.long_options;
            }
        }

        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(texts: &[&str]) -> Vec<McqOption> {
        texts
            .iter()
            .zip('a'..)
            .map(|(text, label)| McqOption::new(label, *text))
            .collect()
    }

    fn score(stem: &str, texts: &[&str]) -> f64 {
        let weights = ConfidenceWeights::default();
        ConfidenceScorer::new(&weights).score(stem, &options(texts))
    }

    #[test]
    fn full_marks_stem_with_short_options() {
        let s = score("What is the unit of current?", &["Volt", "Ampere", "Ohm", "Watt"]);
        assert!((s - 0.9).abs() < 1e-9, "{s}");
    }

    #[test]
    fn every_bonus_reaches_one() {
        let s = score(
            "Which of these materials conducts best?",
            &["Copper wire", "Glass rod", "Rubber band", "Dry wood"],
        );
        assert!((s - 1.0).abs() < 1e-9, "{s}");
        assert!(s <= 1.0);
    }

    #[test]
    fn heavy_weights_are_clamped() {
        let weights = ConfidenceWeights {
            question_mark: 0.9,
            long_stem: 0.9,
            ..ConfidenceWeights::default()
        };
        let s = ConfidenceScorer::new(&weights).score("Is this a long enough stem?", &[]);
        assert_eq!(s, 1.0);
    }

    #[test]
    fn interrogative_is_a_substring_match() {
        // "somewhat" contains "what"
        let s = score("Pick somewhat", &["aa", "bb"]);
        assert!((s - 0.3).abs() < 1e-9, "{s}");
    }

    #[test]
    fn bare_stem_scores_low() {
        assert_eq!(score("Name", &[]), 0.0);
        assert!((score("Name", &["ab", "cd"]) - 0.1).abs() < 1e-9);
    }
}
