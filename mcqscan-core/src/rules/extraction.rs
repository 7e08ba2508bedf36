use super::grammar::Grammar;
use crate::types::{McqOption, QuestionCandidate};

/// Pulls stem, options and answer key out of a single block.
pub struct FieldExtractor<'a> {
    grammar: &'a Grammar,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(grammar: &'a Grammar) -> Self {
        Self { grammar }
    }

    /// `None` when the block has no usable question text. Option count and
    /// duplicates are left to the validator.
    pub fn extract(&self, block: &str) -> Option<QuestionCandidate> {
        let question_text = self.question_text(block)?;
        Some(QuestionCandidate {
            question_text,
            options: self.options(block),
            correct_answer: self.grammar.answer_key(block),
        })
    }

    /// Stem lines up to the first option or answer line. Numbering is only
    /// stripped from the first content line; an inline option marker ends the
    /// stem mid-line.
    pub fn question_text(&self, block: &str) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();
        let mut first_line = true;

        for raw in block.split('\n') {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if self.grammar.is_option_line(line) || self.grammar.is_answer_line(line) {
                break;
            }

            let line = if first_line {
                first_line = false;
                self.grammar.strip_leading_number(line)
            } else {
                line
            };

            if let Some(cut) = self.grammar.stem_cut(line) {
                parts.push(&line[..cut]);
                break;
            }
            parts.push(line);
        }

        let stem = parts
            .iter()
            .flat_map(|part| part.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ");

        if stem.is_empty() {
            None
        } else {
            Some(stem)
        }
    }

    /// Trimmed options, dropping bodies of one character or less.
    pub fn options(&self, block: &str) -> Vec<McqOption> {
        self.grammar
            .option_spans(block)
            .into_iter()
            .filter_map(|span| {
                let text = span.text.trim();
                (text.chars().count() > 1).then(|| McqOption::new(span.label, text))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(block: &str) -> Option<QuestionCandidate> {
        let grammar = Grammar::new().unwrap();
        FieldExtractor::new(&grammar).extract(block)
    }

    #[test]
    fn single_line_block_keeps_stem_only() {
        let candidate =
            extract("1. What is the unit of current? (a) Volt (b) Ampere (c) Ohm (d) Watt").unwrap();
        assert_eq!(candidate.question_text, "What is the unit of current?");
        let labels: Vec<_> = candidate.options.iter().map(|o| o.label).collect();
        assert_eq!(labels, vec!['a', 'b', 'c', 'd']);
        assert_eq!(candidate.options[3].text, "Watt");
        assert_eq!(candidate.correct_answer, None);
    }

    #[test]
    fn multi_line_stem_stops_at_option_line() {
        let block = "Q.3. A coil of 10 turns\ncarries 2 A. Find the MMF.\n(a) 20 AT\n(b) 5 AT\nAns: a";
        let candidate = extract(block).unwrap();
        assert_eq!(candidate.question_text, "A coil of 10 turns carries 2 A. Find the MMF.");
        assert_eq!(candidate.options.len(), 2);
        assert_eq!(candidate.options[1].text, "5 AT");
        assert_eq!(candidate.correct_answer, Some('A'));
    }

    #[test]
    fn answer_key_is_not_checked_against_options() {
        let candidate = extract("5. Pick one (a) red (b) blue\nAnswer: E").unwrap();
        assert_eq!(candidate.correct_answer, Some('E'));
    }

    #[test]
    fn one_character_options_are_dropped() {
        let candidate = extract("7. Which? (a) x (b) yes (c) no").unwrap();
        let texts: Vec<_> = candidate.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["yes", "no"]);
    }

    #[test]
    fn block_without_stem_fails() {
        assert_eq!(extract("(a) Volt (b) Ampere"), None);
        assert_eq!(extract("12. "), None);
    }
}
