use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// QUESTION-NUMBER SURFACE FORMS
// ============================================================================

/// The line-start numbering forms that open a new question block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionNumberForm {
    /// `Q.1.`, `Q1)`, `1.`, `1)`, `1 `
    Dotted,
    /// `1.` directly followed by a word
    NumberThenWord,
    /// `Question 1:`
    QuestionKeyword,
    /// `Q 1:`
    QShort,
}

impl QuestionNumberForm {
    /// Alternation order. Earlier forms win when several match at one position.
    pub const ALL: [QuestionNumberForm; 4] = [
        QuestionNumberForm::Dotted,
        QuestionNumberForm::NumberThenWord,
        QuestionNumberForm::QuestionKeyword,
        QuestionNumberForm::QShort,
    ];

    pub fn pattern(self) -> &'static str {
        match self {
            QuestionNumberForm::Dotted => r"(?:Q\.?\s*)?\d+\.?\s*(?:\)|\.|\s)",
            QuestionNumberForm::NumberThenWord => r"\d+\.\s*\w",
            QuestionNumberForm::QuestionKeyword => r"Question\s+\d+[.:\s]",
            QuestionNumberForm::QShort => r"Q\s*\d+[.:\s]",
        }
    }

    fn group_name(self) -> &'static str {
        match self {
            QuestionNumberForm::Dotted => "dotted",
            QuestionNumberForm::NumberThenWord => "number_then_word",
            QuestionNumberForm::QuestionKeyword => "question_keyword",
            QuestionNumberForm::QShort => "q_short",
        }
    }
}

/// A question-number match. `start` is where the block begins (the line
/// break before the number when there is one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBoundary {
    pub start: usize,
    pub end: usize,
    pub form: QuestionNumberForm,
    pub number: Option<u32>,
}

// ============================================================================
// FALLBACK SPLIT RULES
// ============================================================================

/// Line-break split points used when no question number is found.
/// Applied in `ALL` order, each over the pieces left by the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    /// Next line opens with `(A)` or `word (A)`
    BeforeOptionMarker,
    /// Next line opens with `12.`
    BeforeNumberedItem,
}

impl SplitRule {
    pub const ALL: [SplitRule; 2] = [SplitRule::BeforeOptionMarker, SplitRule::BeforeNumberedItem];

    fn pattern(self) -> &'static str {
        match self {
            SplitRule::BeforeOptionMarker => r"^(?:\([A-Z]\)|\w+\s*\([A-Z]\))",
            SplitRule::BeforeNumberedItem => r"^\d+\.",
        }
    }
}

// ============================================================================
// OPTION SPANS
// ============================================================================

/// One `(x) text` option found in a block. `text` is untrimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpan {
    pub label: char,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

// ============================================================================
// GRAMMAR
// ============================================================================

/// Every pattern segmentation and extraction match against, compiled once.
pub struct Grammar {
    question_number: Regex,
    option_marker: Regex,
    option_terminator: Regex,
    option_line: Regex,
    answer_line: Regex,
    answer_inline: Regex,
    answer_key: Regex,
    leading_number: Regex,
    split_rules: Vec<(SplitRule, Regex)>,
}

impl Grammar {
    pub fn new() -> Result<Self, ConfigError> {
        let forms = QuestionNumberForm::ALL
            .iter()
            .map(|form| format!("(?P<{}>{})", form.group_name(), form.pattern()))
            .collect::<Vec<_>>()
            .join("|");

        let mut split_rules = Vec::with_capacity(SplitRule::ALL.len());
        for rule in SplitRule::ALL {
            split_rules.push((rule, compile(rule.pattern())?));
        }

        Ok(Self {
            question_number: compile(&format!(r"(?mi)(?:^|\n)\s*(?:{forms})"))?,
            option_marker: compile(r"\(([a-dA-D])\)")?,
            option_terminator: compile(r"^(?:\([a-dA-D]\)|\n\s*\d+\.|\n\s*(?:Answer|Ans))")?,
            option_line: compile(r"^\s*\(?[a-dA-D]\)?[.)\s]")?,
            answer_line: compile(r"(?i)^\s*(?:answer|ans)\b")?,
            answer_inline: compile(r"(?i)\b(?:answer|ans)\b\.?\s*[:=\-]")?,
            answer_key: compile(r"(?i)\b(?:answer|ans)\.?\s*[:=\-\s]*\(?([a-z])\b")?,
            leading_number: compile(r"^\s*(?:(?i:question)\s+|(?i:q)\.?\s*)?\d+\.?\s*(?:[).:]|\s)*")?,
            split_rules,
        })
    }

    /// All question-number matches in document order.
    pub fn question_boundaries(&self, text: &str) -> Vec<QuestionBoundary> {
        self.question_number
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let form = QuestionNumberForm::ALL
                    .into_iter()
                    .find(|form| caps.name(form.group_name()).is_some())?;
                Some(QuestionBoundary {
                    start: whole.start(),
                    end: whole.end(),
                    form,
                    number: leading_digits(whole.as_str()),
                })
            })
            .collect()
    }

    /// Options of the form `(a) text`, each running until the next option
    /// marker, a numbered line, an answer line or the end of the block.
    /// The body never crosses a `(`.
    pub fn option_spans(&self, block: &str) -> Vec<OptionSpan> {
        let mut spans = Vec::new();
        for caps in self.option_marker.captures_iter(block) {
            let (Some(marker), Some(label)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(label) = label.as_str().chars().next() else {
                continue;
            };
            let body_start = marker.end();
            let limit = block[body_start..]
                .find('(')
                .map_or(block.len(), |offset| body_start + offset);

            if let Some(end) = self.option_end(block, body_start, limit) {
                spans.push(OptionSpan {
                    label,
                    start: marker.start(),
                    end,
                    text: block[body_start..end].to_string(),
                });
            }
        }
        spans
    }

    /// Earliest terminator after at least one non-space body character.
    /// A body made only of whitespace yields nothing; it would trim to empty.
    fn option_end(&self, block: &str, body_start: usize, limit: usize) -> Option<usize> {
        let body = &block[body_start..limit];
        let content_start = body_start + (body.len() - body.trim_start().len());
        if content_start >= limit {
            return None;
        }

        for (offset, ch) in block[content_start..limit].char_indices() {
            let position = content_start + offset;
            if ch == '\n' && self.option_terminator.is_match(&block[position..]) {
                return Some(position);
            }
        }

        if limit == block.len() || self.option_terminator.is_match(&block[limit..]) {
            Some(limit)
        } else {
            None
        }
    }

    /// First answer key in the block, uppercased.
    pub fn answer_key(&self, block: &str) -> Option<char> {
        self.answer_key
            .captures(block)
            .and_then(|caps| caps.get(1))
            .and_then(|letter| letter.as_str().chars().next())
            .map(|letter| letter.to_ascii_uppercase())
    }

    pub fn is_option_line(&self, line: &str) -> bool {
        self.option_line.is_match(line)
    }

    pub fn is_answer_line(&self, line: &str) -> bool {
        self.answer_line.is_match(line)
    }

    /// Byte offset where the stem part of a line ends: the first inline option
    /// marker or answer key, if any.
    pub fn stem_cut(&self, line: &str) -> Option<usize> {
        let option = self.option_marker.find(line).map(|m| m.start());
        let answer = self.answer_inline.find(line).map(|m| m.start());
        match (option, answer) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Line without its leading question number (`Q.3.`, `Question 3:`, `3)`).
    pub fn strip_leading_number<'a>(&self, line: &'a str) -> &'a str {
        match self.leading_number.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        }
    }

    /// Cut points `(piece_end, next_start)` for one fallback rule: a line
    /// break whose following line (after leading whitespace) opens with the
    /// rule's pattern.
    pub fn split_points(&self, rule: SplitRule, text: &str) -> Vec<(usize, usize)> {
        let Some((_, regex)) = self.split_rules.iter().find(|(r, _)| *r == rule) else {
            return Vec::new();
        };

        let mut points = Vec::new();
        let mut resume = 0;
        for (position, ch) in text.char_indices() {
            if ch != '\n' || position < resume {
                continue;
            }
            let rest = &text[position..];
            let next_start = position + (rest.len() - rest.trim_start().len());
            if regex.is_match(&text[next_start..]) {
                points.push((position, next_start));
                resume = next_start;
            }
        }
        points
    }
}

fn leading_digits(text: &str) -> Option<u32> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|digits| !digits.is_empty())
        .and_then(|digits| digits.parse().ok())
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> Grammar {
        Grammar::new().unwrap()
    }

    #[test]
    fn each_number_form_is_recognised_at_line_start() {
        let g = grammar();
        let cases = [
            ("Q.1. What", QuestionNumberForm::Dotted, 1),
            ("12) Which", QuestionNumberForm::Dotted, 12),
            ("Question 3: Name", QuestionNumberForm::QuestionKeyword, 3),
            ("Q 4: Name", QuestionNumberForm::QShort, 4),
        ];
        for (text, form, number) in cases {
            let found = g.question_boundaries(text);
            assert_eq!(found.len(), 1, "{text}");
            assert_eq!(found[0].form, form, "{text}");
            assert_eq!(found[0].number, Some(number), "{text}");
            assert_eq!(found[0].start, 0);
        }
    }

    #[test]
    fn numbers_inside_a_line_are_not_boundaries() {
        let text = "The value is 10. Ohms apply\n2. Next";
        let found = grammar().question_boundaries(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].number, Some(2));
        assert_eq!(Some(found[0].start), text.find('\n'));
    }

    #[test]
    fn options_stop_at_next_marker_and_answer_line() {
        let block = "Pick one (a) Volt (b) Ampere\nAnswer: b";
        let spans = grammar().option_spans(block);
        let texts: Vec<_> = spans.iter().map(|s| (s.label, s.text.trim())).collect();
        assert_eq!(texts, vec![('a', "Volt"), ('b', "Ampere")]);
    }

    #[test]
    fn option_body_cannot_cross_a_parenthesis() {
        // "(c) Ohm (SI)" has no valid terminator before the stray '('
        let spans = grammar().option_spans("(a) Volt (b) Amp (c) Ohm (SI) unit");
        let labels: Vec<_> = spans.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!['a', 'b']);
    }

    #[test]
    fn option_ends_before_new_numbered_line() {
        let spans = grammar().option_spans("(a) first\n2. Another question");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, " first");
    }

    #[test]
    fn whitespace_only_option_body_is_skipped() {
        let spans = grammar().option_spans("(a)   (b) real");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].label, 'b');
    }

    #[test]
    fn answer_key_is_uppercased() {
        let g = grammar();
        assert_eq!(g.answer_key("Ans. c"), Some('C'));
        assert_eq!(g.answer_key("answer = (d)"), Some('D'));
        assert_eq!(g.answer_key("no key here"), None);
    }

    #[test]
    fn strips_numbering_variants() {
        let g = grammar();
        assert_eq!(g.strip_leading_number("Q.7. What is"), "What is");
        assert_eq!(g.strip_leading_number("Question 2: Name"), "Name");
        assert_eq!(g.strip_leading_number("15) Find"), "Find");
        assert_eq!(g.strip_leading_number("Ohm's law"), "Ohm's law");
    }

    #[test]
    fn stem_cut_finds_inline_marker() {
        let g = grammar();
        let line = "What is it? (a) x (b) y";
        assert_eq!(g.stem_cut(line), line.find("(a)"));
        assert_eq!(g.stem_cut("No options here"), None);
    }

    #[test]
    fn split_points_follow_rule_lookahead() {
        let g = grammar();
        let text = "intro\n(A) one\n  Label (B) two\n3. three";
        let option_points = g.split_points(SplitRule::BeforeOptionMarker, text);
        assert_eq!(option_points.len(), 2);
        let numbered = g.split_points(SplitRule::BeforeNumberedItem, text);
        assert_eq!(numbered.len(), 1);
        assert_eq!(&text[numbered[0].1..], "3. three");
    }
}
