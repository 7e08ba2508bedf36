use super::grammar::{Grammar, SplitRule};
use crate::types::Block;

/// Splits normalized text into candidate question blocks.
///
/// Primary strategy cuts at every question-number boundary; text before the
/// first boundary is dropped. Without any boundary the fallback rules split on
/// line breaks that precede an option marker or a numbered item.
pub struct BlockSegmenter<'a> {
    grammar: &'a Grammar,
}

impl<'a> BlockSegmenter<'a> {
    pub fn new(grammar: &'a Grammar) -> Self {
        Self { grammar }
    }

    pub fn segment(&self, text: &str) -> Vec<Block> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let boundaries = self.grammar.question_boundaries(text);
        let spans = if boundaries.is_empty() {
            tracing::debug!("no question numbers found, using fallback split");
            self.fallback_spans(text)
        } else {
            let mut spans = Vec::with_capacity(boundaries.len());
            for (i, boundary) in boundaries.iter().enumerate() {
                let end = boundaries
                    .get(i + 1)
                    .map_or(text.len(), |next| next.start);
                spans.push((boundary.start, end));
            }
            spans
        };

        let mut blocks = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            if let Some((start, end)) = trimmed_range(text, start, end) {
                blocks.push(Block {
                    ordinal: blocks.len() + 1,
                    start,
                    end,
                    text: text[start..end].to_string(),
                });
            }
        }

        tracing::debug!("segmented {} bytes into {} blocks", text.len(), blocks.len());
        blocks
    }

    /// Each rule re-splits the pieces left by the previous one.
    fn fallback_spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut pieces = vec![(0, text.len())];

        for rule in SplitRule::ALL {
            let mut next_pieces = Vec::with_capacity(pieces.len());
            for (start, end) in pieces {
                let mut last = start;
                for (cut, resume) in self.grammar.split_points(rule, &text[start..end]) {
                    push_non_empty(&mut next_pieces, text, last, start + cut);
                    last = start + resume;
                }
                push_non_empty(&mut next_pieces, text, last, end);
            }
            pieces = next_pieces;
        }

        pieces
    }
}

fn push_non_empty(pieces: &mut Vec<(usize, usize)>, text: &str, start: usize, end: usize) {
    if let Some(range) = trimmed_range(text, start, end) {
        pieces.push(range);
    }
}

/// Byte range of `text[start..end]` with surrounding whitespace removed, or
/// `None` when nothing is left.
fn trimmed_range(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        None
    } else {
        let new_start = start + leading;
        Some((new_start, new_start + trimmed.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Vec<Block> {
        let grammar = Grammar::new().unwrap();
        BlockSegmenter::new(&grammar).segment(text)
    }

    #[test]
    fn empty_text_has_no_blocks() {
        assert!(segment("").is_empty());
        assert!(segment("   \n ").is_empty());
    }

    #[test]
    fn cuts_at_each_question_number() {
        let text = "Header line\n1. First? (a) x (b) y\n2. Second? (a) p (b) q";
        let blocks = segment(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "1. First? (a) x (b) y");
        assert_eq!(blocks[1].text, "2. Second? (a) p (b) q");
        assert_eq!(blocks[1].ordinal, 2);
        assert_eq!(&text[blocks[1].start..blocks[1].end], blocks[1].text);
    }

    #[test]
    fn collapsed_text_stays_one_block() {
        // Only the first number sits at a line start once newlines are gone
        let blocks = segment("1. First? (a) x (b) y 2. Second? (a) p (b) q");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn fallback_splits_before_option_lines() {
        let text = "Pick the metal\n(A) Iron\n  \n  Brass (B) Wood";
        let blocks = segment(text);
        let texts: Vec<_> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Pick the metal", "(A) Iron", "Brass (B) Wood"]);
        assert_eq!(blocks[2].ordinal, 3);
    }

    #[test]
    fn segmentation_is_deterministic() {
        let text = "1. A? (a) x (b) y\nQuestion 2: B? (a) p (b) q";
        assert_eq!(segment(text), segment(text));
    }
}
