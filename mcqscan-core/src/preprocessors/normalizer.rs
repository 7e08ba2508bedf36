use super::preprocessor::Preprocessor;
use crate::config::NormalizationConfig;
use crate::error::ConfigError;
use regex::Regex;

/// Cleans raw OCR/extraction output before segmentation.
///
/// Default mode collapses every whitespace run (newlines included) to a single
/// space. With `preserve_line_breaks` only horizontal runs collapse, so the
/// line-start anchors the segmenter relies on survive.
pub struct TextNormalizer {
    preserve_line_breaks: bool,
    whitespace: Regex,
    horizontal_whitespace: Regex,
    line_edges: Regex,
    corrections: Vec<(Regex, String)>,
}

impl TextNormalizer {
    pub fn new(config: &NormalizationConfig) -> Result<Self, ConfigError> {
        let mut corrections = Vec::with_capacity(config.ocr_corrections.len());
        for correction in &config.ocr_corrections {
            let regex = compile(&correction.pattern)?;
            corrections.push((regex, correction.replacement.clone()));
        }

        Ok(Self {
            preserve_line_breaks: config.preserve_line_breaks,
            whitespace: compile(r"\s+")?,
            horizontal_whitespace: compile(r"[^\S\n]+")?,
            line_edges: compile(r" ?\n ?")?,
            corrections,
        })
    }

    fn collapse(&self, text: &str) -> String {
        if self.preserve_line_breaks {
            let unified = unify_line_endings(text);
            let collapsed = self.horizontal_whitespace.replace_all(&unified, " ");
            self.line_edges.replace_all(&collapsed, "\n").into_owned()
        } else {
            let collapsed = self.whitespace.replace_all(text, " ");
            // No line breaks survive the collapse; unify anyway so both modes
            // share one newline convention.
            unify_line_endings(&collapsed)
        }
    }

    fn apply_corrections(&self, text: String) -> String {
        self.corrections
            .iter()
            .fold(text, |acc, (regex, replacement)| {
                regex.replace_all(&acc, replacement.as_str()).into_owned()
            })
    }
}

impl Preprocessor for TextNormalizer {
    fn normalize(&self, raw: &str) -> String {
        let collapsed = self.collapse(raw);
        let corrected = self.apply_corrections(collapsed);
        corrected.trim().to_string()
    }

    fn name(&self) -> &str {
        "TextNormalizer"
    }
}

fn unify_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
