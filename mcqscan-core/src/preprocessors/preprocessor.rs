// Preprocessor abstraction for raw document text
//
// This module defines the boundary between text cleanup (raw text -> normalized
// text) and structural processing (normalized text -> question records). Anything
// after this point assumes the conventions the normalizer establishes: a single
// newline convention and no leading/trailing whitespace.

/// Preprocessor trait - cleans raw extracted text
///
/// Implementations must be total: every input, including the empty string,
/// produces an output. Failures belong at construction time, not here.
pub trait Preprocessor: Send + Sync {
    fn normalize(&self, raw: &str) -> String;

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;
}
