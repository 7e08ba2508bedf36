//! Text Preprocessors
//!
//! This module provides the cleanup layer between raw extracted document text
//! (from an OCR or text-extraction collaborator) and segmentation.
//!
//! ## Architecture
//!
//! ```text
//! Raw text (OCR output, pdftotext, pasted text)
//!     ↓
//! [Preprocessor]
//!     ↓
//! Normalized text
//!     ↓
//! [RuleEngine: segment → extract → score → validate]
//!     ↓
//! Vec<Question>
//! ```
//!
//! ## Available Preprocessors
//!
//! - `TextNormalizer` - whitespace, line-ending and OCR-typo cleanup

pub mod normalizer;
pub mod preprocessor;

// Re-export main types
pub use normalizer::TextNormalizer;
pub use preprocessor::Preprocessor;
