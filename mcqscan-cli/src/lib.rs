// All parsing and classification lives in mcqscan-core.
// This CLI is a thin wrapper: argument handling, logging setup and output files.

pub mod logging;
pub mod output;

// Re-export core types for convenience
pub use mcqscan_core::*;

pub use output::{save_stages, OutputFormat};
