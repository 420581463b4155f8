//! # legacysleuth
//!
//! Parse COBOL programs and JCL decks into IR, summarize them, and feed them
//! to an explainer.

pub mod detect;
pub mod engine;
pub mod explain;

pub use legacysleuth_parser as parser;
pub use legacysleuth_summarizer as summarizer;

pub use detect::detect_language;
pub use engine::{analyze, run_pipeline, Analysis, EngineError};
pub use explain::{Explainer, PromptExplainer};
