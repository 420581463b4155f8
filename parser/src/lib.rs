//! # legacysleuth parser
//!
//! Pattern-based extraction of a structured IR from mainframe sources.
//!
//! ```text
//! COBOL text --normalize--> passes (program info, divisions, variables,
//!                            paragraphs, statements, control flow,
//!                            file operations, performs) --> CobolIr
//! JCL deck   -------------> JOB / EXEC / DD cards      --> JclIr
//! ```
//!
//! Extraction is a pure function of the input text. The [`Extractor`]
//! wrappers only remember the most recent result.

pub mod cobol;
pub mod error;
pub mod ir;
pub mod jcl;
pub mod normalize;
mod patterns;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use cobol::CobolExtractor;
pub use error::ParseError;
pub use ir::{CobolIr, Ir, JclIr};
pub use jcl::JclExtractor;

/// A parser for one source language, producing that language's own IR.
pub trait Extractor {
    type Ir: Clone + Serialize;

    fn language(&self) -> Language;

    /// Build a fresh IR from `source`. Nothing from a previous call leaks in.
    fn parse(&mut self, source: &str) -> Result<Self::Ir, ParseError>;

    /// The IR produced by the most recent successful [`Extractor::parse`],
    /// or an empty IR.
    fn ir(&self) -> &Self::Ir;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cobol,
    Jcl,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Cobol => "cobol",
            Language::Jcl => "jcl",
        }
    }

    /// Run the matching extractor over `source`.
    pub fn parse_source(self, source: &str) -> Result<Ir, ParseError> {
        match self {
            Language::Cobol => Ok(Ir::Cobol(CobolExtractor::new().parse(source)?)),
            Language::Jcl => Ok(Ir::Jcl(JclExtractor::new().parse(source)?)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cobol" => Ok(Language::Cobol),
            "jcl" => Ok(Language::Jcl),
            _ => Err(ParseError::UnsupportedLanguage(s.to_string())),
        }
    }
}
