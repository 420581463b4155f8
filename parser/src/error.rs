use thiserror::Error;

/// Errors raised by the extractors.
///
/// Everything else that looks wrong in the input degrades to an omission or
/// to an entry in the IR's `warnings` list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A JCL deck without a single EXEC card has nothing to run.
    #[error("No EXEC steps found in JCL")]
    NoExecSteps,

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}
