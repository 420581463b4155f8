use crate::detect::detect_language;
use crate::explain::Explainer;
use legacysleuth_parser::{Ir, Language, ParseError};
use legacysleuth_summarizer::{summarize, Summary};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Please enter COBOL or JCL code.")]
    EmptyInput,
    #[error("Please enter COBOL or JCL code.")]
    UnknownLanguage,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub language: Language,
    pub intermediate_representation: Ir,
    /// Only COBOL programs are summarized.
    pub analysis: Option<Summary>,
    pub explanation: Option<String>,
}

/// Parse `code` as `language`, summarize it and optionally explain it.
///
/// A failing explainer does not fail the run; its error is reported in the
/// explanation text instead.
pub fn run_pipeline(
    code: &str,
    language: Language,
    explainer: Option<&dyn Explainer>,
) -> Result<Analysis, EngineError> {
    let ir = language.parse_source(code)?;
    debug!(%language, warnings = ir.warnings().len(), "parsed source");

    let analysis = match &ir {
        Ir::Cobol(cobol) => Some(summarize(cobol)),
        Ir::Jcl(_) => None,
    };

    let explanation = explainer.map(|explainer| match explainer.explain(&ir, language) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "explanation failed");
            format!("ERROR: Failed to generate {} explanation: {}", language.as_str().to_uppercase(), e)
        }
    });

    Ok(Analysis { language, intermediate_representation: ir, analysis, explanation })
}

/// Detect the language of `code` and run the pipeline on it.
pub fn analyze(code: &str, explainer: Option<&dyn Explainer>) -> Result<Analysis, EngineError> {
    if code.trim().is_empty() {
        return Err(EngineError::EmptyInput);
    }
    let language = detect_language(code).ok_or(EngineError::UnknownLanguage)?;
    info!(%language, "detected language");
    run_pipeline(code, language, explainer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::{ExplainError, PromptExplainer};

    struct Failing;

    impl Explainer for Failing {
        fn explain(&self, _ir: &Ir, _language: Language) -> Result<String, ExplainError> {
            Err(ExplainError::Backend("model unavailable".to_string()))
        }
    }

    const COBOL: &str = "IDENTIFICATION DIVISION.\nPROGRAM-ID. PIPE.\nPROCEDURE DIVISION.\n    STOP RUN.";

    #[test]
    fn cobol_run_has_summary() {
        let result = run_pipeline(COBOL, Language::Cobol, None).unwrap();
        assert_eq!(result.language, Language::Cobol);
        assert_eq!(result.analysis.as_ref().map(|s| s.program_id.as_str()), Some("PIPE"));
        assert!(result.explanation.is_none());
    }

    #[test]
    fn jcl_run_has_no_summary() {
        let result = run_pipeline("//S1 EXEC PGM=X", Language::Jcl, Some(&PromptExplainer)).unwrap();
        assert!(result.analysis.is_none());
        assert!(matches!(result.intermediate_representation, Ir::Jcl(_)));
        assert!(result.explanation.unwrap().contains("JCL INTERMEDIATE REPRESENTATION"));
    }

    #[test]
    fn explainer_failure_becomes_text() {
        let result = run_pipeline(COBOL, Language::Cobol, Some(&Failing)).unwrap();
        assert_eq!(
            result.explanation.as_deref(),
            Some("ERROR: Failed to generate COBOL explanation: model unavailable")
        );
    }

    #[test]
    fn fatal_jcl_error_propagates() {
        let err = run_pipeline("//J JOB CLASS=A", Language::Jcl, None).unwrap_err();
        assert!(matches!(err, EngineError::Parse(ParseError::NoExecSteps)));
    }

    #[test]
    fn analyze_validates_input() {
        assert!(matches!(analyze("  ", None), Err(EngineError::EmptyInput)));
        let err = analyze("hello world", None).unwrap_err();
        assert!(matches!(err, EngineError::UnknownLanguage));
        assert_eq!(err.to_string(), "Please enter COBOL or JCL code.");
        assert_eq!(analyze(COBOL, None).unwrap().language, Language::Cobol);
    }
}
