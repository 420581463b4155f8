//! Natural-language explanation seam.
//!
//! The language model call lives outside this crate. What lives here is the
//! prompt each IR shape is turned into and the [`Explainer`] trait a
//! transport implements.

use legacysleuth_parser::ir::{CobolIr, JclIr};
use legacysleuth_parser::{Ir, Language};
use serde::Serialize;
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("IR is {actual}, expected {expected}")]
    LanguageMismatch { expected: Language, actual: Language },
    #[error("failed to render IR: {0}")]
    Render(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(String),
}

/// Turns an IR into prose.
pub trait Explainer {
    fn explain(&self, ir: &Ir, language: Language) -> Result<String, ExplainError>;
}

/// Offline explainer: returns the prompt a model would receive.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptExplainer;

impl Explainer for PromptExplainer {
    fn explain(&self, ir: &Ir, language: Language) -> Result<String, ExplainError> {
        match (ir, language) {
            (Ir::Cobol(cobol), Language::Cobol) => cobol_prompt(cobol),
            (Ir::Jcl(jcl), Language::Jcl) => jcl_prompt(jcl),
            (Ir::Cobol(_), expected) => Err(ExplainError::LanguageMismatch { expected, actual: Language::Cobol }),
            (Ir::Jcl(_), expected) => Err(ExplainError::LanguageMismatch { expected, actual: Language::Jcl }),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ExplainError> {
    Ok(serde_json::to_string_pretty(value)?)
}

const JCL_RULES: &str = "\
You are a senior IBM Mainframe JCL engineer.

STRICT RULES (MANDATORY):
- Explain ONLY the JCL job described below.
- Do NOT invent steps, datasets, or utilities.
- Do NOT explain COBOL, SQL, or business logic.
- Do NOT give examples.
- Use standard JCL terminology only.
- Provide a concise, step-by-step explanation of the JOB, EXEC steps, and DD statements.
";

pub fn jcl_prompt(ir: &JclIr) -> Result<String, ExplainError> {
    let mut prompt = String::from(JCL_RULES);
    // fmt::Write into a String cannot fail
    let _ = write!(
        prompt,
        "\nJCL INTERMEDIATE REPRESENTATION (IR):\n{}\n\nProvide a clear, professional explanation of this JCL job structure.\n",
        to_json(ir)?
    );
    Ok(prompt)
}

const COBOL_RULES: &str = "\
You are a senior IBM Mainframe COBOL engineer.

MANDATORY RULES (STRICT)
- Explain ONLY what is explicitly present in the IR.
- Treat this as STATIC CODE ANALYSIS, not program execution.
- Do NOT assume runtime values or evaluate conditions.
- Do NOT invent missing statements, paragraphs, or logic.
- Do NOT reference line numbers.
- Give a numeric example ONLY for operations listed under ARITHMETIC OPERATIONS.
";

const COBOL_TASK: &str = "
TASK
1. Describe the overall program purpose at a high level.
2. Explain the program flow using semantic blocks, not line by line.
3. Explain conditional logic as possible branches if CONTROL FLOW STRUCTURE appears above.
4. Describe file handling if FILE OPERATIONS appears above.
5. Do not mention sections that do not appear above.
";

/// Build the COBOL prompt. Sections without data are left out entirely.
pub fn cobol_prompt(ir: &CobolIr) -> Result<String, ExplainError> {
    let mut prompt = String::from(COBOL_RULES);
    let _ = write!(
        prompt,
        "\nCOBOL PROGRAM NAME:\n{}\n\nEXECUTABLE STRUCTURE:\n{}\n",
        ir.program_id().unwrap_or("UNKNOWN"),
        to_json(&ir.statements)?
    );
    if !ir.control_flow.is_empty() {
        let _ = write!(prompt, "\nCONTROL FLOW STRUCTURE:\n{}\n", to_json(&ir.control_flow)?);
    }
    if !ir.file_operations.is_empty() {
        let _ = write!(prompt, "\nFILE OPERATIONS:\n{}\n", to_json(&ir.file_operations)?);
    }
    let arithmetic: Vec<_> = ir.statements.iter().filter(|s| s.kind.is_arithmetic()).collect();
    if !arithmetic.is_empty() {
        let _ = write!(prompt, "\nARITHMETIC OPERATIONS:\n{}\n", to_json(&arithmetic)?);
    }
    prompt.push_str(COBOL_TASK);
    Ok(prompt)
}
