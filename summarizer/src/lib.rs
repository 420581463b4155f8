//! Aggregate counts and Markdown reports over legacysleuth IR.

mod markdown;

use legacysleuth_parser::ir::{CobolIr, ControlFlowKind, Division};
use legacysleuth_parser::Ir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub use markdown::{render_cobol_markdown, render_jcl_markdown};

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("invalid IR JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("report is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Counts and groupings over a COBOL IR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub program_id: String,
    pub divisions_present: Vec<Division>,
    pub total_variables: usize,
    pub total_statements: usize,
    pub statement_types: BTreeMap<String, usize>,
    pub total_conditions: usize,
    pub if_statements: usize,
    pub perform_statements: usize,
    pub evaluate_statements: usize,
    pub goto_statements: usize,
    pub total_file_operations: usize,
    pub file_operation_types: BTreeMap<String, usize>,
    pub total_paragraphs: usize,
    pub total_performs: usize,
    pub warnings: Vec<String>,
}

pub fn summarize(ir: &CobolIr) -> Summary {
    let mut statement_types = BTreeMap::new();
    for stmt in &ir.statements {
        *statement_types.entry(stmt.kind.name().to_string()).or_insert(0) += 1;
    }
    let mut file_operation_types = BTreeMap::new();
    for op in &ir.file_operations {
        *file_operation_types.entry(op.operation.name().to_string()).or_insert(0) += 1;
    }
    let count_cf = |pred: fn(&ControlFlowKind) -> bool| ir.control_flow.iter().filter(|c| pred(&c.kind)).count();

    Summary {
        program_id: ir.program_id().unwrap_or("UNKNOWN").to_string(),
        divisions_present: ir.divisions.keys().copied().collect(),
        total_variables: ir.variables.len(),
        total_statements: ir.statements.len(),
        statement_types,
        total_conditions: ir.conditions.len(),
        if_statements: count_cf(|k| matches!(k, ControlFlowKind::If { .. })),
        perform_statements: count_cf(|k| matches!(k, ControlFlowKind::Perform { .. })),
        evaluate_statements: count_cf(|k| matches!(k, ControlFlowKind::Evaluate { .. })),
        goto_statements: count_cf(|k| matches!(k, ControlFlowKind::GoTo { .. })),
        total_file_operations: ir.file_operations.len(),
        file_operation_types,
        total_paragraphs: ir.paragraphs.len(),
        total_performs: ir.performs.len(),
        warnings: ir.warnings.clone(),
    }
}

/// Render a Markdown report for an IR already in memory.
pub fn render(ir: &Ir) -> Result<String, SummarizeError> {
    let mut out = Vec::new();
    match ir {
        Ir::Cobol(cobol) => render_cobol_markdown(&mut out, cobol, &summarize(cobol))?,
        Ir::Jcl(jcl) => render_jcl_markdown(&mut out, jcl)?,
    }
    Ok(String::from_utf8(out)?)
}

/// Deserialize IR JSON of either shape and render its Markdown report.
pub fn summarize_ir(ir_json: &str) -> Result<String, SummarizeError> {
    let ir: Ir = serde_json::from_str(ir_json)?;
    tracing::debug!(
        kind = match &ir {
            Ir::Cobol(_) => "cobol",
            Ir::Jcl(_) => "jcl",
        },
        "rendering report"
    );
    render(&ir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use legacysleuth_parser::cobol;

    const SAMPLE: &str = r#"
       IDENTIFICATION DIVISION.
       PROGRAM-ID. COUNTS.
       DATA DIVISION.
       WORKING-STORAGE SECTION.
       01 A PIC 9.
       01 B PIC 9.
       PROCEDURE DIVISION.
       MAIN-PARA.
           DISPLAY "START".
           IF A > B
               DISPLAY "BIGGER"
           END-IF.
           EVALUATE A
           PERFORM WORK-PARA.
           GO TO END-PARA.
           OPEN INPUT F.
           READ F.
           READ F.
       WORK-PARA.
           MOVE A TO B.
       END-PARA.
           STOP RUN.
    "#;

    #[test]
    fn counts_follow_ir() {
        let summary = summarize(&cobol::extract(SAMPLE));
        assert_eq!(summary.program_id, "COUNTS");
        assert_eq!(
            summary.divisions_present,
            vec![Division::Identification, Division::Data, Division::Procedure]
        );
        assert_eq!(summary.total_variables, 2);
        assert_eq!(summary.statement_types.get("DISPLAY"), Some(&2));
        assert_eq!(summary.statement_types.get("MOVE"), Some(&1));
        assert_eq!(summary.statement_types.get("STOP"), Some(&1));
        assert_eq!(summary.total_statements, 4);
        assert_eq!(summary.if_statements, 1);
        assert_eq!(summary.evaluate_statements, 1);
        assert_eq!(summary.perform_statements, 1);
        assert_eq!(summary.goto_statements, 1);
        assert_eq!(summary.total_conditions, 1);
        assert_eq!(summary.file_operation_types.get("READ"), Some(&2));
        assert_eq!(summary.total_file_operations, 3);
        assert_eq!(summary.total_paragraphs, 3);
        assert_eq!(summary.total_performs, 1);
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn missing_program_id_defaults() {
        let summary = summarize(&CobolIr::default());
        assert_eq!(summary.program_id, "UNKNOWN");
        assert_eq!(summary.total_statements, 0);
    }

    #[test]
    fn summarize_ir_rejects_garbage() {
        assert!(matches!(summarize_ir("{\"nope\": 1}"), Err(SummarizeError::Json(_))));
    }
}
