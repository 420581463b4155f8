//! Line-oriented COBOL extraction.
//!
//! Each pass scans the normalized text on its own and appends to the IR. No
//! pass looks at another pass's output. A statement split over several
//! physical lines is matched one line at a time.

use crate::ir::{
    CobolIr, ControlFlow, ControlFlowKind, Division, FileOp, FileOperation, Paragraph, Perform, Statement,
    StatementKind, Variable, DECLARATIVE_ONLY_WARNING,
};
use crate::normalize::normalize;
use crate::patterns::{self, capture};
use crate::{Extractor, Language, ParseError};
use regex::Captures;
use tracing::{debug, trace, warn};

/// Extract a COBOL IR from raw source text. Never fails.
pub fn extract(source: &str) -> CobolIr {
    let code = normalize(source);
    let lines: Vec<&str> = code.split('\n').collect();
    let mut ir = CobolIr::default();

    extract_program_info(&code, &mut ir);
    extract_divisions(&code, &mut ir);
    extract_variables(&code, &mut ir);
    extract_paragraphs(&lines, &mut ir);
    extract_statements(&lines, &mut ir);
    extract_control_flow(&lines, &mut ir);
    extract_file_operations(&lines, &mut ir);
    extract_performs(&lines, &mut ir);

    if ir.is_declarative_only() {
        warn!("{}", DECLARATIVE_ONLY_WARNING);
        ir.warnings.push(DECLARATIVE_ONLY_WARNING.to_string());
    }

    debug!(
        program_id = ir.program_id().unwrap_or("UNKNOWN"),
        variables = ir.variables.len(),
        paragraphs = ir.paragraphs.len(),
        statements = ir.statements.len(),
        control_flow = ir.control_flow.len(),
        file_operations = ir.file_operations.len(),
        performs = ir.performs.len(),
        "extracted COBOL IR"
    );
    ir
}

/// Stateful wrapper that remembers the last IR it produced.
#[derive(Debug, Default)]
pub struct CobolExtractor {
    ir: CobolIr,
}

impl CobolExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Extractor for CobolExtractor {
    type Ir = CobolIr;

    fn language(&self) -> Language {
        Language::Cobol
    }

    fn parse(&mut self, source: &str) -> Result<CobolIr, ParseError> {
        self.ir = extract(source);
        Ok(self.ir.clone())
    }

    fn ir(&self) -> &CobolIr {
        &self.ir
    }
}

fn extract_program_info(code: &str, ir: &mut CobolIr) {
    ir.program_info.program_id = capture(&patterns::PROGRAM_ID, code);
}

fn extract_divisions(code: &str, ir: &mut CobolIr) {
    for division in Division::ALL {
        if code.contains(division.header()) {
            ir.divisions.insert(division, true);
        }
    }
}

fn extract_variables(code: &str, ir: &mut CobolIr) {
    for caps in patterns::VARIABLE.captures_iter(code) {
        let variable = Variable {
            level: caps[1].to_string(),
            name: caps[2].to_string(),
            picture: caps[4].to_string(),
        };
        trace!(?variable, "variable");
        ir.variables.push(variable);
    }
}

fn extract_paragraphs(lines: &[&str], ir: &mut CobolIr) {
    let mut in_procedure = false;

    for (i, line) in lines.iter().enumerate() {
        if line.contains(Division::Procedure.header()) {
            in_procedure = true;
            continue;
        }
        if !in_procedure || line.contains("SECTION") {
            continue;
        }
        let Some(name) = capture(&patterns::PARAGRAPH, line) else {
            continue;
        };
        if patterns::NOT_PARAGRAPHS.contains(&name.as_str()) {
            continue;
        }
        let line_no = i + 1;
        trace!(%name, line = line_no, "paragraph");
        ir.paragraphs.push(Paragraph { id: format!("PARA_{line_no}"), name, line: line_no });
    }
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index).map(|m| m.as_str().to_string()).unwrap_or_default()
}

/// Match one line against the statement patterns, first hit wins.
fn match_statement(line: &str) -> Option<StatementKind> {
    if let Some(caps) = patterns::DISPLAY.captures(line) {
        return Some(StatementKind::Display { value: group(&caps, 1) });
    }
    if let Some(caps) = patterns::ACCEPT.captures(line) {
        return Some(StatementKind::Accept { target: group(&caps, 1) });
    }
    if let Some(caps) = patterns::MOVE.captures(line) {
        return Some(StatementKind::Move { from: group(&caps, 1), to: group(&caps, 2) });
    }
    if let Some(caps) = patterns::COMPUTE.captures(line) {
        return Some(StatementKind::Compute { target: group(&caps, 1), expression: group(&caps, 2) });
    }
    if let Some(caps) = patterns::ADD.captures(line) {
        return Some(StatementKind::Add { operands: group(&caps, 1), result: group(&caps, 2) });
    }
    if let Some(caps) = patterns::MULTIPLY.captures(line) {
        return Some(StatementKind::Multiply {
            left: group(&caps, 1),
            right: group(&caps, 2),
            result: group(&caps, 3),
        });
    }
    if line.contains(patterns::STOP_RUN) {
        return Some(StatementKind::Stop);
    }
    None
}

fn extract_statements(lines: &[&str], ir: &mut CobolIr) {
    for (i, line) in lines.iter().enumerate() {
        if let Some(kind) = match_statement(line) {
            let line_no = i + 1;
            trace!(kind = kind.name(), line = line_no, "statement");
            ir.statements.push(Statement { id: format!("STMT_{line_no}"), line: line_no, kind });
        }
    }
}

/// Match one line against the control-flow patterns, first hit wins.
fn match_control_flow(line: &str) -> Option<ControlFlowKind> {
    if let Some(caps) = patterns::IF.captures(line) {
        return Some(ControlFlowKind::If { condition: group(&caps, 1) });
    }
    if let Some(caps) = patterns::PERFORM.captures(line) {
        return Some(ControlFlowKind::Perform { target: group(&caps, 1) });
    }
    if let Some(caps) = patterns::EVALUATE.captures(line) {
        return Some(ControlFlowKind::Evaluate { expression: group(&caps, 1) });
    }
    if let Some(caps) = patterns::GO_TO.captures(line) {
        return Some(ControlFlowKind::GoTo { target: group(&caps, 1) });
    }
    None
}

fn extract_control_flow(lines: &[&str], ir: &mut CobolIr) {
    for (i, line) in lines.iter().enumerate() {
        let Some(kind) = match_control_flow(line) else {
            continue;
        };
        let line_no = i + 1;
        if let ControlFlowKind::If { condition } = &kind {
            ir.conditions.push(condition.clone());
        }
        trace!(kind = kind.name(), line = line_no, "control flow");
        ir.control_flow.push(ControlFlow { id: format!("CF_{line_no}"), line: line_no, kind });
    }
}

fn extract_file_operations(lines: &[&str], ir: &mut CobolIr) {
    for (i, line) in lines.iter().enumerate() {
        let operation = capture(&patterns::FILE_OP, line).and_then(|kw| FileOp::from_keyword(&kw));
        if let Some(operation) = operation {
            ir.file_operations.push(FileOperation { operation, line: i + 1 });
        }
    }
}

/// Call-graph view of PERFORM, kept apart from the control-flow records.
fn extract_performs(lines: &[&str], ir: &mut CobolIr) {
    for (i, line) in lines.iter().enumerate() {
        if let Some(target) = capture(&patterns::PERFORM_TARGET, line) {
            let line_no = i + 1;
            ir.performs.push(Perform { id: format!("PERFORM_{line_no}"), target, line: line_no });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "IDENTIFICATION DIVISION.\nPROGRAM-ID. HELLO-WORLD.\nDATA DIVISION.\nWORKING-STORAGE SECTION.\n01 NUM1 PIC 9(2).\nPROCEDURE DIVISION.\nMAIN-PARA.\n DISPLAY \"HELLO\".\n PERFORM CALC-PARA.\n STOP RUN.\nCALC-PARA.\n DISPLAY RESULT.";

    const FULL: &str = r#"
       IDENTIFICATION DIVISION.
       PROGRAM-ID. HELLO-WORLD.

       DATA DIVISION.
       WORKING-STORAGE SECTION.
       01 NUM1 PIC 9(2).
       01 NUM2 PIC 9(2).
       01 RESULT PIC 9(3).

       PROCEDURE DIVISION.
       MAIN-PARA.
           DISPLAY "HELLO".
           ACCEPT NUM1.
           MOVE NUM1 TO NUM2.
           COMPUTE RESULT = NUM1 + NUM2.
           ADD NUM1 NUM2 GIVING RESULT.
           MULTIPLY NUM1 BY NUM2 GIVING RESULT.
           IF NUM1 > NUM2
               DISPLAY "NUM1 GREATER"
           END-IF.
           PERFORM CALC-PARA.
           STOP RUN.

       CALC-PARA.
           DISPLAY RESULT.
    "#;

    fn statement_names(ir: &CobolIr) -> Vec<&'static str> {
        ir.statements.iter().map(|s| s.kind.name()).collect()
    }

    #[test]
    fn hello_world_sample() {
        let ir = extract(HELLO);
        assert_eq!(ir.program_id(), Some("HELLO-WORLD"));
        assert_eq!(ir.divisions.get(&Division::Identification), Some(&true));
        assert_eq!(ir.divisions.get(&Division::Data), Some(&true));
        assert_eq!(ir.divisions.get(&Division::Procedure), Some(&true));
        assert!(!ir.divisions.contains_key(&Division::Environment));

        assert_eq!(ir.variables.len(), 1);
        assert_eq!(ir.variables[0], Variable {
            level: "01".to_string(),
            name: "NUM1".to_string(),
            picture: "9(2)".to_string(),
        });

        let paragraphs: Vec<_> = ir.paragraphs.iter().map(|p| (p.id.as_str(), p.name.as_str())).collect();
        assert_eq!(paragraphs, vec![("PARA_7", "MAIN-PARA"), ("PARA_11", "CALC-PARA")]);

        assert_eq!(statement_names(&ir), vec!["DISPLAY", "STOP", "DISPLAY"]);
        assert_eq!(ir.performs, vec![Perform {
            id: "PERFORM_9".to_string(),
            target: "CALC-PARA".to_string(),
            line: 9,
        }]);
        assert!(ir.warnings.is_empty());
    }

    #[test]
    fn every_statement_kind() {
        let ir = extract(FULL);
        assert_eq!(
            statement_names(&ir),
            vec!["DISPLAY", "ACCEPT", "MOVE", "COMPUTE", "ADD", "MULTIPLY", "DISPLAY", "STOP", "DISPLAY"]
        );
        let kinds: Vec<_> = ir.statements.iter().map(|s| &s.kind).collect();
        assert_eq!(kinds[2], &StatementKind::Move { from: "NUM1".to_string(), to: "NUM2".to_string() });
        assert_eq!(kinds[3], &StatementKind::Compute {
            target: "RESULT".to_string(),
            expression: "NUM1 + NUM2".to_string(),
        });
        assert_eq!(kinds[4], &StatementKind::Add {
            operands: "NUM1 NUM2".to_string(),
            result: "RESULT".to_string(),
        });
        assert_eq!(kinds[5], &StatementKind::Multiply {
            left: "NUM1".to_string(),
            right: "NUM2".to_string(),
            result: "RESULT".to_string(),
        });
        for stmt in &ir.statements {
            assert_eq!(stmt.id, format!("STMT_{}", stmt.line));
        }
    }

    #[test]
    fn control_flow_and_conditions() {
        let ir = extract(FULL);
        let kinds: Vec<_> = ir.control_flow.iter().map(|c| c.kind.name()).collect();
        assert_eq!(kinds, vec!["IF", "PERFORM"]);
        assert_eq!(ir.conditions, vec!["NUM1 > NUM2".to_string()]);
        assert_eq!(ir.control_flow[1].kind, ControlFlowKind::Perform { target: "CALC-PARA".to_string() });
        assert_eq!(ir.control_flow[1].id, format!("CF_{}", ir.control_flow[1].line));
    }

    #[test]
    fn if_condition_stops_at_then() {
        let ir = extract("PROCEDURE DIVISION.\n    IF A > B THEN\n    END-IF.");
        assert_eq!(ir.conditions, vec!["A > B ".to_string()]);
    }

    #[test]
    fn control_flow_priority_is_first_match() {
        // IF wins over PERFORM on the same line; the perform graph still sees it.
        let ir = extract("PROCEDURE DIVISION.\n    IF X = 1 PERFORM P1.\n    EVALUATE TRUE\n    GO TO P2.");
        let kinds: Vec<_> = ir.control_flow.iter().map(|c| c.kind.name()).collect();
        assert_eq!(kinds, vec!["IF", "EVALUATE", "GO_TO"]);
        assert_eq!(ir.control_flow[1].kind, ControlFlowKind::Evaluate { expression: "TRUE".to_string() });
        assert_eq!(ir.control_flow[2].kind, ControlFlowKind::GoTo { target: "P2".to_string() });
        assert_eq!(ir.performs.len(), 1);
        assert_eq!(ir.performs[0].target, "P1");
    }

    #[test]
    fn statement_priority_is_first_match() {
        // DISPLAY outranks MOVE even when both appear.
        let ir = extract("    DISPLAY X MOVE A TO B.");
        assert_eq!(statement_names(&ir), vec!["DISPLAY"]);
    }

    #[test]
    fn statement_and_control_flow_passes_are_independent() {
        let ir = extract("    IF A = B DISPLAY \"EQ\".");
        assert_eq!(statement_names(&ir), vec!["DISPLAY"]);
        assert_eq!(ir.control_flow.len(), 1);
        assert_eq!(ir.statements[0].line, ir.control_flow[0].line);
    }

    #[test]
    fn move_without_period_is_skipped() {
        let ir = extract("PROCEDURE DIVISION.\n    MOVE A TO B\n    STOP RUN.");
        assert_eq!(statement_names(&ir), vec!["STOP"]);
    }

    #[test]
    fn file_operations_first_keyword_per_line() {
        let src = "
       PROCEDURE DIVISION.
           OPEN INPUT MYFILE.
           READ MYFILE.
           CLOSE MYFILE.
           REWRITE REC.
           STOP RUN.
        ";
        let ir = extract(src);
        let ops: Vec<_> = ir.file_operations.iter().map(|f| f.operation).collect();
        assert_eq!(ops, vec![FileOp::Open, FileOp::Read, FileOp::Close, FileOp::Rewrite]);
        let one_line = extract("    OPEN INPUT F READ F.");
        assert_eq!(one_line.file_operations.len(), 1);
        assert_eq!(one_line.file_operations[0].operation, FileOp::Open);
    }

    #[test]
    fn file_op_keyword_needs_word_boundaries() {
        let ir = extract("    MOVE READY TO OPENED.");
        assert!(ir.file_operations.is_empty());
    }

    #[test]
    fn paragraphs_need_procedure_division() {
        let ir = extract("IDENTIFICATION DIVISION.\nPROGRAM-ID. X.\nMAIN-PARA.");
        assert!(ir.paragraphs.is_empty());
    }

    #[test]
    fn paragraphs_skip_sections_and_terminators() {
        let src = "PROCEDURE DIVISION.\nMAIN SECTION.\nP1.\n    IF A\n    ELSE.\n    END-IF.\nEND-PERFORM.\nP2.";
        let ir = extract(src);
        let names: Vec<_> = ir.paragraphs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P2"]);
    }

    #[test]
    fn lowercase_source_is_folded() {
        let ir = extract("identification division.\nprogram-id. lower-case.\nprocedure division.\nmain.\n    stop run.");
        assert_eq!(ir.program_id(), Some("LOWER-CASE"));
        assert_eq!(ir.paragraphs[0].name, "MAIN");
        assert_eq!(statement_names(&ir), vec!["STOP"]);
    }

    #[test]
    fn line_numbers_follow_normalized_text() {
        let ir = extract("      * header comment\nPROCEDURE DIVISION.\n    STOP RUN.");
        assert_eq!(ir.statements[0].line, 2);
    }

    #[test]
    fn fixed_format_sequence_numbers() {
        let src = "000100 IDENTIFICATION DIVISION.\n000200 PROGRAM-ID. SEQTEST.\n000300 PROCEDURE DIVISION.\n000400 MAIN-PARA.\n000500     STOP RUN.";
        let ir = extract(src);
        assert_eq!(ir.program_id(), Some("SEQTEST"));
        assert_eq!(ir.paragraphs[0].name, "MAIN-PARA");
        assert_eq!(ir.statements.len(), 1);
    }

    #[test]
    fn picture_keyword_long_form() {
        let ir = extract("       05 WS-AMOUNT PICTURE S9(7)V99.");
        assert_eq!(ir.variables[0].level, "05");
        assert_eq!(ir.variables[0].picture, "S9(7)V99");
    }

    #[test]
    fn declarative_only_warns_once() {
        let src = "
       IDENTIFICATION DIVISION.
       PROGRAM-ID. EMPTYPROG.
       DATA DIVISION.
       WORKING-STORAGE SECTION.
       01 A PIC 9.
        ";
        let ir = extract(src);
        assert_eq!(ir.warnings, vec![DECLARATIVE_ONLY_WARNING.to_string()]);
        assert_eq!(ir.program_id(), Some("EMPTYPROG"));
    }

    #[test]
    fn empty_source() {
        let ir = extract("");
        assert!(ir.program_info.program_id.is_none());
        assert!(ir.divisions.is_empty());
        assert_eq!(ir.warnings.len(), 1);
    }

    #[test]
    fn extractor_resets_between_calls() {
        let mut extractor = CobolExtractor::new();
        assert_eq!(extractor.ir(), &CobolIr::default());
        let first = extractor.parse(FULL).unwrap();
        assert_eq!(extractor.ir(), &first);
        let second = extractor.parse("PROGRAM-ID. OTHER.").unwrap();
        assert_eq!(second.program_id(), Some("OTHER"));
        assert!(second.statements.is_empty());
        assert!(second.variables.is_empty());
        assert_eq!(extractor.ir(), &second);
        assert_eq!(extractor.language(), Language::Cobol);
    }
}
