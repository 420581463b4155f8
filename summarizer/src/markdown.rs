use crate::Summary;
use chrono::Utc;
use legacysleuth_parser::ir::{CobolIr, ControlFlowKind, JclIr, Paragraph};
use std::collections::{BTreeSet, HashSet};
use std::io::{self, Write};

/// Write the COBOL program report.
pub fn render_cobol_markdown<W: Write>(out: &mut W, ir: &CobolIr, summary: &Summary) -> io::Result<()> {
    print_program_info(out, summary)?;
    print_variables(out, ir)?;
    print_paragraphs(out, ir)?;
    print_statement_counts(out, summary)?;
    print_conditions(out, ir)?;
    print_file_operations(out, summary)?;
    print_call_graph(out, ir)?;
    print_unused_paragraphs(out, ir)?;
    print_warnings(out, &summary.warnings)?;
    Ok(())
}

fn print_program_info<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(out, "# COBOL Program Summary\n")?;
    writeln!(out, "**Program ID:** {}", summary.program_id)?;
    writeln!(out, "**Generated:** {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    if summary.divisions_present.is_empty() {
        writeln!(out, "**Divisions:** None")?;
    } else {
        let names: Vec<_> = summary.divisions_present.iter().map(|d| d.header()).collect();
        writeln!(out, "**Divisions:** {}", names.join(", "))?;
    }
    writeln!(out, "\n---\n")?;
    Ok(())
}

fn print_variables<W: Write>(out: &mut W, ir: &CobolIr) -> io::Result<()> {
    writeln!(out, "## Variables\n")?;
    if ir.variables.is_empty() {
        writeln!(out, "_No PIC clauses found._")?;
    } else {
        writeln!(out, "| Level | Name | Picture |")?;
        writeln!(out, "|-------|------|---------|")?;
        for v in &ir.variables {
            writeln!(out, "| {} | **{}** | `{}` |", v.level, v.name, v.picture)?;
        }
    }
    writeln!(out, "\n---\n")?;
    Ok(())
}

fn print_paragraphs<W: Write>(out: &mut W, ir: &CobolIr) -> io::Result<()> {
    writeln!(out, "## Procedure Division\n")?;
    if ir.paragraphs.is_empty() {
        writeln!(out, "_No paragraphs found._")?;
    }
    for para in &ir.paragraphs {
        let next_line = ir
            .paragraphs
            .iter()
            .map(|p| p.line)
            .find(|&l| l > para.line)
            .unwrap_or(usize::MAX);
        writeln!(out, "#### Paragraph: **{}** (line {})", para.name, para.line)?;
        let mut any = false;
        for stmt in ir.statements.iter().filter(|s| s.line > para.line && s.line < next_line) {
            writeln!(out, "- **{}** (line {})", stmt.kind.name(), stmt.line)?;
            any = true;
        }
        for cf in ir.control_flow.iter().filter(|c| c.line > para.line && c.line < next_line) {
            writeln!(out, "- _{}_ (line {})", cf.kind.name(), cf.line)?;
            any = true;
        }
        if !any {
            writeln!(out, "_No logic here_")?;
        }
    }
    writeln!(out, "\n---\n")?;
    Ok(())
}

fn print_statement_counts<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(out, "## Statements\n")?;
    writeln!(out, "**Total statements:** {}\n", summary.total_statements)?;
    if !summary.statement_types.is_empty() {
        writeln!(out, "| Type | Count |")?;
        writeln!(out, "|------|-------|")?;
        for (kind, count) in &summary.statement_types {
            writeln!(out, "| {} | {} |", kind, count)?;
        }
    }
    writeln!(out, "\n### Control Flow\n")?;
    writeln!(out, "| IF | PERFORM | EVALUATE | GO TO |")?;
    writeln!(out, "|----|---------|----------|-------|")?;
    writeln!(
        out,
        "| {} | {} | {} | {} |",
        summary.if_statements, summary.perform_statements, summary.evaluate_statements, summary.goto_statements
    )?;
    writeln!(out, "\n---\n")?;
    Ok(())
}

fn print_conditions<W: Write>(out: &mut W, ir: &CobolIr) -> io::Result<()> {
    if ir.conditions.is_empty() {
        return Ok(());
    }
    writeln!(out, "## Conditions\n")?;
    for cond in &ir.conditions {
        writeln!(out, "- `{}`", cond.trim())?;
    }
    writeln!(out, "\n---\n")?;
    Ok(())
}

fn print_file_operations<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(out, "## File Operations\n")?;
    if summary.file_operation_types.is_empty() {
        writeln!(out, "_No file operations found._")?;
    } else {
        for (op, count) in &summary.file_operation_types {
            writeln!(out, "- **{}** x{}", op, count)?;
        }
    }
    writeln!(out, "\n---\n")?;
    Ok(())
}

/// The paragraph whose label is the last one at or before `line`.
fn enclosing_paragraph(paragraphs: &[Paragraph], line: usize) -> Option<&Paragraph> {
    paragraphs.iter().take_while(|p| p.line <= line).last()
}

fn sanitize_node_id(name: &str) -> String {
    if name.is_empty() {
        return "UNKNOWN".to_string();
    }
    let mut sanitized: String = name
        .chars()
        .take(30)
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.chars().next().map_or(false, |c| c.is_numeric()) {
        sanitized.insert(0, '_');
    }
    sanitized
}

fn print_call_graph<W: Write>(out: &mut W, ir: &CobolIr) -> io::Result<()> {
    writeln!(out, "## Call Graph\n")?;
    if ir.performs.is_empty() {
        writeln!(out, "_No PERFORM targets found._")?;
        writeln!(out, "\n---\n")?;
        return Ok(());
    }

    let edges: Vec<(&str, &str, usize)> = ir
        .performs
        .iter()
        .map(|p| {
            let from = enclosing_paragraph(&ir.paragraphs, p.line).map_or("MAIN", |para| para.name.as_str());
            (from, p.target.as_str(), p.line)
        })
        .collect();

    writeln!(out, "```mermaid")?;
    writeln!(out, "flowchart TD")?;
    let mut seen = HashSet::new();
    for (from, to, _) in &edges {
        if seen.insert((*from, *to)) {
            writeln!(out, "    {} --> {}", sanitize_node_id(from), sanitize_node_id(to))?;
        }
    }
    writeln!(out, "```")?;

    writeln!(out, "\n| **From** | **To** | **Line** |")?;
    writeln!(out, "|------|----|------|")?;
    for (from, to, line) in &edges {
        writeln!(out, "| **{}** | **{}** | {} |", from, to, line)?;
    }
    writeln!(out, "\n---\n")?;
    Ok(())
}

fn print_unused_paragraphs<W: Write>(out: &mut W, ir: &CobolIr) -> io::Result<()> {
    let mut called: BTreeSet<&str> = ir.performs.iter().map(|p| p.target.as_str()).collect();
    for cf in &ir.control_flow {
        if let ControlFlowKind::GoTo { target } = &cf.kind {
            called.insert(target.as_str());
        }
    }

    // Control enters at the first paragraph without being called.
    let unused: Vec<&Paragraph> = ir
        .paragraphs
        .iter()
        .skip(1)
        .filter(|p| !called.contains(p.name.as_str()))
        .collect();

    writeln!(out, "## Unused Paragraphs\n")?;
    if unused.is_empty() {
        writeln!(out, "_No unused paragraphs found._")?;
    } else {
        writeln!(out, "**The following paragraphs are not the target of any PERFORM or GO TO:**\n")?;
        for para in unused {
            writeln!(out, "- **{}** _(line {})_", para.name, para.line)?;
        }
    }
    writeln!(out, "\n---\n")?;
    Ok(())
}

fn print_warnings<W: Write>(out: &mut W, warnings: &[String]) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    writeln!(out, "## Warnings\n")?;
    for w in warnings {
        writeln!(out, "> {}", w)?;
    }
    Ok(())
}

/// Write the JCL job report.
pub fn render_jcl_markdown<W: Write>(out: &mut W, ir: &JclIr) -> io::Result<()> {
    writeln!(out, "# JCL Job Summary\n")?;
    match &ir.job {
        Some(job) => {
            writeln!(out, "**Job Name:** {}", job.name)?;
            writeln!(out, "**Class:** {}", job.class.as_deref().unwrap_or("-"))?;
            writeln!(out, "**Message Class:** {}", job.msgclass.as_deref().unwrap_or("-"))?;
            writeln!(out, "**Notify:** {}", job.notify.as_deref().unwrap_or("-"))?;
        }
        None => writeln!(out, "_No JOB card._")?,
    }
    writeln!(out, "**Generated:** {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "\n---\n")?;

    writeln!(out, "## Steps\n")?;
    writeln!(out, "| Step | Program | Procedure | COND | DDs |")?;
    writeln!(out, "|------|---------|-----------|------|-----|")?;
    for step in &ir.steps {
        writeln!(
            out,
            "| **{}** | {} | {} | {} | {} |",
            step.name,
            step.program.as_deref().unwrap_or(""),
            step.procedure.as_deref().unwrap_or(""),
            step.cond.as_deref().unwrap_or(""),
            step.dds.len()
        )?;
    }

    for step in ir.steps.iter().filter(|s| !s.dds.is_empty()) {
        writeln!(out, "\n### {}\n", step.name)?;
        writeln!(out, "| DD | Type | DSN | DISP |")?;
        writeln!(out, "|----|------|-----|------|")?;
        for dd in &step.dds {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                dd.name,
                dd.dd_type.name(),
                dd.dsn.as_deref().unwrap_or(""),
                dd.disp.as_deref().unwrap_or("")
            )?;
        }
    }
    writeln!(out, "\n---\n")?;

    writeln!(out, "## Datasets\n")?;
    if ir.datasets.is_empty() {
        writeln!(out, "_No datasets referenced._")?;
    } else {
        for dsn in &ir.datasets {
            writeln!(out, "- `{}`", dsn)?;
        }
    }
    writeln!(out, "\n---\n")?;
    print_warnings(out, &ir.warnings)
}
