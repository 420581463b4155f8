//! JCL card decomposition: one JOB card, EXEC steps, and the DD cards that
//! follow each step.

use crate::ir::{DdEntry, DdType, JclIr, JobCard, Step, NO_JOB_CARD_WARNING};
use crate::patterns::{self, capture};
use crate::{Extractor, Language, ParseError};
use tracing::{debug, trace, warn};

/// Extract a JCL IR from a job deck.
///
/// A deck without any EXEC card is rejected with [`ParseError::NoExecSteps`];
/// a missing JOB card only produces a warning.
pub fn extract(source: &str) -> Result<JclIr, ParseError> {
    let mut ir = JclIr::default();

    for line in source.lines() {
        let line = line.trim_end();
        if !line.starts_with(patterns::JCL_MARKER) {
            continue;
        }

        if line.contains(patterns::JOB_CARD) {
            let job = parse_job_card(line);
            trace!(name = %job.name, "JOB card");
            ir.job = Some(job);
        } else if line.contains(patterns::EXEC_CARD) {
            let step = parse_exec_card(line);
            trace!(name = %step.name, "EXEC card");
            ir.steps.push(step);
        } else if line.contains(patterns::DD_CARD) {
            // DD cards before the first EXEC have no owner.
            let Some(step) = ir.steps.last_mut() else {
                continue;
            };
            let dd = parse_dd_card(line);
            trace!(name = %dd.name, step = %step.name, dd_type = dd.dd_type.name(), "DD card");
            if let Some(dsn) = &dd.dsn {
                ir.datasets.push(dsn.clone());
            }
            step.dds.push(dd);
        }
    }

    validate(&mut ir)?;
    debug!(
        job = ir.job.as_ref().map(|j| j.name.as_str()).unwrap_or("<none>"),
        steps = ir.steps.len(),
        datasets = ir.datasets.len(),
        "extracted JCL IR"
    );
    Ok(ir)
}

/// Stateful wrapper that remembers the last IR it produced.
#[derive(Debug, Default)]
pub struct JclExtractor {
    ir: JclIr,
}

impl JclExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Extractor for JclExtractor {
    type Ir = JclIr;

    fn language(&self) -> Language {
        Language::Jcl
    }

    fn parse(&mut self, source: &str) -> Result<JclIr, ParseError> {
        self.ir = JclIr::default();
        let ir = extract(source)?;
        self.ir = ir.clone();
        Ok(ir)
    }

    fn ir(&self) -> &JclIr {
        &self.ir
    }
}

/// First token after the `//` marker.
fn card_name(line: &str) -> String {
    line[patterns::JCL_MARKER.len()..]
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn parse_job_card(line: &str) -> JobCard {
    JobCard {
        name: card_name(line),
        class: capture(&patterns::JOB_CLASS, line),
        msgclass: capture(&patterns::JOB_MSGCLASS, line),
        notify: capture(&patterns::JOB_NOTIFY, line),
        raw: line.to_string(),
    }
}

fn parse_exec_card(line: &str) -> Step {
    Step {
        name: card_name(line),
        program: capture(&patterns::EXEC_PGM, line),
        procedure: capture(&patterns::EXEC_PROC, line),
        cond: capture(&patterns::EXEC_COND, line),
        dds: Vec::new(),
        raw: line.to_string(),
    }
}

fn parse_dd_card(line: &str) -> DdEntry {
    DdEntry {
        name: card_name(line),
        dsn: capture(&patterns::DD_DSN, line),
        disp: capture(&patterns::DD_DISP, line),
        dd_type: dd_type(line),
        raw: line.to_string(),
    }
}

fn dd_type(line: &str) -> DdType {
    if line.contains("SYSOUT=") {
        DdType::Sysout
    } else if line.contains("DUMMY") {
        DdType::Dummy
    } else if line.contains("DSN=") {
        DdType::Dataset
    } else if line.contains(" DD *") {
        DdType::Inline
    } else {
        DdType::Unknown
    }
}

fn validate(ir: &mut JclIr) -> Result<(), ParseError> {
    if ir.job.is_none() {
        warn!("{}", NO_JOB_CARD_WARNING);
        ir.warnings.push(NO_JOB_CARD_WARNING.to_string());
    }
    if ir.steps.is_empty() {
        return Err(ParseError::NoExecSteps);
    }
    Ok(())
}
