//! IR shapes produced by the extractors.
//!
//! The COBOL and JCL IRs are deliberately unrelated records. Sequences keep
//! source order, and every record that carries a synthetic id derives it from
//! the 1-based line number of the normalized source.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

pub const DECLARATIVE_ONLY_WARNING: &str =
    "No executable logic detected. Program may be declarative only.";
pub const NO_JOB_CARD_WARNING: &str = "No JOB card found";

/// Either IR, as handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ir {
    Jcl(JclIr),
    Cobol(CobolIr),
}

impl Ir {
    pub fn warnings(&self) -> &[String] {
        match self {
            Ir::Cobol(ir) => &ir.warnings,
            Ir::Jcl(ir) => &ir.warnings,
        }
    }
}

impl From<CobolIr> for Ir {
    fn from(ir: CobolIr) -> Self {
        Ir::Cobol(ir)
    }
}

impl From<JclIr> for Ir {
    fn from(ir: JclIr) -> Self {
        Ir::Jcl(ir)
    }
}

// ---------------------------------------------------------------------------
// COBOL
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CobolIr {
    pub program_info: ProgramInfo,
    pub divisions: BTreeMap<Division, bool>,
    pub variables: Vec<Variable>,
    pub paragraphs: Vec<Paragraph>,
    pub statements: Vec<Statement>,
    pub control_flow: Vec<ControlFlow>,
    pub conditions: Vec<String>,
    pub file_operations: Vec<FileOperation>,
    pub performs: Vec<Perform>,
    pub warnings: Vec<String>,
}

impl CobolIr {
    /// True when none of the executable passes found anything.
    pub fn is_declarative_only(&self) -> bool {
        self.statements.is_empty() && self.control_flow.is_empty() && self.file_operations.is_empty()
    }

    pub fn program_id(&self) -> Option<&str> {
        self.program_info.program_id.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
}

/// The four canonical divisions, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Division {
    #[serde(rename = "identification_division")]
    Identification,
    #[serde(rename = "environment_division")]
    Environment,
    #[serde(rename = "data_division")]
    Data,
    #[serde(rename = "procedure_division")]
    Procedure,
}

impl Division {
    pub const ALL: [Division; 4] = [
        Division::Identification,
        Division::Environment,
        Division::Data,
        Division::Procedure,
    ];

    /// Header text as it appears in normalized source.
    pub fn header(self) -> &'static str {
        match self {
            Division::Identification => "IDENTIFICATION DIVISION",
            Division::Environment => "ENVIRONMENT DIVISION",
            Division::Data => "DATA DIVISION",
            Division::Procedure => "PROCEDURE DIVISION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub level: String,
    pub name: String,
    pub picture: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: String,
    pub name: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub id: String,
    pub line: usize,
    #[serde(flatten)]
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementKind {
    Display { value: String },
    Accept { target: String },
    Move { from: String, to: String },
    Compute { target: String, expression: String },
    Add { operands: String, result: String },
    Multiply { left: String, right: String, result: String },
    Stop,
}

impl StatementKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatementKind::Display { .. } => "DISPLAY",
            StatementKind::Accept { .. } => "ACCEPT",
            StatementKind::Move { .. } => "MOVE",
            StatementKind::Compute { .. } => "COMPUTE",
            StatementKind::Add { .. } => "ADD",
            StatementKind::Multiply { .. } => "MULTIPLY",
            StatementKind::Stop => "STOP",
        }
    }

    /// Arithmetic verbs get a worked example in the explanation prompt.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            StatementKind::Compute { .. } | StatementKind::Add { .. } | StatementKind::Multiply { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFlow {
    pub id: String,
    pub line: usize,
    #[serde(flatten)]
    pub kind: ControlFlowKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlFlowKind {
    If { condition: String },
    Perform { target: String },
    Evaluate { expression: String },
    GoTo { target: String },
}

impl ControlFlowKind {
    pub fn name(&self) -> &'static str {
        match self {
            ControlFlowKind::If { .. } => "IF",
            ControlFlowKind::Perform { .. } => "PERFORM",
            ControlFlowKind::Evaluate { .. } => "EVALUATE",
            ControlFlowKind::GoTo { .. } => "GO_TO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileOp {
    Open,
    Read,
    Write,
    Close,
    Delete,
    Rewrite,
}

impl FileOp {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "OPEN" => FileOp::Open,
            "READ" => FileOp::Read,
            "WRITE" => FileOp::Write,
            "CLOSE" => FileOp::Close,
            "DELETE" => FileOp::Delete,
            "REWRITE" => FileOp::Rewrite,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            FileOp::Open => "OPEN",
            FileOp::Read => "READ",
            FileOp::Write => "WRITE",
            FileOp::Close => "CLOSE",
            FileOp::Delete => "DELETE",
            FileOp::Rewrite => "REWRITE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOperation {
    pub operation: FileOp,
    pub line: usize,
}

/// One edge of the PERFORM call graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perform {
    pub id: String,
    pub target: String,
    pub line: usize,
}

// ---------------------------------------------------------------------------
// JCL
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JclIr {
    /// `{}` on the wire when the deck had no JOB card.
    #[serde(serialize_with = "job_or_empty", deserialize_with = "empty_or_job")]
    pub job: Option<JobCard>,
    pub steps: Vec<Step>,
    pub datasets: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCard {
    pub name: String,
    pub class: Option<String>,
    pub msgclass: Option<String>,
    pub notify: Option<String>,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub program: Option<String>,
    pub procedure: Option<String>,
    pub cond: Option<String>,
    pub dds: Vec<DdEntry>,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdEntry {
    pub name: String,
    pub dsn: Option<String>,
    pub disp: Option<String>,
    #[serde(rename = "type")]
    pub dd_type: DdType,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DdType {
    Sysout,
    Dummy,
    Dataset,
    Inline,
    Unknown,
}

impl DdType {
    pub fn name(self) -> &'static str {
        match self {
            DdType::Sysout => "SYSOUT",
            DdType::Dummy => "DUMMY",
            DdType::Dataset => "DATASET",
            DdType::Inline => "INLINE",
            DdType::Unknown => "UNKNOWN",
        }
    }
}

fn job_or_empty<S: Serializer>(job: &Option<JobCard>, serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    match job {
        Some(card) => card.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

fn empty_or_job<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<JobCard>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum JobField {
        Card(JobCard),
        Empty {},
    }
    Ok(match Option::<JobField>::deserialize(deserializer)? {
        Some(JobField::Card(card)) => Some(card),
        Some(JobField::Empty {}) | None => None,
    })
}
