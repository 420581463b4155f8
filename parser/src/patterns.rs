//! Compiled patterns shared by the extractors.
//!
//! COBOL patterns run against normalized (uppercased) text. JCL cards are
//! matched as written.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

// COBOL structure
pub(crate) static PROGRAM_ID: Lazy<Regex> = Lazy::new(|| compile(r"PROGRAM-ID\.\s+([A-Z0-9\-]+)"));
pub(crate) static VARIABLE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?m)^\s*([0-9]{2})\s+([A-Z0-9\-]+)\s+(PIC|PICTURE)\s+([^\s\.]+)"));
pub(crate) static PARAGRAPH: Lazy<Regex> = Lazy::new(|| compile(r"^\s*([A-Z][A-Z0-9\-]*)\."));

/// Scope terminators that look like paragraph labels.
pub(crate) const NOT_PARAGRAPHS: [&str; 3] = ["END-IF", "ELSE", "END-PERFORM"];

// COBOL statements, tried in this order
pub(crate) static DISPLAY: Lazy<Regex> = Lazy::new(|| compile(r"\bDISPLAY\s+(.+?)(?:\.|$)"));
pub(crate) static ACCEPT: Lazy<Regex> = Lazy::new(|| compile(r"\bACCEPT\s+([A-Z0-9\-]+)"));
pub(crate) static MOVE: Lazy<Regex> = Lazy::new(|| compile(r"\bMOVE\s+(.+?)\s+TO\s+(.+?)\."));
pub(crate) static COMPUTE: Lazy<Regex> = Lazy::new(|| compile(r"\bCOMPUTE\s+(.+?)\s*=\s*(.+?)\."));
pub(crate) static ADD: Lazy<Regex> = Lazy::new(|| compile(r"\bADD\s+(.+?)\s+GIVING\s+(.+?)\."));
pub(crate) static MULTIPLY: Lazy<Regex> =
    Lazy::new(|| compile(r"\bMULTIPLY\s+(.+?)\s+BY\s+(.+?)\s+GIVING\s+(.+?)\."));
pub(crate) const STOP_RUN: &str = "STOP RUN";

// COBOL control flow, tried in this order
pub(crate) static IF: Lazy<Regex> = Lazy::new(|| compile(r"\bIF\s+(.+?)(?:THEN|$)"));
pub(crate) static PERFORM: Lazy<Regex> = Lazy::new(|| compile(r"\bPERFORM\s+(.+?)\."));
pub(crate) static EVALUATE: Lazy<Regex> = Lazy::new(|| compile(r"\bEVALUATE\s+(.+)"));
pub(crate) static GO_TO: Lazy<Regex> = Lazy::new(|| compile(r"\bGO\s+TO\s+([A-Z0-9\-]+)"));

pub(crate) static FILE_OP: Lazy<Regex> =
    Lazy::new(|| compile(r"\b(OPEN|READ|WRITE|CLOSE|DELETE|REWRITE)\b"));
pub(crate) static PERFORM_TARGET: Lazy<Regex> = Lazy::new(|| compile(r"\bPERFORM\s+([A-Z0-9\-]+)"));

// JCL cards
pub(crate) const JCL_MARKER: &str = "//";
pub(crate) const JOB_CARD: &str = " JOB ";
pub(crate) const EXEC_CARD: &str = " EXEC ";
pub(crate) const DD_CARD: &str = " DD ";

pub(crate) static JOB_CLASS: Lazy<Regex> = Lazy::new(|| compile(r"\bCLASS=([A-Z0-9])"));
pub(crate) static JOB_MSGCLASS: Lazy<Regex> = Lazy::new(|| compile(r"MSGCLASS=([A-Z0-9])"));
pub(crate) static JOB_NOTIFY: Lazy<Regex> = Lazy::new(|| compile(r"NOTIFY=([A-Z0-9_.]+)"));
pub(crate) static EXEC_PGM: Lazy<Regex> = Lazy::new(|| compile(r"PGM=([A-Z0-9$#@.]+)"));
pub(crate) static EXEC_PROC: Lazy<Regex> = Lazy::new(|| compile(r"PROC=([A-Z0-9]+)"));
pub(crate) static EXEC_COND: Lazy<Regex> = Lazy::new(|| compile(r"COND=([^,]+)"));
pub(crate) static DD_DSN: Lazy<Regex> = Lazy::new(|| compile(r"DSN=([^,\s]+)"));
pub(crate) static DD_DISP: Lazy<Regex> = Lazy::new(|| compile(r"DISP=([^,]+)"));

/// First capture group of `re` in `text`, if any.
pub(crate) fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile() {
        for re in [
            &PROGRAM_ID, &VARIABLE, &PARAGRAPH, &DISPLAY, &ACCEPT, &MOVE, &COMPUTE, &ADD, &MULTIPLY,
            &IF, &PERFORM, &EVALUATE, &GO_TO, &FILE_OP, &PERFORM_TARGET, &JOB_CLASS, &JOB_MSGCLASS,
            &JOB_NOTIFY, &EXEC_PGM, &EXEC_PROC, &EXEC_COND, &DD_DSN, &DD_DISP,
        ] {
            Lazy::force(re);
        }
    }

    #[test]
    fn class_does_not_match_inside_msgclass() {
        assert_eq!(capture(&JOB_CLASS, "//J JOB MSGCLASS=H,CLASS=A"), Some("A".to_string()));
        assert_eq!(capture(&JOB_CLASS, "//J JOB MSGCLASS=H"), None);
    }

    #[test]
    fn display_stops_at_first_period() {
        assert_eq!(capture(&DISPLAY, "    DISPLAY \"HELLO\"."), Some("\"HELLO\"".to_string()));
        assert_eq!(capture(&DISPLAY, "    DISPLAY WS-NAME"), Some("WS-NAME".to_string()));
    }
}
