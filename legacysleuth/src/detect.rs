use legacysleuth_parser::Language;
use once_cell::sync::Lazy;
use regex::Regex;

static JCL_CARD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^//\w+").expect("static pattern"));

const COBOL_MARKERS: [&str; 4] = ["IDENTIFICATION DIVISION", "PROGRAM-ID", "DATA DIVISION", "PROCEDURE DIVISION"];

/// Guess whether `code` is a JCL deck or a COBOL program.
///
/// JCL is checked first: a named `//` card plus a JOB or EXEC keyword.
pub fn detect_language(code: &str) -> Option<Language> {
    if code.trim().is_empty() {
        return None;
    }
    let upper = code.to_uppercase();

    if JCL_CARD.is_match(&upper) && (upper.contains(" JOB ") || upper.contains(" EXEC ")) {
        return Some(Language::Jcl);
    }
    if COBOL_MARKERS.iter().any(|m| upper.contains(m)) {
        return Some(Language::Cobol);
    }
    None
}
