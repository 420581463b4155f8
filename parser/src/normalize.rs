/// Normalize COBOL source before extraction.
///
/// Drops `*` comment lines and strips a fully numeric sequence area
/// (columns 1-6). Every retained line is uppercased with trailing whitespace
/// removed. Column 7 is not inspected, so a fixed-format comment written as
/// `000100* ...` survives as `* ...`.
pub fn normalize(source: &str) -> String {
    source
        .split('\n')
        .filter_map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_line(line: &str) -> Option<String> {
    let raw = line.trim_end();
    if raw.trim_start().starts_with('*') {
        return None;
    }
    Some(strip_sequence_area(raw).to_uppercase())
}

fn strip_sequence_area(raw: &str) -> &str {
    let mut chars = raw.char_indices();
    let numeric = chars.by_ref().take(6).filter(|(_, c)| c.is_ascii_digit()).count() == 6;
    match chars.next() {
        Some((rest, _)) if numeric => &raw[rest..],
        _ => raw,
    }
}
