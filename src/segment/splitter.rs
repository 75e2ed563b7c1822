use once_cell::sync::Lazy;
use regex::Regex;

// Sentence punctuation followed by whitespace, or a paragraph break
static UNIT_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?]\s+|(?:\r?\n){2,}").unwrap()
});

/// Split text into trimmed, non-empty sentence or paragraph units.
///
/// Sentence punctuation stays attached to the unit it closes. The whitespace
/// between units is dropped, so joining the units does not reproduce the
/// original spacing.
pub fn split_units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;

    for boundary in UNIT_BOUNDARY.find_iter(text) {
        let end = if text[boundary.start()..].starts_with(['.', '!', '?']) {
            boundary.start() + 1
        } else {
            boundary.start()
        };
        push_unit(&mut units, &text[start..end]);
        start = boundary.end();
    }
    push_unit(&mut units, &text[start..]);

    units
}

fn push_unit<'a>(units: &mut Vec<&'a str>, piece: &'a str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        units.push(trimmed);
    }
}
