use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::splitter::split_units;
use super::tokens::TokenCounter;

/// Smallest window the oversized fallback produces, in graphemes
pub const MIN_WINDOW_GRAPHEMES: usize = 300;

/// Rough characters-per-token ratio behind the window size
const GRAPHEMES_PER_TOKEN: usize = 3;

/// A piece of text submitted to the backend in one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// One or more whole units joined by single spaces
    Packed { text: String, units: usize },
    /// Raw slice of a unit that exceeded the budget on its own
    Window(String),
}

impl Chunk {
    pub fn text(&self) -> &str {
        match self {
            Chunk::Packed { text, .. } => text,
            Chunk::Window(text) => text,
        }
    }

    pub fn is_window(&self) -> bool {
        matches!(self, Chunk::Window(_))
    }
}

/// Greedily pack the units of `text` into chunks of at most `max_tokens`.
///
/// Units are never reordered or dropped. A unit that cannot fit even on its
/// own is cut into windows by [`split_oversized`]; those windows may still
/// exceed the budget.
pub fn pack(text: &str, counter: &dyn TokenCounter, max_tokens: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut acc = String::new();
    let mut acc_units = 0;

    for unit in split_units(text) {
        let candidate = if acc.is_empty() {
            unit.to_string()
        } else {
            format!("{} {}", acc, unit)
        };

        if counter.count(&candidate) <= max_tokens {
            acc = candidate;
            acc_units += 1;
            continue;
        }

        // candidate == unit when nothing was accumulated
        let unit_fits = if acc.is_empty() {
            false
        } else {
            chunks.push(Chunk::Packed {
                text: std::mem::take(&mut acc),
                units: acc_units,
            });
            counter.count(unit) <= max_tokens
        };

        if unit_fits {
            acc = unit.to_string();
            acc_units = 1;
        } else {
            let windows = split_oversized(unit, max_tokens);
            debug!(
                "Unit of {} bytes exceeds {} tokens, cut into {} windows",
                unit.len(),
                max_tokens,
                windows.len()
            );
            chunks.extend(windows.into_iter().map(Chunk::Window));
            acc_units = 0;
        }
    }

    if !acc.is_empty() {
        chunks.push(Chunk::Packed { text: acc, units: acc_units });
    }

    chunks
}

/// Number of graphemes per oversized window for a token budget
pub fn window_size(max_tokens: usize) -> usize {
    MIN_WINDOW_GRAPHEMES.max(max_tokens.saturating_mul(GRAPHEMES_PER_TOKEN))
}

/// Cut `text` into consecutive, non-overlapping windows of extended grapheme
/// clusters. Word boundaries are ignored.
pub fn split_oversized(text: &str, max_tokens: usize) -> Vec<String> {
    let step = window_size(max_tokens);
    let graphemes: Vec<&str> = text.graphemes(true).collect();

    graphemes.chunks(step).map(|window| window.concat()).collect()
}
