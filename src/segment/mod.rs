// Bounded-text segmentation
//
// Text flows through three stages before it reaches a translation backend:
// - Splitter: raw text into sentence or paragraph units
// - Packer: greedy merge of units under a token budget
// - Oversized fallback: grapheme windows for units that never fit

pub mod splitter;
pub mod tokens;
pub mod packer;

pub use splitter::split_units;
pub use tokens::{HeuristicTokenCounter, TokenCounter};
pub use packer::{pack, split_oversized, window_size, Chunk};
