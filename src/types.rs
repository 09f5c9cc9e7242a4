//! Core types used throughout the crate.

use serde::Serialize;

/// A position in a translation file (0-indexed row and column).
///
/// Row counting is robust to LF, CR and CRLF line endings: a CRLF pair
/// advances the row exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TextPosition {
    pub row: usize,
    pub col: usize,
}

impl TextPosition {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}
