//! Error types for parsing and validating translation bundles.

use serde::Serialize;
use thiserror::Error;

use crate::types::TextPosition;

/// Category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// Missing or unexpected tag in the token stream.
    Grammar,
    /// Missing header key, bad integer, or malformed header text.
    Header,
    /// Invalid or inconsistent plural-rule definition.
    PluralRule,
    /// A consistency rule between original and translated text failed.
    Validation,
}

/// A located, fatal parse error.
///
/// `row` and `col` are zero-based and point at the scanner position where the
/// problem was detected. Parsing aborts on the first error; a malformed file
/// is rejected wholesale rather than partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} (row {row}, column {col})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub row: usize,
    pub col: usize,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, at: TextPosition) -> Self {
        Self { kind, message: message.into(), row: at.row, col: at.col }
    }

    /// The error position as a [`TextPosition`].
    #[must_use]
    pub const fn position(&self) -> TextPosition {
        TextPosition { row: self.row, col: self.col }
    }
}
