//! Byte scanner turning a raw `.lng` stream into tokens.

use super::token::{
    KNOWN_TAGS,
    Token,
    TokenKind,
};
use crate::types::TextPosition;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// A cursor over the raw byte stream.
///
/// The whole input buffer is held for the scanner's lifetime; there is no
/// streaming. Positions are computed on demand (only errors ask for them).
#[derive(Debug)]
pub struct Scanner<'a> {
    stream: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over `stream`. A leading UTF-8 byte-order mark is
    /// consumed once and never re-emitted.
    #[must_use]
    pub fn new(stream: &'a [u8]) -> Self {
        let pos = if stream.starts_with(UTF8_BOM) { UTF8_BOM.len() } else { 0 };
        Self { stream, pos }
    }

    /// Scans the next token.
    ///
    /// Leading whitespace is skipped. Each known literal tag is tried at the
    /// current position, first match wins. Anything else is accumulated as
    /// text up to the next position where a known tag begins (or the end of
    /// the stream), trimmed on both ends, and line-break-normalized to LF. A
    /// text token that normalizes to empty right before the end of the stream
    /// collapses into the end token.
    pub fn next_token(&mut self) -> Token {
        while self.stream.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
        if self.pos >= self.stream.len() {
            return Token::end();
        }

        if let Some(kind) = self.known_tag_at()
            && let Some(spelling) = kind.spelling()
        {
            self.pos += spelling.len();
            return Token::tag(kind);
        }

        // Otherwise assume text: hop from '<' to '<' until one opens a tag.
        let start = self.pos;
        while self.pos < self.stream.len() && self.known_tag_at().is_none() {
            self.pos = self
                .stream
                .get(self.pos + 1..)
                .and_then(|rest| rest.iter().position(|&b| b == b'<'))
                .map_or(self.stream.len(), |off| self.pos + 1 + off);
        }

        let text = normalize(self.stream.get(start..self.pos).unwrap_or_default());
        if text.is_empty() && self.pos >= self.stream.len() {
            return Token::end();
        }
        Token::text(text)
    }

    /// Current scanner position, 0-based.
    ///
    /// The row is `max(count(CR), count(LF))` over the consumed prefix so
    /// CRLF is never double-counted; the column is the distance from the last
    /// line break.
    #[must_use]
    pub fn position(&self) -> TextPosition {
        let consumed = self.stream.get(..self.pos).unwrap_or(self.stream);
        let cr = consumed.iter().filter(|&&b| b == b'\r').count();
        let lf = consumed.iter().filter(|&&b| b == b'\n').count();
        let col = consumed
            .iter()
            .rposition(|&b| b == b'\r' || b == b'\n')
            .map_or(self.pos, |i| self.pos - i - 1);
        TextPosition::new(cr.max(lf), col)
    }

    /// The tag kind starting at the current position, if any.
    fn known_tag_at(&self) -> Option<TokenKind> {
        let rest = self.stream.get(self.pos..).unwrap_or_default();
        KNOWN_TAGS
            .iter()
            .copied()
            .find(|kind| kind.spelling().is_some_and(|s| rest.starts_with(s.as_bytes())))
    }
}

/// Trims whitespace from both ends and rewrites CRLF/CR line breaks to LF.
fn normalize(raw: &[u8]) -> Vec<u8> {
    let trimmed = raw.trim_ascii();
    let mut out = Vec::with_capacity(trimmed.len());
    let mut bytes = trimmed.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        if b == b'\r' {
            if bytes.peek() == Some(&b'\n') {
                bytes.next();
            }
            out.push(b'\n');
        } else {
            out.push(b);
        }
    }
    out
}
