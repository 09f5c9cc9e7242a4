//! Token kinds and the literal tag vocabulary of the `.lng` format.

/// The kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<header>`
    Header,
    /// `<source>`
    Source,
    /// `<target>`
    Target,
    /// `<empty>`
    Empty,
    /// `<pluralform>`
    Plural,
    /// Free text between tags, trimmed and LF-normalized.
    Text,
    /// End of stream.
    End,
}

impl TokenKind {
    /// The literal spelling of a tag kind.
    ///
    /// Scanner and generator both go through this table, so the two
    /// directions cannot drift apart. Only tag kinds have a spelling.
    #[must_use]
    pub const fn spelling(self) -> Option<&'static str> {
        match self {
            Self::Header => Some("<header>"),
            Self::Source => Some("<source>"),
            Self::Target => Some("<target>"),
            Self::Empty => Some("<empty>"),
            Self::Plural => Some("<pluralform>"),
            Self::Text | Self::End => None,
        }
    }
}

/// All literal tags the scanner recognizes. No spelling is a prefix of
/// another, so first-match-wins needs no ordering.
pub const KNOWN_TAGS: &[TokenKind] =
    &[TokenKind::Header, TokenKind::Source, TokenKind::Target, TokenKind::Empty, TokenKind::Plural];

/// One token produced by the scanner.
///
/// `text` is only populated for [`TokenKind::Text`]; it stays raw bytes
/// because UTF-8 validity is a semantic check with its own located error,
/// not a lexical one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Vec<u8>,
}

impl Token {
    #[must_use]
    pub const fn tag(kind: TokenKind) -> Self {
        Self { kind, text: Vec::new() }
    }

    #[must_use]
    pub const fn text(text: Vec<u8>) -> Self {
        Self { kind: TokenKind::Text, text }
    }

    #[must_use]
    pub const fn end() -> Self {
        Self { kind: TokenKind::End, text: Vec::new() }
    }
}
