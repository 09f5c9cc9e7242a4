//! Grammar parser for `.lng` translation bundles.
//!
//! ```text
//! file      := header entry* END
//! header    := HEADER_TAG text
//! entry     := SOURCE_TAG ( text target-singular
//!                         | PLURAL_TAG text PLURAL_TAG text target-plural )
//! target-singular := TARGET_TAG (text | EMPTY_TAG)
//! target-plural   := TARGET_TAG ( (PLURAL_TAG text)* | EMPTY_TAG )
//! ```
//!
//! Parsing aborts on the first error; there is no recovery and no partial
//! result. A malformed file is rejected wholesale because silently losing
//! hand-edited translations is worse than a hard failure.

use std::collections::HashMap;

use super::scanner::Scanner;
use super::token::{
    Token,
    TokenKind,
};
use crate::catalog::{
    TransHeader,
    TranslationMap,
    TranslationPluralMap,
};
use crate::error::{
    ParseError,
    ParseErrorKind,
};
use crate::plural::PluralFormInfo;
use crate::validate;

/// Everything one successful [`parse`] call produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    pub header: TransHeader,
    pub singular: TranslationMap,
    pub plural: TranslationPluralMap,
}

/// Parses a whole translation bundle.
pub fn parse(stream: &[u8]) -> Result<ParseOutput, ParseError> {
    LngParser::new(stream).parse()
}

/// Parses only the `<header>` block, ignoring whatever follows it.
pub fn parse_header(stream: &[u8]) -> Result<TransHeader, ParseError> {
    LngParser::new(stream).parse_header()
}

/// Token-lookahead parser over a [`Scanner`].
struct LngParser<'a> {
    scanner: Scanner<'a>,
    current: Token,
}

impl<'a> LngParser<'a> {
    fn new(stream: &'a [u8]) -> Self {
        let mut scanner = Scanner::new(stream);
        let current = scanner.next_token();
        Self { scanner, current }
    }

    fn parse(mut self) -> Result<ParseOutput, ParseError> {
        let header = self.parse_header_block()?;

        let info = PluralFormInfo::new(&header.plural_definition, header.plural_count).map_err(
            |err| {
                tracing::debug!(%err, definition = %header.plural_definition, "Plural definition rejected");
                ParseError::new(
                    ParseErrorKind::PluralRule,
                    "Invalid plural form definition",
                    self.scanner.position(),
                )
            },
        )?;

        let mut singular = TranslationMap::new();
        let mut plural = TranslationPluralMap::new();
        while self.current.kind != TokenKind::End {
            self.parse_entry(&mut singular, &mut plural, &info)?;
        }

        tracing::debug!(
            locale = %header.locale,
            singular = singular.len(),
            plural = plural.len(),
            "Parsed translation bundle"
        );
        Ok(ParseOutput { header, singular, plural })
    }

    fn parse_header(mut self) -> Result<TransHeader, ParseError> {
        self.parse_header_block()
    }

    /// `HEADER_TAG text`, with the text split into `key: value` lines.
    fn parse_header_block(&mut self) -> Result<TransHeader, ParseError> {
        self.consume(TokenKind::Header)?;
        let raw = self.take_text()?;
        let at = self.scanner.position();

        let raw = String::from_utf8(raw).map_err(|_| {
            ParseError::new(ParseErrorKind::Header, "Header contains UTF-8 encoding error", at)
        })?;

        let mut items: HashMap<&str, &str> = HashMap::new();
        for line in raw.split('\n') {
            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim();
                if !name.is_empty() {
                    items.entry(name).or_insert_with(|| value.trim());
                }
            }
        }

        let get = |name: &str| -> Result<String, ParseError> {
            items.get(name).map(|value| (*value).to_owned()).ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::Header,
                    format!("Cannot find header item \"{name}:\""),
                    at,
                )
            })
        };

        let language_name = get("language")?;
        let locale = get("locale")?;
        let flag_file = get("image")?;
        let plural_count = get("plural_count")?.parse::<usize>().map_err(|_| {
            ParseError::new(
                ParseErrorKind::Header,
                "Cannot parse header item \"plural_count:\" as a number",
                at,
            )
        })?;
        let plural_definition = get("plural_definition")?;
        let translator_name = get("translator")?;

        Ok(TransHeader {
            language_name,
            translator_name,
            locale,
            flag_file,
            plural_count,
            plural_definition,
        })
    }

    /// One `entry` production; a PLURAL_TAG right after SOURCE_TAG selects
    /// the plural branch.
    fn parse_entry(
        &mut self,
        out: &mut TranslationMap,
        plural_out: &mut TranslationPluralMap,
        info: &PluralFormInfo,
    ) -> Result<(), ParseError> {
        self.consume(TokenKind::Source)?;

        if self.current.kind == TokenKind::Plural {
            return self.parse_plural_entry(plural_out, info);
        }

        let original = self.take_text()?;
        self.consume(TokenKind::Target)?;
        let translation = if self.current.kind == TokenKind::Text {
            let text = std::mem::take(&mut self.current.text);
            self.advance();
            text
        } else {
            self.consume(TokenKind::Empty)?;
            Vec::new()
        };

        let (original, translation) =
            validate::check_singular(original, translation, self.scanner.position())?;
        // First occurrence of a duplicated key wins.
        out.entry(original).or_insert(translation);
        Ok(())
    }

    fn parse_plural_entry(
        &mut self,
        plural_out: &mut TranslationPluralMap,
        info: &PluralFormInfo,
    ) -> Result<(), ParseError> {
        self.consume(TokenKind::Plural)?;
        let singular = self.take_text()?;
        self.consume(TokenKind::Plural)?;
        let plural = self.take_text()?;

        self.consume(TokenKind::Target)?;
        let mut forms: Vec<Vec<u8>> = Vec::new();
        while self.current.kind == TokenKind::Plural {
            self.advance();
            forms.push(self.take_text()?);
        }
        if forms.is_empty() {
            self.consume(TokenKind::Empty)?;
        }

        let (original, forms) =
            validate::check_plural(singular, plural, forms, info, self.scanner.position())?;
        plural_out.entry(original).or_insert(forms);
        Ok(())
    }

    /// Consumes the current token as text, returning its raw bytes.
    fn take_text(&mut self) -> Result<Vec<u8>, ParseError> {
        if self.current.kind != TokenKind::Text {
            return Err(self.unexpected_token());
        }
        let text = std::mem::take(&mut self.current.text);
        self.advance();
        Ok(text)
    }

    fn consume(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.current.kind != kind {
            return Err(self.unexpected_token());
        }
        self.advance();
        Ok(())
    }

    fn advance(&mut self) {
        self.current = self.scanner.next_token();
    }

    fn unexpected_token(&self) -> ParseError {
        ParseError::new(ParseErrorKind::Grammar, "Unexpected token", self.scanner.position())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{
        bundle_bytes,
        german_header,
    };

    #[test]
    fn test_parses_header_and_both_entry_kinds() {
        let bytes = bundle_bytes(
            "\n<source> Hello\n<target> Hallo\n\
             \n<source>\n\t<pluralform> 1 file\n\t<pluralform> %x files\n\
             <target>\n\t<pluralform> 1 Datei\n\t<pluralform> %x Dateien\n\
             \n<source> New\n<target> <empty>\n",
        );
        let output = parse(&bytes).unwrap();

        assert_eq!(output.header, german_header());
        assert_eq!(output.singular.get("Hello"), Some(&"Hallo".to_owned()));
        assert_eq!(output.singular.get("New"), Some(&String::new()));
        assert_eq!(
            output.plural.get(&("1 file".to_owned(), "%x files".to_owned())),
            Some(&vec!["1 Datei".to_owned(), "%x Dateien".to_owned()])
        );
    }

    #[test]
    fn test_parse_header_ignores_entries() {
        let bytes = bundle_bytes("\n<source> broken entry without target\n");
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header, german_header());
        // The full parse rejects the same bytes.
        assert!(parse(&bytes).is_err());
    }

    #[test]
    fn test_accepts_crlf_and_bom_input() {
        let mut bytes = b"\xef\xbb\xbf".to_vec();
        bytes.extend_from_slice(&bundle_bytes("\r\n<source> Hello\r\n<target> Hallo\r\n"));
        let output = parse(&bytes).unwrap();
        assert_eq!(output.singular.get("Hello"), Some(&"Hallo".to_owned()));
    }

    #[test]
    fn test_first_duplicate_key_wins() {
        let bytes =
            bundle_bytes("\n<source> Key\n<target> Erste\n\n<source> Key\n<target> Zweite\n");
        let output = parse(&bytes).unwrap();
        assert_eq!(output.singular.get("Key"), Some(&"Erste".to_owned()));
        assert_eq!(output.singular.len(), 1);
    }

    #[test]
    fn test_missing_header_key_is_a_named_error() {
        let bytes = b"<header>\n\tlanguage: Deutsch\n<source> x\n<target> y";
        let err = parse(bytes).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Header);
        assert!(err.message.contains("\"locale:\""), "unexpected message: {}", err.message);
    }

    #[test]
    fn test_bad_plural_count_is_a_header_error() {
        let bytes = bundle_bytes("");
        let broken = String::from_utf8(bytes).unwrap().replace("plural_count: 2", "plural_count: two");
        let err = parse(broken.as_bytes()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Header);
        assert!(err.message.contains("plural_count"));
    }

    #[test]
    fn test_invalid_plural_definition_fails_before_entries() {
        let bytes = bundle_bytes("");
        let broken = String::from_utf8(bytes)
            .unwrap()
            .replace("n == 1 ? 0 : 1", "no rule at all");
        let err = parse(broken.as_bytes()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::PluralRule);
        assert_eq!(err.message, "Invalid plural form definition");
    }

    #[test]
    fn test_error_row_counts_line_breaks_before_offending_token() {
        let err = parse(b"<header>\na\n<source>").unwrap_err();
        assert_eq!(err.row, 2);
    }

    #[test]
    fn test_unexpected_token_at_start() {
        let err = parse(b"<source> no header").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Grammar);
        assert_eq!(err.message, "Unexpected token");
        // The scanner has already consumed the lookahead "<source>" tag.
        assert_eq!((err.row, err.col), (0, "<source>".len()));
    }

    #[test]
    fn test_entry_without_target_is_rejected() {
        let bytes = bundle_bytes("\n<source> Hello\n<source> Next\n<target> x\n");
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Grammar);
    }

    #[test]
    fn test_validation_failure_aborts_parse() {
        let bytes = bundle_bytes("\n<source> Hello %x!\n<target> Hallo!\n");
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Validation);
        assert!(err.message.contains("Placeholder %x missing"));
    }

    #[test]
    fn test_plural_entry_with_empty_tag_parses_as_untranslated() {
        let bytes = bundle_bytes(
            "\n<source>\n\t<pluralform> 1 file\n\t<pluralform> %x files\n<target> <empty>\n",
        );
        let output = parse(&bytes).unwrap();
        assert_eq!(
            output.plural.get(&("1 file".to_owned(), "%x files".to_owned())),
            Some(&Vec::new())
        );
    }
}
