//! Canonical rendering of a catalog back to `.lng` text.
//!
//! Generation performs no validation: feeding it a catalog that violates the
//! parse-time rules (e.g. a mismatched form count) is a programming error
//! and simply produces output the parser would reject again.

use crate::catalog::{
    CatalogItem,
    SingularPluralPair,
    TransHeader,
    TranslationCatalog,
};
use crate::syntax::token::TokenKind;

/// Renders `catalog` under `header` to the canonical byte layout: header
/// block first in fixed key order, then every item in insertion order, all
/// line breaks CRLF. With `untranslated_first`, empty-translation entries
/// are grouped before the translated ones (each group keeping its relative
/// order) so translators find open work at the top.
#[must_use]
pub fn generate(
    catalog: &TranslationCatalog,
    header: &TransHeader,
    untranslated_first: bool,
) -> String {
    let mut header_lines = String::new();
    header_lines.push_str(tag(TokenKind::Header));
    header_lines.push('\n');
    header_lines.push_str(&format!("\tlanguage: {}\n", header.language_name));
    header_lines.push_str(&format!("\tlocale: {}\n", header.locale));
    header_lines.push_str(&format!("\timage: {}\n", header.flag_file));
    header_lines.push_str(&format!("\tplural_count: {}\n", header.plural_count));
    header_lines.push_str(&format!("\tplural_definition: {}\n", header.plural_definition));
    header_lines.push_str(&format!("\ttranslator: {}", header.translator_name));

    let mut top = String::new();
    let mut main = String::new();
    for item in catalog.items() {
        let out = if untranslated_first && !item.has_translation() { &mut top } else { &mut main };
        match item {
            CatalogItem::Singular { original, translation } => {
                render_singular(out, original, translation);
            }
            CatalogItem::Plural { original, forms } => render_plural(out, original, forms),
        }
    }

    let output = header_lines + &top + &main;
    debug_assert!(!output.contains('\r'), "in-memory text must be LF-only");
    tracing::debug!(items = catalog.len(), untranslated_first, "Generated translation bundle");
    output.replace('\n', "\r\n")
}

fn render_singular(out: &mut String, original: &str, translation: &str) {
    out.push_str("\n\n");
    out.push_str(tag(TokenKind::Source));
    out.push(' ');
    out.push_str(original);
    out.push('\n');
    // An extra separator keeps multi-line originals readable.
    if original.contains('\n') {
        out.push('\n');
    }
    out.push_str(tag(TokenKind::Target));
    out.push(' ');
    out.push_str(translation);
    // Help translators grep for open work.
    if translation.is_empty() {
        out.push_str(tag(TokenKind::Empty));
    }
}

fn render_plural(out: &mut String, original: &SingularPluralPair, forms: &[String]) {
    let (singular, plural) = original;
    out.push_str("\n\n");
    out.push_str(tag(TokenKind::Source));
    out.push('\n');
    for text in [singular, plural] {
        out.push('\t');
        out.push_str(tag(TokenKind::Plural));
        out.push(' ');
        out.push_str(text);
        out.push('\n');
    }
    out.push_str(tag(TokenKind::Target));
    for form in forms {
        out.push_str("\n\t");
        out.push_str(tag(TokenKind::Plural));
        out.push(' ');
        out.push_str(form);
    }
    if forms.is_empty() {
        out.push(' ');
        out.push_str(tag(TokenKind::Empty));
    }
}

/// Spelling of a tag kind; only ever called for tag kinds.
fn tag(kind: TokenKind) -> &'static str {
    kind.spelling().unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{
        TranslationMap,
        TranslationPluralMap,
    };
    use crate::test_utils::german_header;

    fn sample_catalog() -> TranslationCatalog {
        let mut prior_singular = TranslationMap::new();
        prior_singular.insert("Hello".to_owned(), "Hallo".to_owned());
        let mut prior_plural = TranslationPluralMap::new();
        prior_plural.insert(
            ("1 file".to_owned(), "%x files".to_owned()),
            vec!["1 Datei".to_owned(), "%x Dateien".to_owned()],
        );

        let mut catalog = TranslationCatalog::new(prior_singular, prior_plural);
        catalog.add_singular("Hello");
        catalog.add_plural(&("1 file".to_owned(), "%x files".to_owned()));
        catalog.add_singular("New");
        catalog
    }

    #[test]
    fn test_exact_byte_layout() {
        let rendered = generate(&sample_catalog(), &german_header(), false);
        let expected = "<header>\r\n\
                        \tlanguage: Deutsch\r\n\
                        \tlocale: de_DE\r\n\
                        \timage: germany.png\r\n\
                        \tplural_count: 2\r\n\
                        \tplural_definition: n == 1 ? 0 : 1\r\n\
                        \ttranslator: Erika Mustermann\r\n\
                        \r\n\
                        <source> Hello\r\n\
                        <target> Hallo\r\n\
                        \r\n\
                        <source>\r\n\
                        \t<pluralform> 1 file\r\n\
                        \t<pluralform> %x files\r\n\
                        <target>\r\n\
                        \t<pluralform> 1 Datei\r\n\
                        \t<pluralform> %x Dateien\r\n\
                        \r\n\
                        <source> New\r\n\
                        <target> <empty>";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_untranslated_first_moves_empty_entries_up() {
        let rendered = generate(&sample_catalog(), &german_header(), true);
        let new_at = rendered.find("<source> New").unwrap();
        let hello_at = rendered.find("<source> Hello").unwrap();
        let plural_at = rendered.find("<pluralform> 1 file").unwrap();
        assert!(new_at < hello_at);
        assert!(new_at < plural_at);
    }

    #[test]
    fn test_multiline_original_gets_extra_separator() {
        let mut catalog = TranslationCatalog::default();
        catalog.add_singular("line one\nline two");
        let rendered = generate(&catalog, &german_header(), false);
        assert!(rendered.contains("<source> line one\r\nline two\r\n\r\n<target> <empty>"));
    }

    #[test]
    fn test_untranslated_plural_renders_empty_tag() {
        let mut catalog = TranslationCatalog::default();
        catalog.add_plural(&("1 item".to_owned(), "%x items".to_owned()));
        let rendered = generate(&catalog, &german_header(), false);
        assert!(rendered.contains("<target> <empty>"));
    }

    #[test]
    fn test_output_contains_no_lone_lf() {
        let rendered = generate(&sample_catalog(), &german_header(), false);
        assert!(!rendered.replace("\r\n", "").contains('\n'));
    }
}
