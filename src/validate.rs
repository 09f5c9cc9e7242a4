//! Consistency rules between original and translated text.
//!
//! Runs once per parsed entry. Empty translations are untranslated and
//! exempt from everything except the non-empty-original and UTF-8 checks.
//! The first violation aborts the entry (and with it the whole parse) with a
//! located error naming the offending rule.

use crate::catalog::{
    PluralForms,
    SingularPluralPair,
};
use crate::error::{
    ParseError,
    ParseErrorKind,
};
use crate::plural::PluralFormInfo;
use crate::types::TextPosition;

/// Placeholders substituted with runtime values; `%x` is the primary one.
const PLACEHOLDERS: &[&str] = &["%x", "%y", "%z"];
const PRIMARY_PLACEHOLDER: &str = "%x";
const SECONDARY_PLACEHOLDERS: &[&str] = &["%y", "%z"];

/// Product names and filenames translators must copy verbatim.
const PROTECTED_LITERALS: &[&str] = &[
    "FreeFileSync",
    "RealTimeSync",
    "ffs_gui",
    "ffs_batch",
    "ffs_real",
    "ffs_tmp",
    "GlobalSettings.xml",
];

/// Punctuation that must not follow a plain space; a non-breaking space was
/// almost certainly intended (French typography).
const SPACE_SENSITIVE_PUNCTUATION: &[char] = &['.', '!', '?', ':', ';', '$', '#'];

/// Validates one singular entry and converts it to owned strings.
pub(crate) fn check_singular(
    original: Vec<u8>,
    translation: Vec<u8>,
    at: TextPosition,
) -> Result<(String, String), ParseError> {
    if original.is_empty() {
        return Err(violation("Translation source text is empty", at));
    }
    let original = utf8(original, "Translation source text contains UTF-8 encoding error", at)?;
    let translation = utf8(translation, "Translation text contains UTF-8 encoding error", at)?;

    if !translation.is_empty() {
        for placeholder in PLACEHOLDERS {
            if original.contains(placeholder) && !translation.contains(placeholder) {
                return Err(violation(
                    format!("Placeholder {placeholder} missing in translation"),
                    at,
                ));
            }
        }

        if !original.contains('\n') && translation.contains('\n') {
            return Err(violation(
                "Source text is a one-liner, but translation consists of multiple lines",
                at,
            ));
        }

        check_markers(&[original.as_str()], &[translation.as_str()], at)?;
    }

    Ok((original, translation))
}

/// Validates one plural entry and converts it to owned strings.
pub(crate) fn check_plural(
    singular: Vec<u8>,
    plural: Vec<u8>,
    forms: Vec<Vec<u8>>,
    info: &PluralFormInfo,
    at: TextPosition,
) -> Result<(SingularPluralPair, PluralForms), ParseError> {
    if singular.is_empty() || plural.is_empty() {
        return Err(violation("Translation source text is empty", at));
    }
    let singular = utf8(singular, "Text contains UTF-8 encoding error", at)?;
    let plural = utf8(plural, "Text contains UTF-8 encoding error", at)?;
    let forms = forms
        .into_iter()
        .map(|form| utf8(form, "Text contains UTF-8 encoding error", at))
        .collect::<Result<PluralForms, _>>()?;

    // The plural source drives the count at runtime, so it must carry the
    // primary placeholder even while the entry is untranslated.
    if !plural.contains(PRIMARY_PLACEHOLDER) {
        return Err(violation("Plural form source text does not contain %x placeholder", at));
    }

    if !forms.is_empty() {
        check_form_slots(&singular, &forms, info, at)?;

        let all_texts: Vec<&str> = [singular.as_str(), plural.as_str()]
            .into_iter()
            .chain(forms.iter().map(String::as_str))
            .collect();

        for placeholder in SECONDARY_PLACEHOLDERS {
            if (singular.contains(placeholder) || plural.contains(placeholder))
                && all_texts.iter().any(|text| !text.contains(placeholder))
            {
                return Err(violation(format!("Placeholder {placeholder} missing in text"), at));
            }
        }

        if !singular.contains('\n')
            && !plural.contains('\n')
            && forms.iter().any(|form| form.contains('\n'))
        {
            return Err(violation(
                "Source text is a one-liner, but at least one plural form translation consists of multiple lines",
                at,
            ));
        }

        check_markers(&[singular.as_str(), plural.as_str()], &all_texts, at)?;
    }

    Ok(((singular, plural), forms))
}

/// Rules over the translated form list: declared count, duplicates among
/// forms lacking the primary placeholder, and per-slot placeholder/number
/// requirements driven by the plural-rule evaluator.
fn check_form_slots(
    singular: &str,
    forms: &[String],
    info: &PluralFormInfo,
    at: TextPosition,
) -> Result<(), ParseError> {
    if info.form_count() != forms.len() {
        return Err(violation(
            format!(
                "Invalid number of plural forms; actual: {}, expected: {}",
                forms.len(),
                info.form_count()
            ),
            at,
        ));
    }

    // Copy & paste slip-ups: two identical forms are only plausible when the
    // placeholder varies the text.
    for (index, form) in forms.iter().enumerate() {
        if !form.contains(PRIMARY_PLACEHOLDER)
            && let Some(offset) = forms.iter().skip(index + 1).position(|other| other == form)
        {
            return Err(violation(
                format!(
                    "Duplicate plural form translation at index position {}",
                    index + 1 + offset
                ),
                at,
            ));
        }
    }

    for (slot, form) in forms.iter().enumerate() {
        if info.is_single_number_form(slot) {
            // Frequently changing texts (statistics) spell the number out;
            // the translation must do the same when the source does.
            if (singular.contains(PRIMARY_PLACEHOLDER) || singular.contains('1'))
                && let Some(first) = info.first_number(slot)
                && !form.contains(PRIMARY_PLACEHOLDER)
                && !form.contains(&first.to_string())
            {
                return Err(violation(
                    format!(
                        "Plural form translation at index position {slot} needs to use the decimal number {first} or the %x placeholder"
                    ),
                    at,
                ));
            }
        } else if !form.contains(PRIMARY_PLACEHOLDER) {
            return Err(violation(
                format!("Plural form at index position {slot} is missing the %x placeholder"),
                at,
            ));
        }
    }

    Ok(())
}

/// Shared marker rules: accelerator counts, trailing punctuation classes,
/// protected literals, and space-before-punctuation. `originals` decides
/// which features the source demands; every member of `checked` must carry
/// them. For plural entries `checked` includes the originals themselves.
fn check_markers(
    originals: &[&str],
    checked: &[&str],
    at: TextPosition,
) -> Result<(), ParseError> {
    let amp = originals.first().map_or(0, |text| ampersand_count(text));
    for text in checked {
        if amp > 1 || ampersand_count(text) != amp {
            return Err(violation(
                "Source and translation both need exactly one & character to mark a menu item access key or none at all",
                at,
            ));
        }
    }
    // A trailing accelerator crashes the UI toolkit.
    for text in originals.iter().chain(checked) {
        if ends_with_single_amp(text) {
            return Err(violation(
                "The & character to mark a menu item access key must not occur at the end of a string",
                at,
            ));
        }
    }

    if originals.iter().any(|text| ends_with_colon(text)) {
        for text in checked {
            if !ends_with_colon(text) {
                return Err(violation(
                    "Source text ends with a colon character \":\", but translation does not",
                    at,
                ));
            }
        }
    }
    if originals.iter().any(|text| ends_with_single_dot(text)) {
        for text in checked {
            if !ends_with_single_dot(text) {
                return Err(violation(
                    "Source text ends with a punctuation mark character \".\", but translation does not",
                    at,
                ));
            }
        }
    }
    if originals.iter().any(|text| ends_with_ellipsis(text)) {
        for text in checked {
            if !ends_with_ellipsis(text) {
                return Err(violation(
                    "Source text ends with an ellipsis \"...\", but translation does not",
                    at,
                ));
            }
        }
    }

    for literal in PROTECTED_LITERALS {
        if originals.iter().any(|text| text.contains(literal)) {
            for text in checked {
                if !text.contains(literal) {
                    return Err(violation(format!("Misspelled \"{literal}\" in translation"), at));
                }
            }
        }
    }

    for &punct in SPACE_SENSITIVE_PUNCTUATION {
        let needle = format!(" {punct}");
        for text in originals.iter().chain(checked) {
            if text.contains(&needle) {
                return Err(violation(
                    format!(
                        "Text contains a space before the \"{punct}\" character. Maybe this should be a \"non-breaking space\" (Windows: Alt 0160    UTF8: 0xC2 0xA0)?"
                    ),
                    at,
                ));
            }
        }
    }

    Ok(())
}

fn utf8(bytes: Vec<u8>, message: &str, at: TextPosition) -> Result<String, ParseError> {
    String::from_utf8(bytes).map_err(|_| violation(message, at))
}

fn violation(message: impl Into<String>, at: TextPosition) -> ParseError {
    ParseError::new(ParseErrorKind::Validation, message, at)
}

/// Number of accelerator markers, with `&&` pairs excluded (those render as
/// a literal ampersand).
fn ampersand_count(text: &str) -> usize {
    text.replace("&&", "").matches('&').count()
}

fn ends_with_single_amp(text: &str) -> bool {
    text.ends_with('&') && !text.ends_with("&&")
}

/// `:` or the fullwidth CJK colon.
fn ends_with_colon(text: &str) -> bool {
    text.ends_with(':') || text.ends_with('\u{ff1a}')
}

/// A single `.`, Devanagari danda, or CJK full stop; doubled marks do not
/// count (`..` is on its way to an ellipsis).
fn ends_with_single_dot(text: &str) -> bool {
    (text.ends_with('.') || text.ends_with('\u{0964}') || text.ends_with('\u{3002}'))
        && !(text.ends_with("..")
            || text.ends_with("\u{0964}\u{0964}")
            || text.ends_with("\u{3002}\u{3002}"))
}

/// `...` or the single-glyph ellipsis.
fn ends_with_ellipsis(text: &str) -> bool {
    text.ends_with("...") || text.ends_with('\u{2026}')
}
