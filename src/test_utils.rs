//! テスト用ユーティリティ関数
//!
//! Shared fixtures for the unit tests: a reference header and a builder for
//! bundle bytes around it.
#![cfg(test)]

use crate::catalog::TransHeader;

/// The header used by sample bundles across the test suite.
pub(crate) fn german_header() -> TransHeader {
    TransHeader {
        language_name: "Deutsch".to_owned(),
        translator_name: "Erika Mustermann".to_owned(),
        locale: "de_DE".to_owned(),
        flag_file: "germany.png".to_owned(),
        plural_count: 2,
        plural_definition: "n == 1 ? 0 : 1".to_owned(),
    }
}

/// Bytes of a bundle with the reference header followed by `entries`.
pub(crate) fn bundle_bytes(entries: &str) -> Vec<u8> {
    let header = german_header();
    format!(
        "<header>\n\
         \tlanguage: {}\n\
         \tlocale: {}\n\
         \timage: {}\n\
         \tplural_count: {}\n\
         \tplural_definition: {}\n\
         \ttranslator: {}\n\
         {entries}",
        header.language_name,
        header.locale,
        header.flag_file,
        header.plural_count,
        header.plural_definition,
        header.translator_name,
    )
    .into_bytes()
}
