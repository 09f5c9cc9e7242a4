//! Data model of a translation bundle and the ordered, deduplicated
//! collection used to rebuild one.

use std::collections::{
    HashMap,
    HashSet,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Singular translations: original text to translated text. An empty
/// translation means the entry is untranslated.
pub type TranslationMap = HashMap<String, String>;

/// Key of a plural entry: (original singular, original plural), e.g.
/// `("1 house", "%x houses")`.
pub type SingularPluralPair = (String, String);

/// Ordered translated forms, one per plural-rule slot. Empty when the entry
/// is untranslated.
pub type PluralForms = Vec<String>;

/// Plural translations: original pair to translated forms.
pub type TranslationPluralMap = HashMap<SingularPluralPair, PluralForms>;

/// Parsed `<header>` block of a translation bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransHeader {
    /// Display name, e.g. "English (UK)".
    pub language_name: String,
    pub translator_name: String,
    /// ISO 639 language code plus optional ISO 3166 country code, e.g. "de"
    /// or "en_GB".
    pub locale: String,
    /// Flag image filename, e.g. "england.png".
    pub flag_file: String,
    /// Declared number of plural forms, e.g. 2.
    pub plural_count: usize,
    /// Rule expression over `n`, e.g. "n == 1 ? 0 : 1".
    pub plural_definition: String,
}

/// One translation item, dispatched by kind with an exhaustive `match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogItem {
    Singular {
        original: String,
        translation: String,
    },
    Plural {
        original: SingularPluralPair,
        forms: PluralForms,
    },
}

impl CatalogItem {
    /// False while the translation (or form list) is still empty.
    #[must_use]
    pub fn has_translation(&self) -> bool {
        match self {
            Self::Singular { translation, .. } => !translation.is_empty(),
            Self::Plural { forms, .. } => !forms.is_empty(),
        }
    }
}

/// Insertion-ordered, deduplicated set of translation items.
///
/// The catalog is seeded from a previously parsed bundle: the first
/// `add_singular`/`add_plural` call for a key recalls the prior translation
/// (empty if there was none), later calls for the same key are no-ops. Keys
/// that are never re-added simply stay out of the catalog, which is how
/// stale translations get pruned on regeneration.
///
/// Items live in a growable arena with two key-sets guarding uniqueness; no
/// shared-ownership pointers, no interior mutability. One logical owner at a
/// time.
#[derive(Debug, Default)]
pub struct TranslationCatalog {
    sequence: Vec<CatalogItem>,
    singular_seen: HashSet<String>,
    plural_seen: HashSet<SingularPluralPair>,
    prior_singular: TranslationMap,
    prior_plural: TranslationPluralMap,
}

impl TranslationCatalog {
    /// Creates a catalog seeded with the maps of a prior parse.
    #[must_use]
    pub fn new(prior_singular: TranslationMap, prior_plural: TranslationPluralMap) -> Self {
        Self { prior_singular, prior_plural, ..Self::default() }
    }

    /// Records a singular original, recalling its prior translation on first
    /// sight. Re-adding a known key is a no-op.
    pub fn add_singular(&mut self, original: &str) {
        if !self.singular_seen.insert(original.to_owned()) {
            return;
        }
        let translation = self.prior_singular.get(original).cloned().unwrap_or_default();
        self.sequence.push(CatalogItem::Singular { original: original.to_owned(), translation });
    }

    /// Records a plural original pair, recalling its prior forms on first
    /// sight. Re-adding a known pair is a no-op.
    pub fn add_plural(&mut self, original: &SingularPluralPair) {
        if !self.plural_seen.insert(original.clone()) {
            return;
        }
        let forms = self.prior_plural.get(original).cloned().unwrap_or_default();
        self.sequence.push(CatalogItem::Plural { original: original.clone(), forms });
    }

    /// True if any recorded item still has no translation.
    #[must_use]
    pub fn has_untranslated(&self) -> bool {
        self.sequence.iter().any(|item| !item.has_translation())
    }

    /// The recorded items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Replays all items in insertion order, dispatched by kind.
    pub fn visit<F, G>(&self, mut on_singular: F, mut on_plural: G)
    where
        F: FnMut(&str, &str),
        G: FnMut(&SingularPluralPair, &[String]),
    {
        for item in &self.sequence {
            match item {
                CatalogItem::Singular { original, translation } => {
                    on_singular(original, translation);
                }
                CatalogItem::Plural { original, forms } => on_plural(original, forms),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    fn pair(singular: &str, plural: &str) -> SingularPluralPair {
        (singular.to_owned(), plural.to_owned())
    }

    #[test]
    fn test_add_is_idempotent_and_keeps_first_seeded_translation() {
        let mut prior = TranslationMap::new();
        prior.insert("Save".to_owned(), "Speichern".to_owned());
        let mut catalog = TranslationCatalog::new(prior, TranslationPluralMap::new());

        catalog.add_singular("Save");
        catalog.add_singular("Save");

        assert_that!(catalog.len(), eq(1));
        assert_eq!(
            catalog.items(),
            &[CatalogItem::Singular {
                original: "Save".to_owned(),
                translation: "Speichern".to_owned(),
            }]
        );
    }

    #[test]
    fn test_unknown_keys_are_seeded_empty() {
        let mut catalog = TranslationCatalog::default();
        catalog.add_singular("New");
        catalog.add_plural(&pair("1 item", "%x items"));

        assert!(catalog.has_untranslated());
        assert!(catalog.items().iter().all(|item| !item.has_translation()));
    }

    #[test]
    fn test_stale_prior_keys_are_pruned() {
        let mut prior = TranslationMap::new();
        prior.insert("Old".to_owned(), "Alt".to_owned());
        prior.insert("Kept".to_owned(), "Behalten".to_owned());
        let mut catalog = TranslationCatalog::new(prior, TranslationPluralMap::new());

        catalog.add_singular("Kept");

        assert_eq!(catalog.len(), 1);
        assert!(!catalog.has_untranslated());
    }

    #[test]
    fn test_visit_replays_in_insertion_order() {
        let mut prior_plural = TranslationPluralMap::new();
        prior_plural
            .insert(pair("1 file", "%x files"), vec!["1 Datei".to_owned(), "%x Dateien".to_owned()]);
        let mut catalog = TranslationCatalog::new(TranslationMap::new(), prior_plural);

        catalog.add_singular("b");
        catalog.add_plural(&pair("1 file", "%x files"));
        catalog.add_singular("a");

        let seen = core::cell::RefCell::new(Vec::new());
        catalog.visit(
            |original, _| seen.borrow_mut().push(original.to_owned()),
            |original, forms| {
                assert_eq!(forms.len(), 2);
                seen.borrow_mut().push(original.0.clone());
            },
        );
        assert_eq!(seen.into_inner(), vec!["b".to_owned(), "1 file".to_owned(), "a".to_owned()]);
    }
}
