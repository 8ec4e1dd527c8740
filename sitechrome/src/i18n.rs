//! Message lookup for translated interface strings.
//!
//! The crate does not own any translations. Applications implement
//! [`Translate`] over whatever store they already have, or fill an in-memory
//! [`MessageCatalog`], and hand it to the pieces that need wording: locale
//! string derivation, the content-edit helper and [`i18n_text`].
//!
//! A missing key is a content defect, not a render failure. Lookups degrade
//! to a diagnostic string (see [`missing_key_message`]) so the page still
//! renders and the gap is visible both on screen and in the logs.

use std::collections::HashMap;

use tracing::warn;

use crate::locale::Locale;

/// The diagnostic returned when `key` has no translation for `locale`.
///
/// The wording is stable: monitoring and [`is_missing_key`] both match on it.
#[must_use]
pub fn missing_key_message(key: &str, locale: Locale) -> String {
    format!("KEY {key} FOR LANGUAGE {locale} NOT FOUND")
}

/// Whether `message` is the missing-key diagnostic for `key`.
#[must_use]
pub fn is_missing_key(message: &str, key: &str) -> bool {
    message.starts_with(&format!("KEY {key} FOR LANGUAGE"))
}

/// Source of translated interface strings.
pub trait Translate: Send + Sync {
    /// Look up `key` for `locale`.
    ///
    /// Implementations must return the [`missing_key_message`] diagnostic
    /// instead of failing when the key is absent.
    fn message(&self, key: &str, locale: Locale) -> String;
}

/// In-memory translation store with one table per locale.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    tables: HashMap<Locale, HashMap<String, String>>,
}

impl MessageCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation, builder style.
    #[must_use]
    pub fn with(mut self, key: &str, locale: Locale, text: &str) -> Self {
        self.insert(key, locale, text);
        self
    }

    /// Add a translation.
    pub fn insert(&mut self, key: &str, locale: Locale, text: &str) {
        self.tables
            .entry(locale)
            .or_default()
            .insert(key.to_owned(), text.to_owned());
    }
}

impl Translate for MessageCatalog {
    fn message(&self, key: &str, locale: Locale) -> String {
        self.tables
            .get(&locale)
            .and_then(|table| table.get(key))
            .cloned()
            .unwrap_or_else(|| missing_key_message(key, locale))
    }
}

/// Translate `key` (optionally extended by a data-driven postfix) for
/// `locale`, logging when the translation is missing.
///
/// Templates often assemble keys from content, e.g. a postfix of
/// `"department"` against a base key of `"field_label_"`. The diagnostic text
/// is returned as-is so the gap shows up in the rendered page.
pub fn i18n_text(
    translator: &dyn Translate,
    key: &str,
    locale: Locale,
    key_postfix: Option<&str>,
) -> String {
    let full_key = key_postfix.map_or_else(|| key.to_owned(), |postfix| format!("{key}{postfix}"));
    let text = translator.message(&full_key, locale);
    if is_missing_key(&text, &full_key) {
        warn!(key = %full_key, locale = %locale, "translation missing");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MessageCatalog {
        MessageCatalog::new()
            .with("greeting", Locale::En, "Hello")
            .with("greeting", Locale::Sv, "Hej")
            .with("field_label_date", Locale::En, "Date")
    }

    #[test]
    fn lookup_returns_the_per_locale_text() {
        let catalog = catalog();
        assert_eq!(catalog.message("greeting", Locale::En), "Hello");
        assert_eq!(catalog.message("greeting", Locale::Sv), "Hej");
    }

    #[test]
    fn missing_key_degrades_to_the_diagnostic() {
        let catalog = catalog();
        let text = catalog.message("farewell", Locale::En);
        assert_eq!(text, "KEY farewell FOR LANGUAGE en NOT FOUND");
        assert!(is_missing_key(&text, "farewell"));
    }

    #[test]
    fn diagnostic_detection_is_key_specific() {
        let text = missing_key_message("farewell", Locale::Sv);
        assert!(is_missing_key(&text, "farewell"));
        assert!(!is_missing_key(&text, "greeting"));
        assert!(!is_missing_key("Hello", "farewell"));
    }

    #[test]
    fn i18n_text_appends_the_postfix_before_lookup() {
        let catalog = catalog();
        assert_eq!(
            i18n_text(&catalog, "field_label_", Locale::En, Some("date")),
            "Date"
        );
        assert_eq!(i18n_text(&catalog, "greeting", Locale::Sv, None), "Hej");
    }
}
