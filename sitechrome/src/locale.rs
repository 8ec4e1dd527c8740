//! Request locale handling for a bilingual site.
//!
//! Every request is bound to exactly one of the two supported locales and the
//! language switcher in the page header always links to the other one, so the
//! "other" locale is a first-class operation here rather than ad-hoc string
//! flipping at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::i18n::Translate;

/// A supported page locale.
///
/// The set is closed: content pipelines upstream only produce English and
/// Swedish fragments, and [`Locale::opposite`] relies on the pairing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    En,
    /// Swedish.
    #[default]
    Sv,
}

impl Locale {
    /// Canonical two-letter language code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Sv => "sv",
        }
    }

    /// The other supported locale.
    ///
    /// The language-switch label must be written in the locale the reader
    /// would switch to, so that lookup goes through this method rather than
    /// reusing the current locale.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::En => Self::Sv,
            Self::Sv => Self::En,
        }
    }

    /// Parse a language tag, tolerating case and region suffixes
    /// (`"en-US"`, `"sv_SE"`).
    ///
    /// Returns `None` for anything outside the supported pair; callers fall
    /// back to their configured default.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let language = normalized.split(['-', '_']).next().unwrap_or("");
        match language {
            "en" => Some(Self::En),
            "sv" => Some(Self::Sv),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locale-derived strings attached to every fragment bundle.
///
/// `locale_label` is resolved against the opposite locale: when the page is
/// English the label reads "Svenska" so the switch target is named in its own
/// language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleStrings {
    /// Site display name in the current locale.
    pub site_name: String,
    /// Language-switch label, written in the opposite locale.
    pub locale_label: String,
}

impl LocaleStrings {
    /// Derive the strings for `locale` from the given translator.
    #[must_use]
    pub fn derive(translator: &dyn Translate, locale: Locale) -> Self {
        Self {
            site_name: translator.message("site_name", locale),
            locale_label: translator.message("locale_text", locale.opposite()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::MessageCatalog;

    #[test]
    fn parse_accepts_case_and_region_variants() {
        assert_eq!(Locale::parse("en"), Some(Locale::En));
        assert_eq!(Locale::parse("EN"), Some(Locale::En));
        assert_eq!(Locale::parse("en-US"), Some(Locale::En));
        assert_eq!(Locale::parse("sv_SE"), Some(Locale::Sv));
        assert_eq!(Locale::parse(" sv "), Some(Locale::Sv));
    }

    #[test]
    fn parse_rejects_unsupported_tags() {
        assert_eq!(Locale::parse("de"), None);
        assert_eq!(Locale::parse(""), None);
        assert_eq!(Locale::parse("english"), None);
    }

    #[test]
    fn opposite_is_an_involution() {
        for locale in [Locale::En, Locale::Sv] {
            assert_ne!(locale.opposite(), locale);
            assert_eq!(locale.opposite().opposite(), locale);
        }
    }

    #[test]
    fn locale_strings_use_the_opposite_locale_for_the_switch_label() {
        let catalog = MessageCatalog::new()
            .with("site_name", Locale::En, "Example Site")
            .with("site_name", Locale::Sv, "Exempelsajten")
            .with("locale_text", Locale::En, "English")
            .with("locale_text", Locale::Sv, "Svenska");

        let english = LocaleStrings::derive(&catalog, Locale::En);
        assert_eq!(english.site_name, "Example Site");
        assert_eq!(english.locale_label, "Svenska");

        let swedish = LocaleStrings::derive(&catalog, Locale::Sv);
        assert_eq!(swedish.site_name, "Exempelsajten");
        assert_eq!(swedish.locale_label, "English");
    }
}
