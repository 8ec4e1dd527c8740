//! Per-request bundle of page chrome fragments.

use std::collections::HashMap;
use std::sync::Arc;

use crate::locale::{Locale, LocaleStrings};

/// Immutable set of rendered chrome fragments for one request.
///
/// Produced once per request by the acquirer and attached to request
/// extensions; clones share the underlying storage. The empty bundle is the
/// degradation sentinel: when acquisition is skipped or fails, templates see
/// no fragments and render the page without decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentBundle {
    blocks: Arc<HashMap<String, String>>,
    strings: LocaleStrings,
    locale: Locale,
}

impl FragmentBundle {
    pub(crate) fn new(
        locale: Locale,
        blocks: HashMap<String, String>,
        strings: LocaleStrings,
    ) -> Self {
        Self {
            blocks: Arc::new(blocks),
            strings,
            locale,
        }
    }

    /// The degradation sentinel: no fragments, empty locale strings.
    #[must_use]
    pub fn empty(locale: Locale) -> Self {
        Self::new(locale, HashMap::new(), LocaleStrings::default())
    }

    /// Fragment markup for `name`, if the remote service provided it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.blocks.get(name).map(String::as_str)
    }

    /// Fragment markup for `name`, or `""` when absent.
    ///
    /// Templates use this directly so a degraded bundle renders as missing
    /// decoration rather than an error.
    #[must_use]
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Whether any fragments were acquired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of fragments in the bundle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Iterate `(name, markup)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.blocks
            .iter()
            .map(|(name, markup)| (name.as_str(), markup.as_str()))
    }

    /// Locale this bundle was produced for.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Locale-derived strings (site name and language-switch label).
    #[must_use]
    pub const fn strings(&self) -> &LocaleStrings {
        &self.strings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bundle_has_no_fragments_and_default_strings() {
        let bundle = FragmentBundle::empty(Locale::En);
        assert!(bundle.is_empty());
        assert_eq!(bundle.len(), 0);
        assert_eq!(bundle.get("header"), None);
        assert_eq!(bundle.get_or_empty("header"), "");
        assert_eq!(bundle.locale(), Locale::En);
        assert_eq!(bundle.strings(), &LocaleStrings::default());
    }

    #[test]
    fn clones_share_storage() {
        let mut blocks = HashMap::new();
        blocks.insert("header".to_owned(), "<nav></nav>".to_owned());
        let bundle = FragmentBundle::new(Locale::Sv, blocks, LocaleStrings::default());
        let clone = bundle.clone();
        assert_eq!(clone.get("header"), Some("<nav></nav>"));
        assert_eq!(bundle, clone);
    }
}
