//! Template helper functions for page chrome composition.
//!
//! String builders used while assembling a page around the fetched chrome:
//! versioned asset URLs, breadcrumb trails and content-editing affordances.
//! Everything returns plain `String`s so the helpers work with any template
//! approach.
//!
//! ```rust
//! use sitechrome::template::helpers::AssetHelpers;
//!
//! let assets = AssetHelpers::new("/campus", "1.2.3");
//! assert_eq!(
//!     assets.script_tag("/js/app.js"),
//!     r#"<script src="/campus/js/app.js?v=1.2.3"></script>"#
//! );
//! ```

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::config::ChromeConfig;
use crate::i18n::Translate;
use crate::locale::Locale;
use crate::template::blocks::BlockRegistry;

/// Default block name for script includes.
pub const SCRIPTS_BLOCK: &str = "scripts";

/// Default block name for stylesheet includes.
pub const STYLES_BLOCK: &str = "styles";

/// The characters JavaScript's `encodeURIComponent` leaves verbatim;
/// everything else in a version string is percent-encoded.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// =============================================================================
// Asset URL Helpers
// =============================================================================

/// Versioned asset URL builders bound to the configured mount prefix and
/// release version.
#[derive(Debug, Clone)]
pub struct AssetHelpers {
    base_path: String,
    version: String,
}

impl AssetHelpers {
    /// Create helpers for a mount prefix (may be empty) and asset version.
    #[must_use]
    pub fn new(base_path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            version: version.into(),
        }
    }

    /// Bind to the configured proxy prefix and asset version.
    #[must_use]
    pub fn from_config(config: &ChromeConfig) -> Self {
        Self::new(
            config.site.proxy_prefix.clone(),
            config.assets.version.clone(),
        )
    }

    /// Append the cache-busting version query to a URL, verbatim.
    ///
    /// ```rust
    /// use sitechrome::template::helpers::AssetHelpers;
    ///
    /// let assets = AssetHelpers::new("", "1.2.3");
    /// assert_eq!(assets.with_asset_version("/js/app.js"), "/js/app.js?v=1.2.3");
    /// ```
    #[must_use]
    pub fn with_asset_version(&self, url: &str) -> String {
        format!("{url}?v={}", self.version)
    }

    /// Prefix a root-relative URL with the mount prefix.
    ///
    /// ```rust
    /// use sitechrome::template::helpers::AssetHelpers;
    ///
    /// let assets = AssetHelpers::new("/proxy", "1.2.3");
    /// assert_eq!(assets.with_base_prefix("/js/app.js"), "/proxy/js/app.js");
    /// ```
    #[must_use]
    pub fn with_base_prefix(&self, url: &str) -> String {
        format!("{}{url}", self.base_path)
    }

    /// `<script>` inclusion tag for a prefixed, versioned asset URL.
    #[must_use]
    pub fn script_tag(&self, url: &str) -> String {
        format!(r#"<script src="{}"></script>"#, self.encoded_asset_url(url))
    }

    /// `<link rel="stylesheet">` tag for a prefixed, versioned asset URL.
    #[must_use]
    pub fn style_tag(&self, url: &str, media: &str) -> String {
        format!(
            r#"<link href="{}" media="{media}" rel="stylesheet">"#,
            self.encoded_asset_url(url)
        )
    }

    /// Register a script include under `block_name` ([`SCRIPTS_BLOCK`] when
    /// `None`).
    pub fn register_script(&self, blocks: &BlockRegistry, url: &str, block_name: Option<&str>) {
        blocks.register(block_name.unwrap_or(SCRIPTS_BLOCK), self.script_tag(url));
    }

    /// Register a stylesheet include under `block_name` ([`STYLES_BLOCK`]
    /// when `None`); `media` defaults to `"all"`.
    pub fn register_style(
        &self,
        blocks: &BlockRegistry,
        url: &str,
        block_name: Option<&str>,
        media: Option<&str>,
    ) {
        blocks.register(
            block_name.unwrap_or(STYLES_BLOCK),
            self.style_tag(url, media.unwrap_or("all")),
        );
    }

    /// Tag URLs carry the version percent-encoded; the bare
    /// [`Self::with_asset_version`] keeps it verbatim.
    fn encoded_asset_url(&self, url: &str) -> String {
        let version = utf8_percent_encode(&self.version, URI_COMPONENT);
        format!("{}{url}?v={version}", self.base_path)
    }
}

// =============================================================================
// Breadcrumb Helpers
// =============================================================================

/// One entry in a breadcrumb trail.
#[derive(Debug, Clone)]
pub struct BreadcrumbItem {
    /// Link target; a plain label when `None`.
    pub url: Option<String>,
    /// Visible text.
    pub label: String,
}

impl BreadcrumbItem {
    /// Linked entry.
    #[must_use]
    pub fn link(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            label: label.into(),
        }
    }

    /// Unlinked entry, typically the current page.
    #[must_use]
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            url: None,
            label: label.into(),
        }
    }
}

/// Render a breadcrumb trail with a leading host link.
///
/// Absolute link protocols are rewritten to `//` so every entry inherits the
/// scheme the page was served over.
#[must_use]
pub fn breadcrumbs(items: &[BreadcrumbItem], host_url: &str, host_name: &str) -> String {
    let mut out = String::from(r#"<div class="breadcrumbs">"#);
    out.push_str(&format!(
        r#"<a href="{}">{host_name}</a>"#,
        protocol_relative(host_url)
    ));
    for item in items {
        out.push_str(r#"<span class="separator">/</span>"#);
        match &item.url {
            Some(url) => out.push_str(&format!(
                r#"<a href="{}">{}</a>"#,
                protocol_relative(url),
                item.label
            )),
            None => out.push_str(&format!(
                r#"<span class="breadcrumbLabel">{}</span>"#,
                item.label
            )),
        }
    }
    out.push_str("</div>");
    out
}

fn protocol_relative(url: &str) -> String {
    url.replacen("https://", "//", 1).replacen("http://", "//", 1)
}

// =============================================================================
// Content Helpers
// =============================================================================

/// Inline pencil icon; `currentColor` lets it inherit the surrounding text
/// colour.
const EDIT_ICON_SVG: &str = r#"<svg width="1em" height="1em" viewBox="0 0 1792 1792" xmlns="http://www.w3.org/2000/svg" style="margin-bottom: -0.125em; fill: currentColor;"><path d="M491 1536l91-91-235-235-91 91v107h128v128h107zm523-928q0-22-22-22-10 0-17 7l-542 542q-7 7-7 17 0 22 22 22 10 0 17-7l542-542q7-7 7-17zm-54-192l416 416-832 832h-416v-416zm683 96q0 53-37 90l-166 166-416-416 166-165q36-38 90-38 53 0 91 38l235 234q37 39 37 91z"/></svg>"#;

/// Render an "edit this content" button linking into the content editor.
///
/// With a `visibility` of e.g. `"public"`, the translation under
/// `field_label_showing_public` is rendered ahead of the link and used as its
/// title.
#[must_use]
pub fn content_edit(
    translator: &dyn Translate,
    label_key: &str,
    edit_url: &str,
    locale: Locale,
    visibility: Option<&str>,
) -> String {
    let visibility_label = visibility.map_or_else(String::new, |v| {
        translator.message(&format!("field_label_showing_{v}"), locale)
    });
    let mut out = String::from(r#"<div class="edit-button-and-info">"#);
    if !visibility_label.is_empty() {
        out.push_str(&visibility_label);
        out.push_str(" | ");
    }
    out.push_str(&format!(
        r#"<a title="{visibility_label}" href="{edit_url}">"#
    ));
    out.push_str(&translator.message(label_key, locale));
    out.push_str(&format!(
        r#"<span class="icon" aria-hidden="true" style="color: currentColor">{EDIT_ICON_SVG}</span>"#
    ));
    out.push_str("</a></div>");
    out
}

/// Normalize text to safely escaped HTML.
///
/// Already-encoded entities are decoded first so nothing double-encodes.
///
/// ```rust
/// use sitechrome::template::helpers::html_safe;
///
/// assert_eq!(html_safe("R&D <dept>"), "R&amp;D &lt;dept&gt;");
/// assert_eq!(html_safe("R&amp;D"), "R&amp;D");
/// ```
#[must_use]
pub fn html_safe(input: &str) -> String {
    let decoded = html_escape::decode_html_entities(input);
    html_escape::encode_safe(decoded.as_ref()).into_owned()
}

/// Serialize a value to JSON for embedding in attributes or inline scripts.
///
/// Serialization of plain data does not fail; if a custom `Serialize`
/// implementation errors, the diagnostic is returned as a JSON string so the
/// page still renders.
#[must_use]
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|err| serde_json::Value::String(err.to_string()).to_string())
}
