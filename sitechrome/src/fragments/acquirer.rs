//! Fragment acquisition pipeline.
//!
//! [`FragmentAcquirer`] turns a per-request [`AcquisitionContext`] into a
//! [`FragmentBundle`]: skip static-asset paths, run the source (cache-aside
//! around the remote service), then post-process the raw markup with
//! locale-derived strings and request URLs.
//!
//! The pipeline is fail-open by construction. Page chrome is decoration;
//! no infrastructure failure here may turn into a user-facing error, so
//! [`FragmentAcquirer::acquire`] is infallible and degrades to the empty
//! bundle with a warning in the log.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{CacheSettings, ChromeConfig};
use crate::fragments::bundle::FragmentBundle;
use crate::fragments::cache::{self, FragmentCache};
use crate::fragments::source::{FetchError, FragmentSource, HttpFragmentSource, RawFragments};
use crate::i18n::Translate;
use crate::locale::{Locale, LocaleStrings};

const SITE_NAME_TOKEN: &str = "{{siteName}}";
const LOCALE_TEXT_TOKEN: &str = "{{localeText}}";
const APP_URL_TOKEN: &str = "{{appUrl}}";
const REQUEST_URL_TOKEN: &str = "{{requestUrl}}";

/// Read-only inputs for one acquisition.
#[derive(Debug, Clone)]
pub struct AcquisitionContext {
    /// Locale the page is rendered in.
    pub locale: Locale,

    /// Base URL of the remote fragment service.
    pub remote_url: String,

    /// Cache key prefix for this application's fragments.
    pub cache_key_prefix: String,

    /// Original request path and query, exactly as received.
    pub request_path: String,

    /// Public base URL of the application (host plus proxy prefix).
    pub app_base_url: String,
}

impl AcquisitionContext {
    /// Build a context from configuration plus the per-request inputs.
    #[must_use]
    pub fn new(config: &ChromeConfig, locale: Locale, request_path: impl Into<String>) -> Self {
        Self {
            locale,
            remote_url: config.blocks.remote_url.clone(),
            cache_key_prefix: config.blocks.cache.key_prefix.clone(),
            request_path: request_path.into(),
            app_base_url: config.app_base_url(),
        }
    }
}

/// Orchestrates cache, remote fetch and post-processing for one request at a
/// time.
pub struct FragmentAcquirer {
    source: Arc<dyn FragmentSource>,
    cache: Option<FragmentCache>,
    translator: Arc<dyn Translate>,
    static_prefix: String,
}

impl fmt::Debug for FragmentAcquirer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentAcquirer")
            .field("cached", &self.cache.is_some())
            .field("static_prefix", &self.static_prefix)
            .finish_non_exhaustive()
    }
}

impl FragmentAcquirer {
    /// Assemble an acquirer from explicit parts.
    ///
    /// Useful in tests and for callers bringing their own
    /// [`FragmentSource`]; production wiring goes through
    /// [`Self::from_config`].
    #[must_use]
    pub fn new(
        source: Arc<dyn FragmentSource>,
        cache: Option<FragmentCache>,
        translator: Arc<dyn Translate>,
        static_prefix: &str,
    ) -> Self {
        Self {
            source,
            cache,
            translator,
            static_prefix: static_prefix.to_owned(),
        }
    }

    /// Build the production acquirer: HTTP source plus, when enabled and
    /// constructible, the shared cache.
    ///
    /// A cache that cannot be set up is logged and skipped; fragments are
    /// then fetched directly on every request.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn from_config(
        config: &ChromeConfig,
        translator: Arc<dyn Translate>,
    ) -> anyhow::Result<Self> {
        let source = HttpFragmentSource::new(&config.blocks)?;
        let cache = build_cache(&config.blocks.cache);
        Ok(Self::new(
            Arc::new(source),
            cache,
            translator,
            &config.assets.static_prefix,
        ))
    }

    /// Resolve the fragment bundle for `ctx`.
    ///
    /// Never fails: static-asset paths skip acquisition outright, and every
    /// infrastructure failure degrades to [`FragmentBundle::empty`] so the
    /// page renders without decoration.
    pub async fn acquire(&self, ctx: &AcquisitionContext) -> FragmentBundle {
        if ctx.request_path.starts_with(&self.static_prefix) {
            return FragmentBundle::empty(ctx.locale);
        }
        match self.try_acquire(ctx).await {
            Ok(bundle) => {
                debug!(locale = %ctx.locale, blocks = bundle.len(), "chrome fragments ready");
                bundle
            }
            Err(err) => {
                warn!(
                    locale = %ctx.locale,
                    error = %err,
                    "fragment acquisition failed, rendering without chrome"
                );
                FragmentBundle::empty(ctx.locale)
            }
        }
    }

    async fn try_acquire(&self, ctx: &AcquisitionContext) -> Result<FragmentBundle, FetchError> {
        let raw = self.source.fetch(ctx, self.cache.as_ref()).await?;
        Ok(self.prepare(ctx, raw))
    }

    /// Post-process raw fragments: site name, opposite-locale switch label
    /// and request URL tokens.
    fn prepare(&self, ctx: &AcquisitionContext, raw: RawFragments) -> FragmentBundle {
        let strings = LocaleStrings::derive(self.translator.as_ref(), ctx.locale);
        let request_url = format!("{}{}", ctx.app_base_url, ctx.request_path);
        let blocks = raw
            .into_iter()
            .map(|(name, markup)| {
                let markup = markup
                    .replace(SITE_NAME_TOKEN, &strings.site_name)
                    .replace(LOCALE_TEXT_TOKEN, &strings.locale_label)
                    .replace(APP_URL_TOKEN, &ctx.app_base_url)
                    .replace(REQUEST_URL_TOKEN, &request_url);
                (name, markup)
            })
            .collect();
        FragmentBundle::new(ctx.locale, blocks, strings)
    }
}

fn build_cache(settings: &CacheSettings) -> Option<FragmentCache> {
    if !settings.enabled {
        debug!("fragment cache disabled by configuration");
        return None;
    }
    match FragmentCache::connect(cache::DEFAULT_NAMESPACE, settings) {
        Ok(cache) => Some(cache),
        Err(err) => {
            warn!(error = %err, "fragment cache unavailable, continuing without it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments::source::MockFragmentSource;
    use crate::i18n::MessageCatalog;
    use http::StatusCode;

    fn catalog() -> Arc<MessageCatalog> {
        Arc::new(
            MessageCatalog::new()
                .with("site_name", Locale::En, "Example Site")
                .with("site_name", Locale::Sv, "Exempelsajten")
                .with("locale_text", Locale::En, "English")
                .with("locale_text", Locale::Sv, "Svenska"),
        )
    }

    fn context(locale: Locale, request_path: &str) -> AcquisitionContext {
        let mut config = ChromeConfig::default();
        config.site.host_url = "https://www.example.org".to_owned();
        config.site.proxy_prefix = "/campus".to_owned();
        AcquisitionContext::new(&config, locale, request_path)
    }

    fn acquirer(source: MockFragmentSource) -> FragmentAcquirer {
        FragmentAcquirer::new(Arc::new(source), None, catalog(), "/static/")
    }

    #[tokio::test]
    async fn static_paths_bypass_the_source_entirely() {
        let mut source = MockFragmentSource::new();
        source.expect_fetch().times(0);

        let bundle = acquirer(source)
            .acquire(&context(Locale::En, "/static/css/app.css"))
            .await;
        assert_eq!(bundle, FragmentBundle::empty(Locale::En));
    }

    #[tokio::test]
    async fn source_failure_degrades_to_the_empty_bundle() {
        let mut source = MockFragmentSource::new();
        source.expect_fetch().times(1).returning(|_, _| {
            Err(FetchError::Status {
                block: "header".to_owned(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            })
        });

        let bundle = acquirer(source).acquire(&context(Locale::Sv, "/")).await;
        assert_eq!(bundle, FragmentBundle::empty(Locale::Sv));
    }

    #[tokio::test]
    async fn fragments_are_post_processed_with_locale_strings_and_urls() {
        let mut source = MockFragmentSource::new();
        source.expect_fetch().times(1).returning(|_, _| {
            let mut raw = RawFragments::new();
            raw.insert(
                "header".to_owned(),
                "<a href=\"{{appUrl}}\">{{siteName}}</a>\
                 <a href=\"{{requestUrl}}?l=sv\">{{localeText}}</a>"
                    .to_owned(),
            );
            Ok(raw)
        });

        let bundle = acquirer(source)
            .acquire(&context(Locale::En, "/news"))
            .await;
        assert_eq!(
            bundle.get("header"),
            Some(
                "<a href=\"https://www.example.org/campus\">Example Site</a>\
                 <a href=\"https://www.example.org/campus/news?l=sv\">Svenska</a>"
            )
        );
        assert_eq!(bundle.strings().site_name, "Example Site");
        assert_eq!(bundle.strings().locale_label, "Svenska");
        assert_eq!(bundle.locale(), Locale::En);
    }

    #[tokio::test]
    async fn missing_translations_still_produce_a_bundle() {
        let mut source = MockFragmentSource::new();
        source.expect_fetch().times(1).returning(|_, _| {
            let mut raw = RawFragments::new();
            raw.insert("footer".to_owned(), "{{siteName}}".to_owned());
            Ok(raw)
        });

        let empty_catalog = Arc::new(MessageCatalog::new());
        let acquirer =
            FragmentAcquirer::new(Arc::new(source), None, empty_catalog, "/static/");
        let bundle = acquirer.acquire(&context(Locale::En, "/")).await;
        assert_eq!(
            bundle.get("footer"),
            Some("KEY site_name FOR LANGUAGE en NOT FOUND")
        );
    }
}
