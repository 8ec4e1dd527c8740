//! Remote fragment source.
//!
//! Fragments live in an external content service, one HTTP resource per
//! block name. [`HttpFragmentSource`] is the production implementation; it
//! wraps the network fetch in a cache-aside path so a warm cache serves whole
//! bundles without touching the service. Tests substitute the trait to script
//! failures and count fetches.

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use http::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::config::BlockApiSettings;
use crate::fragments::acquirer::AcquisitionContext;
use crate::fragments::cache::FragmentCache;
use crate::locale::Locale;

/// Raw fragments keyed by block name, prior to post-processing.
pub type RawFragments = HashMap<String, String>;

/// Failure to produce fragments from the backing service.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent, or timed out.
    #[error("fragment request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("fragment service returned {status} for block \"{block}\"")]
    Status {
        /// Block being fetched when the service answered.
        block: String,
        /// Status code of the answer.
        status: StatusCode,
    },
}

/// Source of raw chrome fragments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Fetch the raw fragments described by `ctx`.
    ///
    /// When a cache handle is supplied the implementation may consult it
    /// before reaching the service and populate it afterwards. Failures are
    /// reported uniformly as [`FetchError`]; the caller decides how to
    /// degrade.
    async fn fetch<'a>(
        &self,
        ctx: &AcquisitionContext,
        cache: Option<&'a FragmentCache>,
    ) -> Result<RawFragments, FetchError>;
}

/// HTTP implementation backed by a shared `reqwest` client.
///
/// Blocks are fetched concurrently; the first failure aborts the whole
/// bundle, since a page with half its chrome is worse than one with none.
#[derive(Debug, Clone)]
pub struct HttpFragmentSource {
    client: reqwest::Client,
    names: Vec<String>,
    headers: HashMap<String, String>,
}

impl HttpFragmentSource {
    /// Build a source from the block service settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(settings: &BlockApiSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            names: settings.all_names(),
            headers: settings.headers.clone(),
        })
    }

    async fn fetch_block(
        &self,
        ctx: &AcquisitionContext,
        name: &str,
    ) -> Result<String, FetchError> {
        let url = format!("{}{name}", ctx.remote_url);
        let mut request = self.client.get(&url).query(&[("l", ctx.locale.as_str())]);
        for (header, value) in &self.headers {
            request = request.header(header.as_str(), value.as_str());
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                block: name.to_owned(),
                status,
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl FragmentSource for HttpFragmentSource {
    async fn fetch<'a>(
        &self,
        ctx: &AcquisitionContext,
        cache: Option<&'a FragmentCache>,
    ) -> Result<RawFragments, FetchError> {
        let suffix = cache_suffix(&ctx.cache_key_prefix, ctx.locale);

        if let Some(cache) = cache {
            if let Some(payload) = cache.get_raw(&suffix).await {
                match serde_json::from_str::<RawFragments>(&payload) {
                    Ok(raw) => {
                        debug!(locale = %ctx.locale, blocks = raw.len(), "fragments served from cache");
                        return Ok(raw);
                    }
                    Err(err) => {
                        debug!(error = %err, "cached fragment payload invalid, refetching");
                    }
                }
            }
        }

        let fetched =
            try_join_all(self.names.iter().map(|name| self.fetch_block(ctx, name))).await?;
        let raw: RawFragments = self.names.iter().cloned().zip(fetched).collect();

        if let Some(cache) = cache {
            match serde_json::to_string(&raw) {
                Ok(payload) => cache.put_raw(&suffix, &payload).await,
                Err(err) => debug!(error = %err, "fragment payload not encodable for cache"),
            }
        }

        Ok(raw)
    }
}

/// Cache key suffix for one locale's bundle.
pub(crate) fn cache_suffix(prefix: &str, locale: Locale) -> String {
    format!("{prefix}:{locale}")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::{Path, Query};
    use axum::routing::get;
    use axum::Router;

    use super::*;
    use crate::config::CacheSettings;
    use crate::fragments::cache::DEFAULT_NAMESPACE;

    struct BlockService {
        base_url: String,
        hits: Arc<AtomicUsize>,
    }

    /// Helper to serve one block per request on a local port, counting hits.
    async fn block_service() -> BlockService {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/blocks/{name}",
            get(
                move |Path(name): Path<String>, Query(params): Query<HashMap<String, String>>| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        let locale = params.get("l").cloned().unwrap_or_default();
                        format!("<div>{name}:{locale}</div>")
                    }
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        BlockService {
            base_url: format!("http://{addr}/blocks/"),
            hits,
        }
    }

    fn single_block_source() -> HttpFragmentSource {
        let settings = BlockApiSettings {
            names: vec!["header".to_owned()],
            ..BlockApiSettings::default()
        };
        HttpFragmentSource::new(&settings).expect("client builds")
    }

    fn context(remote_url: &str) -> AcquisitionContext {
        AcquisitionContext {
            locale: Locale::En,
            remote_url: remote_url.to_owned(),
            cache_key_prefix: "blocks".to_owned(),
            request_path: "/".to_owned(),
            app_base_url: "http://localhost:3000".to_owned(),
        }
    }

    #[test]
    fn cache_suffix_scopes_by_prefix_and_locale() {
        assert_eq!(cache_suffix("blocks", Locale::En), "blocks:en");
        assert_eq!(cache_suffix("blocks", Locale::Sv), "blocks:sv");
    }

    #[test]
    fn status_errors_name_the_block() {
        let err = FetchError::Status {
            block: "header".to_owned(),
            status: StatusCode::BAD_GATEWAY,
        };
        assert_eq!(
            err.to_string(),
            "fragment service returned 502 Bad Gateway for block \"header\""
        );
    }

    #[test]
    fn cached_payloads_round_trip_and_reject_garbage() {
        let mut raw = RawFragments::new();
        raw.insert("header".to_owned(), "<nav>menu</nav>".to_owned());

        let payload = serde_json::to_string(&raw).unwrap();
        assert_eq!(serde_json::from_str::<RawFragments>(&payload).unwrap(), raw);

        // A truncated or foreign value must fail the parse so the source
        // falls back to a fresh fetch
        assert!(serde_json::from_str::<RawFragments>(&payload[..payload.len() - 2]).is_err());
        assert!(serde_json::from_str::<RawFragments>("[1, 2]").is_err());
    }

    #[tokio::test]
    async fn cache_miss_fetches_blocks_and_populates_the_cache() {
        let service = block_service().await;
        let source = single_block_source();
        let cache = FragmentCache::in_memory(DEFAULT_NAMESPACE);
        let ctx = context(&service.base_url);

        let raw = source.fetch(&ctx, Some(&cache)).await.unwrap();
        assert_eq!(
            raw.get("header").map(String::as_str),
            Some("<div>header:en</div>")
        );
        assert_eq!(service.hits.load(Ordering::SeqCst), 1);

        let stored = cache
            .get_raw(&cache_suffix("blocks", Locale::En))
            .await
            .expect("fetched payload written back");
        assert_eq!(serde_json::from_str::<RawFragments>(&stored).unwrap(), raw);
    }

    #[tokio::test]
    async fn cache_hit_serves_fragments_without_touching_the_service() {
        let service = block_service().await;
        let source = single_block_source();
        let cache = FragmentCache::in_memory(DEFAULT_NAMESPACE);

        let mut cached = RawFragments::new();
        cached.insert("header".to_owned(), "<div>warm</div>".to_owned());
        cache
            .put_raw(
                &cache_suffix("blocks", Locale::En),
                &serde_json::to_string(&cached).unwrap(),
            )
            .await;

        let raw = source
            .fetch(&context(&service.base_url), Some(&cache))
            .await
            .unwrap();
        assert_eq!(raw, cached);
        assert_eq!(service.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_cached_payload_falls_back_to_a_fresh_fetch() {
        let service = block_service().await;
        let source = single_block_source();
        let cache = FragmentCache::in_memory(DEFAULT_NAMESPACE);
        let suffix = cache_suffix("blocks", Locale::En);
        cache.put_raw(&suffix, "not json").await;

        let raw = source
            .fetch(&context(&service.base_url), Some(&cache))
            .await
            .unwrap();
        assert_eq!(
            raw.get("header").map(String::as_str),
            Some("<div>header:en</div>")
        );
        assert_eq!(service.hits.load(Ordering::SeqCst), 1);

        // The unusable entry is overwritten with the fresh payload
        let stored = cache.get_raw(&suffix).await.expect("rewritten");
        assert_eq!(serde_json::from_str::<RawFragments>(&stored).unwrap(), raw);
    }

    #[tokio::test]
    async fn unreachable_cache_backend_degrades_to_a_direct_fetch() {
        let service = block_service().await;
        let source = single_block_source();
        let settings = CacheSettings {
            // Nothing listens on port 9; checkout fails fast
            url: "redis://127.0.0.1:9".to_owned(),
            ..CacheSettings::default()
        };
        let cache = FragmentCache::connect(DEFAULT_NAMESPACE, &settings).expect("lazy pool");

        let raw = source
            .fetch(&context(&service.base_url), Some(&cache))
            .await
            .unwrap();
        assert_eq!(
            raw.get("header").map(String::as_str),
            Some("<div>header:en</div>")
        );
        assert_eq!(service.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn service_errors_surface_as_status_failures() {
        let app = Router::new().route(
            "/blocks/{name}",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let source = single_block_source();
        let err = source
            .fetch(&context(&format!("http://{addr}/blocks/")), None)
            .await
            .unwrap_err();
        match err {
            FetchError::Status { block, status } => {
                assert_eq!(block, "header");
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            }
            FetchError::Request(_) => panic!("expected a status failure"),
        }
    }
}
