//! Chrome middleware: binds fragment acquisition and block accumulation to
//! the request lifecycle.
//!
//! For every page request the service resolves a [`FragmentBundle`] and seeds
//! a fresh [`BlockRegistry`], both into request extensions, before the inner
//! service runs. Handlers pull them back out with the extractors in
//! [`crate::extractors`]. Requests under the static-asset prefix pass through
//! untouched.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{body::Body, extract::Request, response::Response};
use tower::{Layer, Service};

use crate::config::ChromeConfig;
use crate::fragments::{AcquisitionContext, FragmentAcquirer};
use crate::i18n::Translate;
use crate::locale::Locale;
use crate::template::BlockRegistry;

use super::request_path;

/// Layer that installs the chrome pipeline.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use axum::{routing::get, Router};
/// use sitechrome::config::ChromeConfig;
/// use sitechrome::i18n::MessageCatalog;
/// use sitechrome::middleware::ChromeLayer;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = ChromeConfig::load()?;
/// let catalog = Arc::new(MessageCatalog::new());
/// let app: Router = Router::new()
///     .route("/", get(|| async { "Hello" }))
///     .layer(ChromeLayer::new(config, catalog)?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChromeLayer {
    acquirer: Arc<FragmentAcquirer>,
    config: Arc<ChromeConfig>,
}

impl std::fmt::Debug for ChromeLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeLayer")
            .field("acquirer", &self.acquirer)
            .finish_non_exhaustive()
    }
}

impl ChromeLayer {
    /// Build the production pipeline: HTTP fragment source plus the shared
    /// cache, per configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed. An
    /// unavailable cache is not an error; the pipeline runs uncached.
    pub fn new(config: ChromeConfig, translator: Arc<dyn Translate>) -> anyhow::Result<Self> {
        let acquirer = FragmentAcquirer::from_config(&config, translator)?;
        Ok(Self::with_acquirer(config, acquirer))
    }

    /// Build the layer around an existing acquirer (custom sources, tests).
    #[must_use]
    pub fn with_acquirer(config: ChromeConfig, acquirer: FragmentAcquirer) -> Self {
        Self {
            acquirer: Arc::new(acquirer),
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for ChromeLayer {
    type Service = ChromeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ChromeService {
            inner,
            acquirer: self.acquirer.clone(),
            config: self.config.clone(),
        }
    }
}

/// Middleware service produced by [`ChromeLayer`].
#[derive(Clone)]
pub struct ChromeService<S> {
    inner: S,
    acquirer: Arc<FragmentAcquirer>,
    config: Arc<ChromeConfig>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for ChromeService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeService")
            .field("inner", &self.inner)
            .field("acquirer", &self.acquirer)
            .finish_non_exhaustive()
    }
}

impl<S> Service<Request> for ChromeService<S>
where
    S: Service<Request, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let acquirer = self.acquirer.clone();
        let config = self.config.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = request_path(&req);

            // Static assets carry no page chrome; pass through untouched
            if path.starts_with(&config.assets.static_prefix) {
                return inner.call(req).await;
            }

            let locale = req
                .extensions()
                .get::<Locale>()
                .copied()
                .unwrap_or(config.site.default_locale);

            let ctx = AcquisitionContext::new(&config, locale, path);
            let bundle = acquirer.acquire(&ctx).await;

            req.extensions_mut().insert(bundle);
            req.extensions_mut().insert(BlockRegistry::new());

            inner.call(req).await
        })
    }
}
