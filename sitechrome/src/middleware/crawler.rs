//! Canonical-URL redirect for crawler requests.
//!
//! Search crawlers index every URL variant they see: with query strings, with
//! trailing slashes, with session noise. This middleware answers crawler
//! requests with a `302 Found` to the canonical form (query stripped,
//! trailing slash trimmed) so the index stays clean. Ordinary visitors and
//! AJAX calls pass through untouched.
//!
//! The redirect is independent of the chrome pipeline; mount it only on
//! sites that are actually crawled.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::{ACCEPT, LOCATION, USER_AGENT};
use http::StatusCode;
use tracing::debug;

use crate::config::ChromeConfig;

use super::request_path;

/// Redirects crawler requests to the canonical URL.
///
/// ```rust,no_run
/// use axum::{middleware, routing::get, Router};
/// use sitechrome::middleware::CrawlerRedirect;
///
/// let crawler = CrawlerRedirect::new("https://www.example.org", "gsa-crawler");
/// let app: Router = Router::new()
///     .route("/", get(|| async { "Hello" }))
///     .layer(middleware::from_fn(move |req, next| {
///         crawler.clone().handle(req, next)
///     }));
/// ```
#[derive(Clone, Debug)]
pub struct CrawlerRedirect {
    host_url: String,
    user_agent_marker: String,
}

impl CrawlerRedirect {
    /// Create a redirect for `host_url`, matching user agents containing
    /// `user_agent_marker` (case-insensitively).
    #[must_use]
    pub fn new(host_url: impl Into<String>, user_agent_marker: impl Into<String>) -> Self {
        Self {
            host_url: host_url.into(),
            user_agent_marker: user_agent_marker.into().to_lowercase(),
        }
    }

    /// Create a redirect from configuration.
    #[must_use]
    pub fn from_config(config: &ChromeConfig) -> Self {
        Self::new(
            config.site.host_url.trim_end_matches('/'),
            config.crawler.user_agent_marker.clone(),
        )
    }

    /// Middleware entry point for `axum::middleware::from_fn`.
    pub async fn handle(self, request: Request, next: Next) -> Response {
        // AJAX calls keep their URLs; an absent Accept header means an
        // unadorned client we leave alone as well
        let Some(accept) = header_value(&request, &ACCEPT) else {
            return next.run(request).await;
        };
        if accept.contains("application/json") || !self.is_crawler(&request) {
            return next.run(request).await;
        }

        let current = format!("{}{}", self.host_url, request_path(&request));
        match canonical_url(&current) {
            Some(canonical) if canonical != current => {
                debug!(
                    user_agent = header_value(&request, &USER_AGENT).unwrap_or_default(),
                    url = %current,
                    "redirecting crawler to canonical url"
                );
                (StatusCode::FOUND, [(LOCATION, canonical)], ()).into_response()
            }
            _ => next.run(request).await,
        }
    }

    fn is_crawler(&self, request: &Request) -> bool {
        header_value(request, &USER_AGENT)
            .is_some_and(|agent| agent.to_lowercase().contains(&self.user_agent_marker))
    }
}

fn header_value<'a>(request: &'a Request, name: &http::header::HeaderName) -> Option<&'a str> {
    request.headers().get(name).and_then(|value| value.to_str().ok())
}

/// Canonical form of an absolute URL: no query, no fragment, no trailing
/// slash (except for the bare root, which keeps its slash and never
/// redirects to itself).
fn canonical_url(current: &str) -> Option<String> {
    let mut parsed = url::Url::parse(current).ok()?;
    parsed.set_query(None);
    parsed.set_fragment(None);
    let trim_slash = parsed.path() != "/" && parsed.path().ends_with('/');
    let mut canonical = parsed.to_string();
    if trim_slash {
        canonical.pop();
    }
    Some(canonical)
}
