//! Locale resolution middleware.
//!
//! Resolves the request locale before the chrome pipeline runs, storing it in
//! request extensions where [`super::ChromeLayer`] and handlers pick it up.
//!
//! Resolution order: the `l` query parameter, then `Accept-Language`, then
//! the configured default. Anything outside the supported pair is ignored and
//! resolution moves on to the next source.

use axum::{extract::Request, middleware::Next, response::Response};
use http::header::ACCEPT_LANGUAGE;
use http::HeaderMap;

use crate::config::ChromeConfig;
use crate::locale::Locale;

/// Query parameter naming the requested locale.
pub const LOCALE_PARAM: &str = "l";

/// Resolves and attaches the request locale.
///
/// ```rust,no_run
/// use axum::{middleware, routing::get, Router};
/// use sitechrome::locale::Locale;
/// use sitechrome::middleware::LocaleResolver;
///
/// let resolver = LocaleResolver::new(Locale::Sv);
/// let app: Router = Router::new()
///     .route("/", get(|| async { "Hej" }))
///     .layer(middleware::from_fn(move |req, next| resolver.handle(req, next)));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct LocaleResolver {
    default_locale: Locale,
}

impl LocaleResolver {
    /// Create a resolver with the given fallback locale.
    #[must_use]
    pub const fn new(default_locale: Locale) -> Self {
        Self { default_locale }
    }

    /// Create a resolver using the configured default locale.
    #[must_use]
    pub const fn from_config(config: &ChromeConfig) -> Self {
        Self::new(config.site.default_locale)
    }

    /// Middleware entry point for `axum::middleware::from_fn`.
    pub async fn handle(self, mut request: Request, next: Next) -> Response {
        let locale = self.resolve(&request);
        request.extensions_mut().insert(locale);
        next.run(request).await
    }

    fn resolve(self, request: &Request) -> Locale {
        query_locale(request.uri().query())
            .or_else(|| header_locale(request.headers()))
            .unwrap_or(self.default_locale)
    }
}

fn query_locale(query: Option<&str>) -> Option<Locale> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == LOCALE_PARAM)
        .and_then(|(_, value)| Locale::parse(&value))
}

fn header_locale(headers: &HeaderMap) -> Option<Locale> {
    let header = headers.get(ACCEPT_LANGUAGE)?.to_str().ok()?;
    header.split(',').find_map(|entry| {
        let tag = entry.split(';').next().unwrap_or("").trim();
        Locale::parse(tag)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, accept_language: Option<&str>) -> Request {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = accept_language {
            builder = builder.header(ACCEPT_LANGUAGE, value);
        }
        builder.body(axum::body::Body::empty()).expect("request")
    }

    #[test]
    fn query_parameter_wins_over_headers() {
        let resolver = LocaleResolver::new(Locale::Sv);
        let req = request("/news?l=en", Some("sv-SE,sv;q=0.9"));
        assert_eq!(resolver.resolve(&req), Locale::En);
    }

    #[test]
    fn accept_language_is_scanned_in_order() {
        let resolver = LocaleResolver::new(Locale::Sv);
        let req = request("/news", Some("de-DE,de;q=0.9,en-GB;q=0.8"));
        assert_eq!(resolver.resolve(&req), Locale::En);
    }

    #[test]
    fn unknown_signals_fall_back_to_the_default() {
        let resolver = LocaleResolver::new(Locale::Sv);
        let req = request("/news?l=fi", Some("de-DE"));
        assert_eq!(resolver.resolve(&req), Locale::Sv);
    }

    #[test]
    fn bare_requests_use_the_default() {
        let resolver = LocaleResolver::new(Locale::En);
        assert_eq!(resolver.resolve(&request("/", None)), Locale::En);
    }
}
