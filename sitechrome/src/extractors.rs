//! Request extractors for chrome state.
//!
//! [`FragmentBundle`] and [`BlockRegistry`] are seeded into request
//! extensions by [`crate::middleware::ChromeLayer`]; handlers extract them by
//! declaring them as arguments.
//!
//! ```rust
//! use axum::{routing::get, Router};
//! use sitechrome::fragments::FragmentBundle;
//! use sitechrome::template::BlockRegistry;
//!
//! async fn page(chrome: FragmentBundle, blocks: BlockRegistry) -> String {
//!     blocks.register("scripts", r#"<script src="/js/page.js"></script>"#);
//!     format!(
//!         "{}...{}",
//!         chrome.get_or_empty("header"),
//!         blocks.flush("scripts")
//!     )
//! }
//!
//! let _app: Router = Router::new().route("/", get(page));
//! ```
//!
//! Extraction fails with a 500 only when the layer is missing or the route is
//! mounted under the static prefix; both are wiring mistakes, surfaced loudly
//! so they are caught in development.

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::StatusCode;

use crate::fragments::FragmentBundle;
use crate::template::BlockRegistry;

impl<S> FromRequestParts<S> for FragmentBundle
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Chrome fragments not loaded; is ChromeLayer installed on this route?",
        ))
    }
}

impl<S> FromRequestParts<S> for BlockRegistry
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Block registry not initialized; is ChromeLayer installed on this route?",
        ))
    }
}
