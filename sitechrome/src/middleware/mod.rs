//! Request pipeline middleware.
//!
//! Three pieces, mounted outermost-last in axum:
//!
//! 1. [`LocaleResolver`] decides the request locale.
//! 2. [`ChromeLayer`] loads chrome fragments for that locale and seeds the
//!    per-request block registry.
//! 3. [`CrawlerRedirect`] (optional) bounces crawlers to canonical URLs.
//!
//! Because axum runs the most recently added layer first, an application
//! adds them in the order `ChromeLayer`, then `LocaleResolver`, then
//! `CrawlerRedirect`.

pub mod chrome;
pub mod crawler;
pub mod locale;

pub use chrome::{ChromeLayer, ChromeService};
pub use crawler::CrawlerRedirect;
pub use locale::{LocaleResolver, LOCALE_PARAM};

use axum::extract::Request;

/// Original path plus query, exactly as received.
pub(crate) fn request_path(req: &Request) -> String {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_owned(), |pq| pq.as_str().to_owned())
}
