//! sitechrome: shared page chrome for axum applications
//!
//! Sites in a family share their "chrome": the header, footer and menus are
//! produced by a central content service and every application stitches them
//! around its own pages. This crate does the stitching:
//!
//! - **Fragment acquisition**: fetch the chrome fragments for the request's
//!   locale, cache-aside over a shared Redis instance, and degrade to an
//!   undecorated page when anything is down. Chrome is decoration; it never
//!   breaks a page.
//! - **Layout blocks**: a per-request registry that body templates push
//!   script and style includes into, flushed exactly once where the layout
//!   wants them.
//! - **Bilingual locale handling**: requests resolve to English or Swedish,
//!   and the language switcher is always labelled in the locale it switches
//!   to.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use axum::response::Html;
//! use axum::{middleware, routing::get, Router};
//! use sitechrome::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     sitechrome::observability::init()?;
//!
//!     let config = ChromeConfig::load()?;
//!     let catalog = Arc::new(
//!         MessageCatalog::new()
//!             .with("site_name", Locale::En, "Example Site")
//!             .with("site_name", Locale::Sv, "Exempelsajten")
//!             .with("locale_text", Locale::En, "English")
//!             .with("locale_text", Locale::Sv, "Svenska"),
//!     );
//!
//!     let resolver = LocaleResolver::from_config(&config);
//!     let app = Router::new()
//!         .route("/", get(index))
//!         .layer(ChromeLayer::new(config, catalog)?)
//!         .layer(middleware::from_fn(move |req, next| resolver.handle(req, next)));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//!
//! async fn index(chrome: FragmentBundle, blocks: BlockRegistry) -> Html<String> {
//!     blocks.register("scripts", r#"<script src="/static/js/app.js"></script>"#);
//!     Html(format!(
//!         "<!doctype html><html><body>{}<main>Hej!</main>{}{}</body></html>",
//!         chrome.get_or_empty("header"),
//!         chrome.get_or_empty("footer"),
//!         blocks.flush("scripts"),
//!     ))
//! }
//! ```

// Public modules (exported in public API)
pub mod config;
pub mod error;
pub mod extractors;
pub mod fragments;
pub mod i18n;
pub mod locale;
pub mod observability;
pub mod template;

// Public middleware module (chrome, locale and crawler layers)
pub mod middleware;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use sitechrome::prelude::*;
    //! ```

    // Configuration
    pub use crate::config::ChromeConfig;

    // Error types
    pub use crate::error::ChromeError;

    // Fragment pipeline
    pub use crate::fragments::{
        AcquisitionContext, FetchError, FragmentAcquirer, FragmentBundle, FragmentCache,
        FragmentSource, HttpFragmentSource, RawFragments,
    };

    // Translations
    pub use crate::i18n::{i18n_text, MessageCatalog, Translate};

    // Locales
    pub use crate::locale::{Locale, LocaleStrings};

    // Middleware
    pub use crate::middleware::{ChromeLayer, CrawlerRedirect, LocaleResolver};

    // Template surface
    pub use crate::template::helpers::{
        breadcrumbs, content_edit, html_safe, to_json, SCRIPTS_BLOCK, STYLES_BLOCK,
    };
    pub use crate::template::{AssetHelpers, BlockRegistry, BreadcrumbItem};

    // Re-export key dependencies
    pub use axum;

    // Convenience for JSON payloads
    pub use serde_json::json;
}
