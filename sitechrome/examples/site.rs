//! Basic sitechrome server example
//!
//! Demonstrates:
//! - Configuration loading
//! - Observability initialization
//! - Mounting the chrome, locale and crawler middleware in order
//! - Rendering pages inside the shared chrome with accumulated asset blocks
//!
//! Run with: `cargo run --example site`

use std::sync::Arc;

use axum::{extract::State, middleware::from_fn, response::Html, routing::get, Router};
use sitechrome::{observability, prelude::*};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize observability (logging, tracing)
    observability::init()?;

    tracing::info!("Starting sitechrome example server");

    let config = ChromeConfig::load()?;
    tracing::info!(
        remote_url = %config.blocks.remote_url,
        default_locale = %config.site.default_locale,
        cache_enabled = config.blocks.cache.enabled,
        "Configuration loaded"
    );

    let catalog: Arc<dyn Translate> = Arc::new(
        MessageCatalog::new()
            .with("site_name", Locale::En, "Example Site")
            .with("site_name", Locale::Sv, "Exempelsajten")
            .with("locale_text", Locale::En, "English")
            .with("locale_text", Locale::Sv, "Svenska"),
    );

    let assets = Arc::new(AssetHelpers::from_config(&config));
    let resolver = LocaleResolver::from_config(&config);
    let crawler = CrawlerRedirect::from_config(&config);

    // Layers run bottom-up: crawler redirect first, then locale resolution,
    // then fragment acquisition, then the handler
    let app = Router::new()
        .route("/", get(index))
        .route("/about", get(about))
        .layer(ChromeLayer::new(config, catalog)?)
        .layer(from_fn(move |req, next| resolver.handle(req, next)))
        .layer(from_fn(move |req, next| crawler.clone().handle(req, next)))
        .layer(TraceLayer::new_for_http())
        .with_state(assets);

    // Start server
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Server listening on http://127.0.0.1:3000");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Index handler - renders a page inside the shared chrome
async fn index(
    State(assets): State<Arc<AssetHelpers>>,
    bundle: FragmentBundle,
    blocks: BlockRegistry,
) -> Html<String> {
    assets.register_style(&blocks, "/static/css/site.css", None, None);
    assets.register_script(&blocks, "/static/js/site.js", None);

    render_page(
        &bundle,
        &blocks,
        "<h1>Welcome</h1>\n<p>This page is wrapped in the shared chrome.</p>",
    )
}

/// About handler - demonstrates the breadcrumb helper
async fn about(
    State(assets): State<Arc<AssetHelpers>>,
    bundle: FragmentBundle,
    blocks: BlockRegistry,
) -> Html<String> {
    assets.register_style(&blocks, "/static/css/site.css", None, None);

    let trail = breadcrumbs(
        &[BreadcrumbItem::text("About")],
        "http://localhost:3000",
        &bundle.strings().site_name,
    );
    render_page(&bundle, &blocks, &format!("{trail}\n<h1>About</h1>"))
}

/// Assemble a full page: chrome header and footer around the content, with
/// the accumulated style and script blocks flushed into place.
fn render_page(bundle: &FragmentBundle, blocks: &BlockRegistry, content: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>
<html lang=\"{lang}\">
<head>
    <title>{title}</title>
{styles}
</head>
<body>
{header}
{content}
{footer}
{scripts}
</body>
</html>",
        lang = bundle.locale(),
        title = bundle.strings().site_name,
        styles = blocks.flush(STYLES_BLOCK),
        header = bundle.get_or_empty("header"),
        footer = bundle.get_or_empty("footer"),
        scripts = blocks.flush(SCRIPTS_BLOCK),
    ))
}
