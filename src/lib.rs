use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod cache;
pub mod catalog;
pub mod coalesce;
pub mod handlers;
pub mod html;
pub mod i18n;
pub mod locale;
pub mod models;
pub mod render;
pub mod service;
pub mod store;
pub mod structured_data;
pub mod translation;
pub mod utils;

use api::{catalog_source_for, CatalogSource, HttpTranslator, Translator};
use cache::TranslationCache;
use i18n::I18n;
use models::AppConfig;
use service::ShowcaseService;
use store::{FileStore, KeyValueStore};
use translation::TranslationService;

pub struct AppState {
    pub config: AppConfig,
    pub service: ShowcaseService<dyn CatalogSource>,
}

pub fn build_app_state(config: AppConfig) -> Arc<AppState> {
    let client = reqwest::Client::new();
    let source: Arc<dyn CatalogSource> = Arc::from(catalog_source_for(&config.catalog_source, client.clone()));
    let translator: Arc<dyn Translator> = Arc::new(HttpTranslator::new(config.translate_url.clone(), client));
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.cache_path));
    build_app_state_with(config, source, translator, store)
}

pub fn build_app_state_with(
    config: AppConfig,
    source: Arc<dyn CatalogSource>,
    translator: Arc<dyn Translator>,
    store: Arc<dyn KeyValueStore>,
) -> Arc<AppState> {
    let translations = Arc::new(TranslationService::new(
        translator,
        TranslationCache::new(store),
        &config.source_language(),
        config.translation_enabled,
    ));
    let service = ShowcaseService::new(source, translations, I18n::new(), config.clone());

    Arc::new(AppState { config, service })
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);
    Router::new()
        .route("/", get(handlers::get_page))
        .route("/healthz", get(handlers::healthz))
        .nest_service("/static", static_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "affiliate_showcase=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let port = config.port;
    tracing::info!("Catalog source: {}", config.catalog_source);
    tracing::info!(
        "Source language: {} (translation {})",
        config.source_language(),
        if config.translation_enabled { "enabled" } else { "disabled" }
    );

    let state = build_app_state(config);
    let app = build_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Showcase running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
