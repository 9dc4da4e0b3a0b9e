use axum::{
    Router,
    routing::{get, post},
};
use sitelang::{CatalogConfig, CatalogStore, StaticSiteDirectory};
use sitelang_mt::{Autotranslator, InMemoryEntrySource};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod api;

#[derive(Clone)]
pub struct AppState {
    /// One connection, one writer at a time
    pub store: Arc<Mutex<CatalogStore>>,
    pub sites: Arc<StaticSiteDirectory>,
    pub autotranslator: Arc<Autotranslator>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/autotranslate", post(api::autotranslate))
        .route("/api/autotranslate-text", post(api::autotranslate_text))
        .route(
            "/api/translations",
            get(api::list_translations).post(api::save_translations),
        )
        .route("/api/entries/row", post(api::save_entry_row))
        .route("/api/groups", get(api::list_groups))
        .route("/api/export", get(api::export))
        .route("/api/import", post(api::import))
        .route("/api/options", get(api::options))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = CatalogConfig::load(&CatalogConfig::resolve_path(None))?;
    let sites = Arc::new(config.site_directory()?);
    let store = CatalogStore::open(&config.database)?;

    let entries = match &config.entries {
        Some(path) => InMemoryEntrySource::load(path)?,
        None => InMemoryEntrySource::new(),
    };
    let autotranslator =
        Autotranslator::from_config(&config.autotranslate, sites.clone(), Arc::new(entries));
    if let Some(reason) = autotranslator.availability().reason() {
        info!("Autotranslate off: {}", reason);
    }

    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        sites,
        autotranslator: Arc::new(autotranslator),
    };

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("Server running at http://{}", config.listen);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
