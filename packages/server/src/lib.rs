#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime rate dashboard.
//!
//! Serves the catalog (periods, crime groups, place lists) and the merged
//! series for a selection as JSON. The catalog snapshot is loaded once at
//! startup; crime facts are queried on every series request.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crime_dash_catalog::config::StoreConfig;
use crime_dash_catalog::{CatalogSnapshot, CatalogStore, open_store};

/// Shared application state.
pub struct AppState {
    /// Catalog store the facts are read from.
    pub store: Arc<dyn CatalogStore>,
    /// Reference tables, loaded once.
    pub snapshot: Arc<CatalogSnapshot>,
}

impl AppState {
    /// Loads the catalog snapshot from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`crime_dash_catalog::StoreError`] if a reference table
    /// cannot be read.
    pub fn load(store: Arc<dyn CatalogStore>) -> Result<Self, crime_dash_catalog::StoreError> {
        let snapshot = CatalogSnapshot::load(store.as_ref())?;
        Ok(Self {
            store,
            snapshot: Arc::new(snapshot),
        })
    }
}

/// Registers every `/api` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/periods", web::get().to(handlers::periods))
            .route("/crime-groups", web::get().to(handlers::crime_groups))
            .route("/places", web::get().to(handlers::places))
            .route("/series", web::get().to(handlers::series)),
    );
}

/// Starts the dashboard API server.
///
/// Resolves the store configuration from the environment, opens the
/// store, loads the catalog snapshot, and serves on `BIND_ADDR:PORT`
/// with a single worker so series rebuilds never overlap. The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the store cannot be opened, the
/// catalog cannot be loaded, or the HTTP server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Resolving catalog store configuration...");
    let config = StoreConfig::from_env().map_err(std::io::Error::other)?;

    log::info!("Opening catalog store...");
    let store: Arc<dyn CatalogStore> =
        Arc::from(open_store(&config).map_err(std::io::Error::other)?);

    log::info!("Loading catalog snapshot...");
    let state = web::Data::new(AppState::load(store).map_err(std::io::Error::other)?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
    })
    .workers(1)
    .bind((bind_addr, port))?
    .run()
    .await
}
