//! # Quire Server
//!
//! Resource server for documents, sections and subsections.
//!
//! ```text
//! HTTP (axum) ── routes ── Database::call ── queries ── SQLite
//! ```
//!
//! Every handler runs its queries on the blocking pool with exclusive
//! access to the single connection.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;

pub use config::ServerConfig;
pub use db::Database;
pub use error::{ApiError, DbError, DbResult};

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }
}

/// Full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
