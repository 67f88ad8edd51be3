// src/lib.rs

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use services::{analytics::AnalyticsEngine, quote_source::QuoteSource};

#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<dyn QuoteSource>,
    pub engine: AnalyticsEngine,
}

pub mod config;
pub mod error;

pub mod models {
    pub mod analysis;
    pub mod benchmark;
    pub mod quote;
}

pub mod services {
    pub mod analytics;
    pub mod quote_source;
    pub mod scanner;
    pub mod yahoo_chart;
}

pub mod presentation {
    pub mod csv_export;
    pub mod sort;
    pub mod table;
}

pub mod handlers {
    pub mod analysis;
}

/// Build the HTTP router with every public route mounted.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::analysis::health))
        .route("/api/analyze", post(handlers::analysis::analyze))
        .route("/api/analyze/csv", post(handlers::analysis::export_csv))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
