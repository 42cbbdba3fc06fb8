//! # carteira-api: Axum API Service for the Carteira Stack
//!
//! HTTP CRUD over people and their investments. Records live in memory
//! and are optionally written through to PostgreSQL.
//!
//! ## API Surface
//!
//! | Prefix                | Module                     | Domain       |
//! |-----------------------|----------------------------|--------------|
//! | `/api/pessoa/*`       | [`routes::pessoa`]         | People       |
//! | `/api/investimento/*` | [`routes::investimento`]   | Investments  |
//! | `/openapi.json`       | [`openapi`]                | API document |
//! | `/health/*`           | this module                | Probes       |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → DefaultBodyLimit → OperationLog (per route) → Handler
//! ```

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod service;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the API layers.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.body_limit;

    let api = Router::new()
        .merge(routes::pessoa::router())
        .merge(routes::investimento::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::tracing_layer::layer())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
