//! # StockPOS REST API
//!
//! Axum HTTP server over the inventory ledger.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HTTP Request Flow                                │
//! │                                                                         │
//! │  Request ──► auth middleware ──► handler ──► ledger (stockpos-db)      │
//! │                  │                  │             │                     │
//! │                  │ 401/403          │ 400         │ 404/409/422/500     │
//! │                  ▼                  ▼             ▼                     │
//! │              ApiError ◄─────────────────────────────                   │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │          JSON {code, message} + status                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - environment-driven server configuration
//! - [`auth`] - JWT validation middleware and the role table
//! - [`error`] - `ApiError` and the error-to-status mapping
//! - [`routes`] - route handlers and wire DTOs

use axum::{routing::get, Extension, Router};

use stockpos_db::Database;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

/// Builds the full router: `/health` open, everything else behind auth.
pub fn build_app(db: Database, jwt_secret: &str) -> Router {
    let auth_state = auth::AuthState::new(jwt_secret);

    let protected = routes::router()
        .layer(Extension(db))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .merge(protected)
}
