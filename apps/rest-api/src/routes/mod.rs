//! HTTP routes and wire DTOs, one file per domain area.
//!
//! All wire field names are camelCase. The externally visible product key
//! is `productId`, which maps to the domain `sku`; monetary fields are
//! integer cents.

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::json;

pub mod category;
pub mod products;

/// Builds the protected route tree (auth is layered on by the caller).
pub fn router() -> Router {
    Router::new()
        .route(
            "/products",
            post(products::create_product).get(products::list_products),
        )
        .route("/products/sell-products", post(products::sell_products))
        .route(
            "/products/category",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/products/update/:productId",
            patch(products::update_product),
        )
}

/// Liveness probe; no auth, no database touch.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
