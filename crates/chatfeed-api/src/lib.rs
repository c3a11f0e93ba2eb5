pub mod assemble;
pub mod cors;
pub mod error;
pub mod page;
pub mod routes;

use axum::{Router, middleware, routing::get};

use crate::routes::AppState;

/// All public routes with the CORS policy applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/html", get(routes::html_feed))
        .route("/list", get(routes::html_feed))
        .route("/json", get(routes::json_feed))
        .layer(cors::cors_layer())
        .layer(middleware::from_fn(cors::preflight_no_content))
        .with_state(state)
}
