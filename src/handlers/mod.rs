pub mod properties;
pub mod reports;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports", get(reports::report))
        .route("/api/properties/valuations", get(properties::valuations))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
