//! Introspection endpoints, nested under the configured admin prefix.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::http::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/routes", get(get_routes))
        .route("/collections/{name}", get(get_collection))
}
