// Dashboard route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::state::AppState;
use super::handler;

/// JSON endpoints, wrapped by the response envelope
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/data", get(handler::data_handler))
        // Hit periodically by an external scheduler to keep alerts flowing
        .route("/cron", get(handler::cron_handler))
        .route("/send_telegram", post(handler::send_telegram_handler))
}

/// The HTML page; served outside the envelope
pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(handler::index_handler))
}
