// Dashboard handlers: cached data, cron refresh and manual Telegram summary

use serde_json::json;
use axum::{body::Bytes, extract::State, http::StatusCode, response::Html};
use tracing::{instrument, info, warn};

use crate::config::state::AppState;
use crate::services::NavError;
use crate::utils::response_handler::HandlerResponse;

const INDEX_HTML: &str = include_str!("../../../static/index.html");

fn nav_error_response(err: NavError) -> HandlerResponse {
    match err {
        NavError::HoldingsNotFound => HandlerResponse::new(StatusCode::SERVICE_UNAVAILABLE)
            .data(json!({ "error": err.to_string() }))
            .message("Holdings file is missing or empty"),
    }
}

/// Dashboard page
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Returns the dashboard, from cache while fresh
#[instrument(skip(state))]
pub async fn data_handler(State(state): State<AppState>) -> HandlerResponse {
    match state.nav.dashboard().await {
        Ok(dashboard) => HandlerResponse::new(StatusCode::OK).json(&dashboard),
        Err(e) => {
            warn!("Dashboard unavailable: {}", e);
            nav_error_response(e)
        }
    }
}

/// Forces a refresh so alert thresholds are checked even without viewers
#[instrument(skip(state))]
pub async fn cron_handler(State(state): State<AppState>) -> HandlerResponse {
    let time = match state.nav.refresh().await {
        Ok(dashboard) => Some(dashboard.last_updated),
        Err(e) => {
            warn!("Cron refresh failed: {}", e);
            None
        }
    };

    info!("Cron check done");

    HandlerResponse::new(StatusCode::OK).data(json!({ "status": "checked", "time": time }))
}

/// Pushes a summary of every fund to Telegram
#[instrument(skip(state, _body))]
pub async fn send_telegram_handler(
    State(state): State<AppState>,
    _body: Bytes, // Forces body reading and triggers size limits
) -> HandlerResponse {
    let outcome = state.nav.send_summary().await;
    let message = outcome.message.clone();

    HandlerResponse::new(StatusCode::OK)
        .json(&outcome)
        .message(message)
}
