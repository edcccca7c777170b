// Unknown routes

use axum::http::{StatusCode, Uri};
use tracing::debug;

use crate::utils::response_handler::HandlerResponse;

pub async fn fallback_handler(uri: Uri) -> HandlerResponse {
    debug!("No route for {}", uri.path());

    HandlerResponse::new(StatusCode::NOT_FOUND).message("The requested route does not exist")
}
