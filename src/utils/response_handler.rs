// Unified response envelope for the JSON API
// HandlerResponse is what handlers return; response_wrapper turns every response into ResponseFormat

use axum::{
    body::Body,
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        response::Parts,
        HeaderValue, Request, Response, StatusCode,
    },
    middleware::Next,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use tracing::{debug, error};

/// Standard JSON response format for all API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseFormat {
    pub status: String,        // HTTP status text (e.g. "OK", "NOT_FOUND")
    pub code: u16,             // HTTP status code
    pub data: Value,           // Response payload
    pub messages: Vec<String>, // Informational messages
    pub date: String,          // RFC3339 timestamp
}

/// Convenience struct for building responses in handlers
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status_code: StatusCode,
    pub data: Value,
    pub messages: Vec<String>,
}

impl HandlerResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            data: Value::Null,
            messages: Vec::new(),
        }
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Serializes any payload; a failure degrades to a 500 with the error message
    pub fn json<T: Serialize>(self, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => self.data(value),
            Err(e) => {
                error!("Failed to serialize response payload: {}", e);
                HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                    .message("Failed to serialize response")
            }
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> axum::response::Response {
        let mut response: Response<Body> = Json(json!({
            "data": self.data,
            "messages": self.messages
        }))
        .into_response();

        *response.status_mut() = self.status_code;

        // Store HandlerResponse in extensions for middleware processing
        response.extensions_mut().insert(self);
        response
    }
}

/// "Not Found" -> "NOT_FOUND"
fn status_label(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN STATUS")
        .to_uppercase()
        .replace(' ', "_")
}

fn build_final_response(mut parts: Parts, wrapped: &ResponseFormat) -> Response<Body> {
    let json_body: Vec<u8> = serde_json::to_vec(wrapped).unwrap_or_else(|_| b"{}".to_vec());

    parts.headers.remove(CONTENT_LENGTH);
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Response::from_parts(parts, Body::from(json_body))
}

/// Middleware that wraps all responses in the standard ResponseFormat structure
pub async fn response_wrapper(
    req: Request<Body>,
    next: Next,
) -> Result<Response<Body>, Infallible> {
    let response: Response<Body> = next.run(req).await;

    let (data, messages) = match response.extensions().get::<HandlerResponse>() {
        Some(r) => (r.data.clone(), r.messages.clone()),
        None => (Value::Null, Vec::new()),
    };
    let (parts, _) = response.into_parts();

    let wrapped: ResponseFormat = ResponseFormat {
        status: status_label(parts.status),
        code: parts.status.as_u16(),
        data,
        messages,
        date: Utc::now().to_rfc3339(),
    };

    debug!(code = wrapped.code, status = %wrapped.status, "Final response wrapped");

    Ok(build_final_response(parts, &wrapped))
}
