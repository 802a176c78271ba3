//! Axum Handlers for the HTTP endpoints
//!
//! The telephony provider calls `/incoming-call` when a call arrives; the
//! answer tells it to open a media stream back to `/media-stream`.

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{info, warn};

use crate::{
    signature::{self, SIGNATURE_HEADER},
    state::AppState,
};

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

pub enum ApiError {
    BadRequest(String),
    Forbidden,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: "Forbidden".to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// Health check endpoint.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Answers an incoming call with markup that connects it to the media stream.
///
/// When an auth token is configured the request signature is checked before
/// anything else, then the caller allow-list.
pub async fn incoming_call(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    Form(form): Form<BTreeMap<String, String>>,
) -> Result<Response, ApiError> {
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty());

    if let Some(auth_token) = &state.config.twilio_auth_token {
        let proto = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("https");
        let url = format!("{}://{}{}", proto, host.unwrap_or_default(), uri.path());
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !signature::verify(auth_token, &url, &form, signature) {
            warn!(%url, "Invalid webhook signature");
            return Err(ApiError::Forbidden);
        }
    }

    let caller = form.get("From").map(String::as_str).unwrap_or_default();
    if !state.config.is_caller_allowed(caller) {
        warn!(%caller, "Unauthorized caller");
        return Err(ApiError::Forbidden);
    }

    let host =
        host.ok_or_else(|| ApiError::BadRequest("host header is required".to_string()))?;

    info!(call_sid = ?form.get("CallSid"), %caller, "Incoming call accepted");
    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        connect_stream_markup(&format!("wss://{}/media-stream", host)),
    )
        .into_response())
}

/// Builds the `<Connect><Stream>` response document.
pub fn connect_stream_markup(stream_url: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Response><Connect><Stream url="{}" /></Connect></Response>"#,
        escape_attribute(stream_url)
    )
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
