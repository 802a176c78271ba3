//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application: the
//! health check, the incoming-call webhook and the media-stream WebSocket.

use crate::{handlers, state::AppState, ws::media_stream_handler};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/incoming-call", post(handlers::incoming_call))
        .route("/media-stream", get(media_stream_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        signature::{self, SIGNATURE_HEADER},
        ws::provider::builtin_registry,
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use std::{collections::BTreeMap, net::SocketAddr, time::Duration};
    use tower::ServiceExt;
    use tracing::Level;

    fn test_config(allowed_callers: &[&str]) -> Config {
        Config {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 5050)),
            log_level: Level::INFO,
            provider: "openai".to_string(),
            openai_api_key: Some("sk-test".to_string()),
            system_prompt: "You are a helpful voice assistant.".to_string(),
            voice: "alloy".to_string(),
            model: "gpt-4o-realtime-preview".to_string(),
            initial_prompt: String::new(),
            temperature: 0.8,
            max_call_duration: Some(Duration::from_secs(300)),
            vad_type: "semantic_vad".to_string(),
            vad_eagerness: String::new(),
            allow_interrupt: true,
            allowed_callers: allowed_callers.iter().map(|c| c.to_string()).collect(),
            twilio_auth_token: None,
        }
    }

    fn app(allowed_callers: &[&str]) -> Router {
        create_router(Arc::new(AppState::new(
            test_config(allowed_callers),
            builtin_registry(),
        )))
    }

    fn signed_app(auth_token: &str) -> Router {
        let mut config = test_config(&[]);
        config.twilio_auth_token = Some(auth_token.to_string());
        create_router(Arc::new(AppState::new(config, builtin_registry())))
    }

    /// The form fields `incoming_call` sends, as the webhook signer sees them.
    fn signed_params(from: &str) -> BTreeMap<String, String> {
        [("CallSid", "CA123"), ("From", from), ("To", "+15550000000")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn incoming_call(from: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/incoming-call")
            .header(header::HOST, "relay.example.com")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "CallSid=CA123&From={}&To=%2B15550000000",
                from.replace('+', "%2B")
            )))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(&[])
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_incoming_call_connects_media_stream() {
        let response = app(&[]).oneshot(incoming_call("+15550001111")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/xml"
        );
        assert!(
            body_text(response)
                .await
                .contains(r#"<Stream url="wss://relay.example.com/media-stream" />"#)
        );
    }

    #[tokio::test]
    async fn test_incoming_call_prefers_forwarded_host() {
        let mut request = incoming_call("+15550001111");
        request
            .headers_mut()
            .insert("x-forwarded-host", "public.example.com".parse().unwrap());

        let response = app(&[]).oneshot(request).await.unwrap();

        assert!(
            body_text(response)
                .await
                .contains("wss://public.example.com/media-stream")
        );
    }

    #[tokio::test]
    async fn test_incoming_call_rejects_unlisted_caller() {
        let response = app(&["+15550001111"])
            .oneshot(incoming_call("+15550009999"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, r#"{"error":"Forbidden"}"#);
    }

    #[tokio::test]
    async fn test_incoming_call_accepts_listed_caller() {
        let response = app(&["+15550001111"])
            .oneshot(incoming_call("+15550001111"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_media_stream_requires_websocket_upgrade() {
        let response = app(&[])
            .oneshot(
                Request::builder()
                    .uri("/media-stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_incoming_call_accepts_valid_signature() {
        let signature = signature::sign(
            "twilio-token",
            "https://relay.example.com/incoming-call",
            &signed_params("+15550001111"),
        )
        .unwrap();
        let mut request = incoming_call("+15550001111");
        request
            .headers_mut()
            .insert(SIGNATURE_HEADER, signature.parse().unwrap());

        let response = signed_app("twilio-token").oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_signature_uses_forwarded_proto_and_host() {
        let signature = signature::sign(
            "twilio-token",
            "http://public.example.com/incoming-call",
            &signed_params("+15550001111"),
        )
        .unwrap();
        let mut request = incoming_call("+15550001111");
        let headers = request.headers_mut();
        headers.insert("x-forwarded-proto", "http".parse().unwrap());
        headers.insert("x-forwarded-host", "public.example.com".parse().unwrap());
        headers.insert(SIGNATURE_HEADER, signature.parse().unwrap());

        let response = signed_app("twilio-token").oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_incoming_call_rejects_invalid_signature() {
        // Signed for a different caller than the one in the body.
        let signature = signature::sign(
            "twilio-token",
            "https://relay.example.com/incoming-call",
            &signed_params("+15550002222"),
        )
        .unwrap();
        let mut request = incoming_call("+15550001111");
        request
            .headers_mut()
            .insert(SIGNATURE_HEADER, signature.parse().unwrap());

        let response = signed_app("twilio-token").oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, r#"{"error":"Forbidden"}"#);
    }

    #[tokio::test]
    async fn test_incoming_call_rejects_missing_signature() {
        let response = signed_app("twilio-token")
            .oneshot(incoming_call("+15550001111"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
