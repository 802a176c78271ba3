//! Manages the media-stream WebSocket connection lifecycle for one call.

use super::relay::relay;
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, future};
use std::sync::Arc;
use switchboard_core::Error;
use tracing::{error, info, instrument};

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual media stream.
///
/// Adapts the socket halves to plain text frames, then runs the relay,
/// bounded by the configured maximum call duration.
#[instrument(name = "media_stream", skip_all, fields(connection_id, stream_sid))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id: u32 = rand::random();
    tracing::Span::current().record("connection_id", connection_id);
    info!("Media stream connected");

    let (socket_tx, socket_rx) = socket.split();
    let inbound = socket_rx
        .take_while(|msg| future::ready(!matches!(msg, Ok(Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(_) => None,
                Err(e) => Some(Err(Error::Transport(e.to_string()))),
            })
        });
    let outbound = socket_tx
        .with(|text: String| future::ready(Ok::<_, axum::Error>(Message::Text(text.into()))));

    let provider_config = state.config.provider_config();
    let result = relay(
        &state.registry,
        &state.config.provider,
        &provider_config,
        state.config.max_call_duration,
        Box::pin(inbound),
        Box::pin(outbound),
    )
    .await;

    if let Err(e) = result {
        error!(error = %e, "Bridge error");
    }
    info!("Media stream closed");
}
