//! [`AudioProvider`] implementation for the OpenAI Realtime API.

use crate::{
    settings::SessionSettings,
    types::{ClientEvent, ConversationItem, ServerEvent},
};
use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use futures_util::{
    SinkExt,
    stream::{SplitSink, SplitStream},
};
use secrecy::ExposeSecret;
use std::sync::Mutex as StdMutex;
use switchboard_core::{AudioEvent, AudioEventStream, AudioProvider, Error, ProviderConfig, Result};
use tokio::{net::TcpStream, sync::Mutex};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{client::IntoClientRequest, protocol::Message as WsMessage},
};
use tracing::{debug, info, warn};

pub const OPENAI_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Relays generic audio events to and from an OpenAI Realtime session.
///
/// The socket is split on connect: the write half stays here for
/// `send_audio`, the read half is handed to whoever calls
/// `receive_audio_events` first.
pub struct OpenAIRealtimeProvider {
    base_url: String,
    writer: Mutex<Option<SplitSink<Socket, WsMessage>>>,
    reader: StdMutex<Option<SplitStream<Socket>>>,
}

impl OpenAIRealtimeProvider {
    pub fn new() -> Self {
        Self::with_url(OPENAI_REALTIME_URL)
    }

    /// Points the provider at a different endpoint, e.g. a proxy or a local test server.
    pub fn with_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            writer: Mutex::new(None),
            reader: StdMutex::new(None),
        }
    }

    async fn send_event(&self, event: &ClientEvent) -> Result<()> {
        let text = serde_json::to_string(event).map_err(|e| Error::Protocol(e.to_string()))?;
        let mut guard = self.writer.lock().await;
        let writer = guard
            .as_mut()
            .ok_or_else(|| Error::Connection("not connected".to_string()))?;
        writer
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    async fn configure_session(&self, settings: &SessionSettings) -> Result<()> {
        self.send_event(&settings.session_update()).await?;

        if let Some(prompt) = &settings.initial_prompt {
            // Lets the assistant greet the caller before any audio arrives.
            self.send_event(&ClientEvent::ConversationItemCreate {
                item: ConversationItem::user_text(prompt.clone()),
            })
            .await?;
            self.send_event(&ClientEvent::ResponseCreate).await?;
        }
        Ok(())
    }

    /// Configures a freshly opened socket, closing it again if that fails.
    async fn start_session(&self, settings: &SessionSettings) -> Result<()> {
        if let Err(e) = self.configure_session(settings).await {
            self.disconnect().await;
            return Err(Error::Connection(format!("Session setup failed: {e}")));
        }
        Ok(())
    }
}

impl Default for OpenAIRealtimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps one text frame from OpenAI onto a generic event.
///
/// `Ok(None)` means the frame is valid but irrelevant to the relay.
pub fn parse_server_event(text: &str) -> Result<Option<AudioEvent>> {
    let event = ServerEvent::parse(text).map_err(|e| Error::Protocol(e.to_string()))?;
    Ok(match event {
        ServerEvent::ResponseAudioDelta { delta: Some(delta) } if !delta.is_empty() => {
            Some(AudioEvent::Delta(delta))
        }
        ServerEvent::ResponseAudioDelta { .. } => None,
        ServerEvent::ResponseAudioDone => Some(AudioEvent::Done),
        ServerEvent::InputAudioBufferSpeechStarted => Some(AudioEvent::SpeechStarted),
        ServerEvent::InputAudioBufferSpeechStopped => Some(AudioEvent::SpeechStopped),
        ServerEvent::Error { error } => {
            let error = error.unwrap_or_default();
            warn!(
                code = ?error.code,
                message = %error.message,
                "OpenAI Realtime reported an error"
            );
            None
        }
        ServerEvent::Other => None,
    })
}

#[async_trait]
impl AudioProvider for OpenAIRealtimeProvider {
    async fn connect(&mut self, config: &ProviderConfig) -> Result<()> {
        let settings = SessionSettings::from_config(config);
        let api_key = settings
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Connection("OpenAI API key not found".to_string()))?;

        let url = format!("{}?model={}", self.base_url, settings.model);
        let mut request = url
            .into_client_request()
            .map_err(|e| Error::Connection(e.to_string()))?;
        let authorization = format!("Bearer {}", api_key.expose_secret())
            .parse()
            .map_err(|_| Error::Connection("API key is not a valid header value".to_string()))?;
        request.headers_mut().insert("Authorization", authorization);
        request
            .headers_mut()
            .insert("OpenAI-Beta", "realtime=v1".parse().map_err(|_| {
                Error::Connection("invalid OpenAI-Beta header".to_string())
            })?);

        let (ws_stream, _) = connect_async(request)
            .await
            .map_err(|e| Error::Connection(format!("Failed to connect to OpenAI Realtime: {e}")))?;
        let (writer, reader) = ws_stream.split();
        self.writer = Mutex::new(Some(writer));
        self.reader = StdMutex::new(Some(reader));

        self.start_session(&settings).await?;
        info!(model = %settings.model, vad = ?settings.vad, "Connected to OpenAI Realtime");
        Ok(())
    }

    async fn send_audio(&self, payload: &str) -> Result<()> {
        self.send_event(&ClientEvent::InputAudioBufferAppend {
            audio: payload.to_string(),
        })
        .await
    }

    fn receive_audio_events(&self) -> AudioEventStream {
        let reader = self.reader.lock().ok().and_then(|mut reader| reader.take());
        let Some(reader) = reader else {
            return Box::pin(stream::empty());
        };

        Box::pin(
            reader
                .take_while(|msg| future::ready(!matches!(msg, Ok(WsMessage::Close(_)))))
                .filter_map(|msg| {
                    future::ready(match msg {
                        Ok(WsMessage::Text(text)) => parse_server_event(&text).transpose(),
                        Ok(_) => None,
                        Err(e) => Some(Err(Error::Transport(e.to_string()))),
                    })
                }),
        )
    }

    async fn disconnect(&self) {
        let writer = self.writer.lock().await.take();
        if let Ok(mut reader) = self.reader.lock() {
            reader.take();
        }
        if let Some(mut writer) = writer {
            if let Err(e) = writer.close().await {
                debug!(error = %e, "Close handshake with OpenAI Realtime did not complete");
            }
            info!("Disconnected from OpenAI Realtime");
        }
    }
}
