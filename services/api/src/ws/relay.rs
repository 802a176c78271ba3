//! Moves audio between one telephony media stream and one realtime provider.
//!
//! A call runs two pumps side by side:
//!
//! - **inbound**: telephony frames → `send_audio`
//! - **outbound**: provider events → telephony envelopes
//!
//! Either pump may stop on its own (hang-up, backend close, error) without
//! touching the other. Once both have returned the provider is disconnected.

use super::protocol::{InboundEnvelope, OutboundEnvelope};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::{fmt::Display, sync::OnceLock, time::Duration};
use switchboard_core::{
    AudioEvent, AudioProvider, Error, ProviderConfig, ProviderRegistry, Result,
};
use tracing::{debug, error, info, warn};

/// State of a single call, shared by both pumps.
#[derive(Debug, Default)]
pub struct Session {
    stream_sid: OnceLock<String>,
}

impl Session {
    /// Records the stream identifier. Only the first call has any effect.
    pub fn set_stream_sid(&self, stream_sid: String) -> bool {
        self.stream_sid.set(stream_sid).is_ok()
    }

    pub fn stream_sid(&self) -> Option<&str> {
        self.stream_sid.get().map(String::as_str)
    }
}

/// Why a pump returned.
#[derive(Debug)]
pub enum PumpExit {
    /// The telephony side sent `stop`.
    Stopped,
    /// The input ran out: socket closed or backend finished.
    Exhausted,
    Failed(Error),
}

/// Runs one call from provider setup to cleanup.
///
/// `inbound` yields text frames from the telephony socket and `outbound`
/// accepts text frames for it. When `max_duration` elapses both pumps are
/// dropped; the provider is still disconnected. Errors are only returned for
/// setup, that is an unknown provider name or a failed `connect`; in that case
/// no pump runs.
pub async fn relay<I, O>(
    registry: &ProviderRegistry,
    provider_name: &str,
    config: &ProviderConfig,
    max_duration: Option<Duration>,
    inbound: I,
    outbound: O,
) -> Result<()>
where
    I: Stream<Item = Result<String>> + Unpin,
    O: Sink<String> + Unpin,
    O::Error: Display,
{
    let mut provider = registry.create(provider_name)?;
    provider.connect(config).await?;
    info!(provider = %provider_name, "Provider connected, relaying audio");

    let session = Session::default();
    let provider: &dyn AudioProvider = provider.as_ref();

    let pumps = async {
        tokio::join!(
            inbound_pump(provider, &session, inbound),
            outbound_pump(provider, &session, outbound),
        )
    };
    let exits = match max_duration {
        Some(limit) => {
            let exits = tokio::time::timeout(limit, pumps).await;
            if exits.is_err() {
                warn!(limit_secs = limit.as_secs(), "Maximum call duration reached, hanging up");
            }
            exits.ok()
        }
        None => Some(pumps.await),
    };
    if let Some((inbound_exit, outbound_exit)) = exits {
        log_exit("inbound", inbound_exit);
        log_exit("outbound", outbound_exit);
    }

    provider.disconnect().await;
    info!(stream_sid = ?session.stream_sid(), "Relay finished");
    Ok(())
}

fn log_exit(pump: &str, exit: PumpExit) {
    match exit {
        PumpExit::Stopped => info!(pump, "Stream stopped"),
        PumpExit::Exhausted => debug!(pump, "Pump input exhausted"),
        PumpExit::Failed(e) => error!(pump, error = %e, "Pump terminated with error"),
    }
}

/// Reads telephony frames and forwards caller audio to the provider.
pub async fn inbound_pump<I>(
    provider: &dyn AudioProvider,
    session: &Session,
    mut inbound: I,
) -> PumpExit
where
    I: Stream<Item = Result<String>> + Unpin,
{
    while let Some(frame) = inbound.next().await {
        let text = match frame {
            Ok(text) => text,
            Err(e) => return PumpExit::Failed(e),
        };
        let envelope = match InboundEnvelope::parse(&text) {
            Ok(envelope) => envelope,
            Err(e) => return PumpExit::Failed(Error::Protocol(e.to_string())),
        };

        match envelope {
            InboundEnvelope::Start { start } => {
                let stream_sid = start.stream_sid;
                if session.set_stream_sid(stream_sid.clone()) {
                    tracing::Span::current().record("stream_sid", stream_sid.as_str());
                    info!(%stream_sid, call_sid = ?start.call_sid, "Stream started");
                } else {
                    warn!(%stream_sid, "Ignoring repeated start frame");
                }
            }
            InboundEnvelope::Media { media } => {
                if let Err(e) = provider.send_audio(&media.payload).await {
                    return PumpExit::Failed(e);
                }
            }
            InboundEnvelope::Stop => return PumpExit::Stopped,
            InboundEnvelope::Other => {}
        }
    }
    PumpExit::Exhausted
}

/// Turns provider events into telephony envelopes.
///
/// Events that arrive before the stream identifier is known are dropped, not
/// buffered.
pub async fn outbound_pump<O>(
    provider: &dyn AudioProvider,
    session: &Session,
    mut outbound: O,
) -> PumpExit
where
    O: Sink<String> + Unpin,
    O::Error: Display,
{
    let mut events = provider.receive_audio_events();
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => return PumpExit::Failed(e),
        };

        let envelope = match event {
            AudioEvent::Delta(payload) => session
                .stream_sid()
                .map(|sid| OutboundEnvelope::media(sid, payload)),
            // Barge-in: flush whatever the caller has not heard yet.
            AudioEvent::SpeechStarted => session.stream_sid().map(OutboundEnvelope::clear),
            AudioEvent::Done | AudioEvent::SpeechStopped => continue,
        };
        let Some(envelope) = envelope else {
            debug!("Dropping provider event received before stream start");
            continue;
        };

        let text = match serde_json::to_string(&envelope) {
            Ok(text) => text,
            Err(e) => return PumpExit::Failed(Error::Protocol(e.to_string())),
        };
        if let Err(e) = outbound.send(text).await {
            return PumpExit::Failed(Error::Transport(e.to_string()));
        }
    }
    PumpExit::Exhausted
}
