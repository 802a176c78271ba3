//! The capability contract every speech backend implements.

use crate::{AudioEvent, ProviderConfig, Result};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A stream of events coming back from the backend.
///
/// It ends when the backend closes the connection. Items are `Err` for
/// transport or protocol failures; the consumer decides whether to keep going.
pub type AudioEventStream = Pin<Box<dyn Stream<Item = Result<AudioEvent>> + Send>>;

/// A generic client for a real-time speech backend.
///
/// One instance serves exactly one call. `connect` must complete before the
/// other methods are used; `send_audio` and `receive_audio_events` may then be
/// driven concurrently from two pumps.
#[async_trait]
pub trait AudioProvider: Send + Sync {
    /// Opens the backend connection and configures the session.
    ///
    /// Fails with [`crate::Error::Connection`] when the backend cannot be
    /// reached or refuses the handshake.
    async fn connect(&mut self, config: &ProviderConfig) -> Result<()>;

    /// Forwards one base64 encoded audio chunk. No acknowledgment is awaited.
    async fn send_audio(&self, payload: &str) -> Result<()>;

    /// Hands out the backend event stream.
    ///
    /// There is a single consumer per session: calls after the first one
    /// return an empty stream.
    fn receive_audio_events(&self) -> AudioEventStream;

    /// Closes the backend connection. Safe to call more than once.
    async fn disconnect(&self);
}
