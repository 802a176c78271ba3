//! Media Stream Relay
//!
//! This module contains the logic for bridging one telephony media stream to a
//! realtime speech backend. It is structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON envelopes exchanged with the telephony side.
//! - `relay`: Runs the inbound and outbound pumps for one call.
//! - `session`: Accepts the WebSocket and hands it to the relay.
//! - `provider`: Lists the realtime backends the service can use.

pub mod protocol;
pub mod provider;
pub mod relay;
pub mod session;

pub use session::media_stream_handler;
