//! Switchboard API Library Crate
//!
//! This library contains the service around the relay: configuration, shared
//! state, the HTTP handlers for the telephony webhooks, and the media-stream
//! WebSocket that bridges each call to the speech backend. The `api` binary is
//! a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod router;
pub mod signature;
pub mod state;
pub mod ws;
