//! OpenAI Realtime backend for the switchboard relay.
//!
//! Speaks G.711 µ-law end to end, so telephony payloads pass through untouched.

pub mod provider;
pub mod settings;
pub mod types;

pub use provider::{OPENAI_REALTIME_URL, OpenAIRealtimeProvider, parse_server_event};
pub use settings::{SessionSettings, VadPolicy};
