//! Defines the Media Streams envelopes exchanged with the telephony provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from the telephony side to the relay.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum InboundEnvelope {
    /// The stream is open. Always arrives before the first media frame in practice.
    Start { start: StartMetadata },
    /// One chunk of caller audio.
    Media { media: MediaPayload },
    /// The call has ended.
    Stop,
    /// `connected`, `mark`, `dtmf` and anything newer. Ignored.
    #[serde(other)]
    Other,
}

impl InboundEnvelope {
    /// Parses one text frame. Only text that is not JSON at all is an error;
    /// frames without a string `event` are treated as [`InboundEnvelope::Other`].
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.get("event").is_some_and(Value::is_string) {
            return Ok(Self::Other);
        }
        serde_json::from_value(value)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StartMetadata {
    pub stream_sid: String,
    #[serde(default)]
    pub call_sid: Option<String>,
}

/// Base64 encoded audio. Never decoded by the relay.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub payload: String,
}

/// Messages sent from the relay to the telephony side.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum OutboundEnvelope {
    /// Assistant audio to play to the caller.
    Media {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        media: MediaPayload,
    },
    /// Drops any audio still buffered for playback.
    Clear {
        #[serde(rename = "streamSid")]
        stream_sid: String,
    },
}

impl OutboundEnvelope {
    pub fn media(stream_sid: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Media {
            stream_sid: stream_sid.into(),
            media: MediaPayload {
                payload: payload.into(),
            },
        }
    }

    pub fn clear(stream_sid: impl Into<String>) -> Self {
        Self::Clear {
            stream_sid: stream_sid.into(),
        }
    }
}
