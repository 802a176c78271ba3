//! Wire messages of the OpenAI Realtime WebSocket protocol.
//!
//! Only the subset the relay needs is modelled. Server events we do not care
//! about deserialize into [`ServerEvent::Other`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// G.711 µ-law, the codec telephony media streams carry.
pub const G711_ULAW: &str = "g711_ulaw";

/// Messages sent from the relay to OpenAI.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend { audio: String },
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },
    #[serde(rename = "response.create")]
    ResponseCreate,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub turn_detection: TurnDetection,
    pub input_audio_format: String,
    pub output_audio_format: String,
    pub voice: String,
    pub instructions: String,
    pub modalities: Vec<Modality>,
    pub temperature: f32,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
}

/// How the backend decides the caller's turn has ended.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnDetection {
    /// Fixed silence threshold.
    ServerVad {
        interrupt_response: bool,
        create_response: bool,
    },
    /// End of turn judged from what the caller said.
    SemanticVad {
        #[serde(skip_serializing_if = "Option::is_none")]
        eagerness: Option<String>,
        interrupt_response: bool,
        create_response: bool,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ConversationItem {
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub role: ItemRole,
    pub content: Vec<ItemContent>,
}

impl ConversationItem {
    /// A user message consisting of a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            kind: ItemType::Message,
            role: ItemRole::User,
            content: vec![ItemContent {
                kind: ItemContentType::InputText,
                text: text.into(),
            }],
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Message,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemRole {
    User,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ItemContent {
    #[serde(rename = "type")]
    pub kind: ItemContentType,
    pub text: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemContentType {
    InputText,
}

/// Messages received from OpenAI.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "response.audio.delta")]
    ResponseAudioDelta {
        #[serde(default)]
        delta: Option<String>,
    },
    #[serde(rename = "response.audio.done")]
    ResponseAudioDone,
    #[serde(rename = "input_audio_buffer.speech_started")]
    InputAudioBufferSpeechStarted,
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    InputAudioBufferSpeechStopped,
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        error: Option<ErrorDetails>,
    },
    #[serde(other)]
    Other,
}

impl ServerEvent {
    /// Parses one text frame. Only text that is not JSON at all is an error;
    /// frames without a string `type` are treated as [`ServerEvent::Other`].
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.get("type").is_some_and(Value::is_string) {
            return Ok(Self::Other);
        }
        serde_json::from_value(value)
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ErrorDetails {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}
