//! Interprets the generic provider settings for an OpenAI Realtime session.

use crate::types::{ClientEvent, G711_ULAW, Modality, SessionConfig, TurnDetection};
use secrecy::SecretString;
use switchboard_core::{ProviderConfig, generic_types::settings};
use tracing::warn;

pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Turn detection policy requested through `vad_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadPolicy {
    Server,
    Semantic,
}

impl VadPolicy {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("semantic_vad") => VadPolicy::Semantic,
            Some("server_vad") => VadPolicy::Server,
            Some(other) => {
                warn!(vad_type = %other, "Unknown turn detection policy, using server_vad");
                VadPolicy::Server
            }
        }
    }
}

/// Everything `connect` needs, resolved from a [`ProviderConfig`].
#[derive(Debug)]
pub struct SessionSettings {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub voice: String,
    pub instructions: String,
    pub initial_prompt: Option<String>,
    pub temperature: f32,
    pub vad: VadPolicy,
    pub vad_eagerness: Option<String>,
    pub allow_interrupt: bool,
}

impl SessionSettings {
    pub fn from_config(config: &ProviderConfig) -> Self {
        let temperature = match config.setting(settings::TEMPERATURE) {
            Some(raw) => raw.trim().parse::<f32>().unwrap_or_else(|_| {
                warn!(temperature = %raw, "Invalid temperature, using default");
                DEFAULT_TEMPERATURE
            }),
            None => DEFAULT_TEMPERATURE,
        };

        let allow_interrupt = match config.setting(settings::ALLOW_INTERRUPT) {
            Some(raw) => parse_flag(raw).unwrap_or_else(|| {
                warn!(allow_interrupt = %raw, "Invalid allow_interrupt flag, using true");
                true
            }),
            None => true,
        };

        Self {
            api_key: config
                .setting(settings::API_KEY)
                .map(|key| SecretString::from(key.to_string())),
            model: config.model.clone(),
            voice: config.voice.clone(),
            instructions: config.instructions.clone(),
            initial_prompt: config.setting(settings::INITIAL_PROMPT).map(str::to_string),
            temperature,
            vad: VadPolicy::parse(config.setting(settings::VAD_TYPE)),
            vad_eagerness: config
                .setting(settings::VAD_EAGERNESS)
                .map(|e| e.trim().to_string()),
            allow_interrupt,
        }
    }

    pub fn turn_detection(&self) -> TurnDetection {
        match self.vad {
            VadPolicy::Server => TurnDetection::ServerVad {
                interrupt_response: self.allow_interrupt,
                create_response: true,
            },
            VadPolicy::Semantic => TurnDetection::SemanticVad {
                eagerness: self.vad_eagerness.clone(),
                interrupt_response: self.allow_interrupt,
                create_response: true,
            },
        }
    }

    /// The `session.update` message sent right after the socket opens.
    pub fn session_update(&self) -> ClientEvent {
        ClientEvent::SessionUpdate {
            session: SessionConfig {
                turn_detection: self.turn_detection(),
                input_audio_format: G711_ULAW.to_string(),
                output_audio_format: G711_ULAW.to_string(),
                voice: self.voice.clone(),
                instructions: self.instructions.clone(),
                modalities: vec![Modality::Text, Modality::Audio],
                temperature: self.temperature,
            },
        }
    }
}

pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
