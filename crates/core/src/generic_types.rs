use std::collections::HashMap;

/// Keys understood in [`ProviderConfig::extra`].
pub mod settings {
    /// Backend credential.
    pub const API_KEY: &str = "api_key";
    /// Text the assistant responds to before the caller says anything.
    pub const INITIAL_PROMPT: &str = "initial_prompt";
    /// Response randomness.
    pub const TEMPERATURE: &str = "temperature";
    /// Turn detection policy name, e.g. `server_vad` or `semantic_vad`.
    pub const VAD_TYPE: &str = "vad_type";
    /// Turn detection eagerness, only meaningful for the semantic policy.
    pub const VAD_EAGERNESS: &str = "vad_eagerness";
    /// Whether caller speech may interrupt the assistant.
    pub const ALLOW_INTERRUPT: &str = "allow_interrupt";
}

/// Generic configuration for initializing a real-time session with any provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    pub instructions: String,
    pub voice: String,
    pub model: String,
    /// Backend-tuning settings, see [`settings`] for the known keys.
    pub extra: HashMap<String, String>,
}

impl ProviderConfig {
    pub fn new(
        instructions: impl Into<String>,
        voice: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            voice: voice.into(),
            model: model.into(),
            extra: HashMap::new(),
        }
    }

    /// Adds one backend-tuning setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns a setting, treating an empty value the same as a missing one.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Generic events that any real-time provider can emit back to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// A chunk of spoken audio from the assistant, still base64 encoded.
    Delta(String),
    /// The assistant finished the current audio response.
    Done,
    /// Voice activity detection heard the caller start speaking.
    SpeechStarted,
    /// Voice activity detection heard the caller stop speaking.
    SpeechStopped,
}
