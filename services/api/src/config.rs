use std::net::SocketAddr;
use std::time::Duration;
use switchboard_core::{ProviderConfig, generic_types::settings};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Name of the realtime provider, looked up in the provider registry.
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub system_prompt: String,
    pub voice: String,
    pub model: String,
    /// Text the assistant responds to as soon as the call connects. Empty disables it.
    pub initial_prompt: String,
    pub temperature: f32,
    /// Upper bound on one call. `None` means calls run until either side hangs up.
    pub max_call_duration: Option<Duration>,
    pub vad_type: String,
    pub vad_eagerness: String,
    pub allow_interrupt: bool,
    /// Caller numbers accepted by the incoming-call webhook. Empty accepts everyone.
    pub allowed_callers: Vec<String>,
    /// Shared secret used to verify webhook signatures. `None` skips the check.
    pub twilio_auth_token: Option<String>,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

fn parse_bool_var(name: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("'{}' is not a boolean", raw),
        )),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let port: u16 = parse_var("PORT", 5050)?;
        let bind_address_str = var_or("BIND_ADDRESS", &format!("0.0.0.0:{}", port));
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "LOG_LEVEL".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let provider = var_or("PROVIDER", "openai").trim().to_string();
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        if provider == "openai" && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar(
                "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
            ));
        }

        let twilio_auth_token = std::env::var("TWILIO_AUTH_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let max_call_secs: u64 = parse_var("MAX_CALL_DURATION", 300)?;
        let max_call_duration = (max_call_secs > 0).then(|| Duration::from_secs(max_call_secs));

        let allowed_callers = var_or("ALLOWED_CALLERS", "")
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            bind_address,
            log_level,
            provider,
            openai_api_key,
            system_prompt: var_or("SYSTEM_PROMPT", "You are a helpful voice assistant."),
            voice: var_or("VOICE", "alloy"),
            model: var_or("MODEL", "gpt-4o-realtime-preview"),
            initial_prompt: var_or("INITIAL_PROMPT", "Greet with a very quick and short Hello."),
            temperature: parse_var("TEMPERATURE", 0.8)?,
            max_call_duration,
            vad_type: var_or("VAD_TYPE", "semantic_vad"),
            vad_eagerness: var_or("VAD_EAGERNESS", ""),
            allow_interrupt: parse_bool_var("ALLOW_INTERRUPT", true)?,
            allowed_callers,
            twilio_auth_token,
        })
    }

    /// Builds the per-session provider configuration.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(&self.system_prompt, &self.voice, &self.model)
            .with_setting(
                settings::API_KEY,
                self.openai_api_key.clone().unwrap_or_default(),
            )
            .with_setting(settings::INITIAL_PROMPT, &self.initial_prompt)
            .with_setting(settings::TEMPERATURE, self.temperature.to_string())
            .with_setting(settings::VAD_TYPE, &self.vad_type)
            .with_setting(settings::VAD_EAGERNESS, &self.vad_eagerness)
            .with_setting(settings::ALLOW_INTERRUPT, self.allow_interrupt.to_string())
    }

    /// Whether the incoming-call webhook should accept a call from `caller`.
    pub fn is_caller_allowed(&self, caller: &str) -> bool {
        self.allowed_callers.is_empty() || self.allowed_callers.iter().any(|c| c == caller)
    }
}
