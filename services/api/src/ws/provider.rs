//! Realtime providers this service knows how to reach.

use openai_realtime::OpenAIRealtimeProvider;
use switchboard_core::ProviderRegistry;

/// Builds the registry of every backend shipped with the service.
pub fn builtin_registry() -> ProviderRegistry {
    ProviderRegistry::builder()
        .register("openai", || Box::new(OpenAIRealtimeProvider::new()))
        .build()
}
