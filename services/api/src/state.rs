//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the resources every
//! call needs: the loaded configuration and the provider registry.

use crate::config::Config;
use std::sync::Arc;
use switchboard_core::ProviderRegistry;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: ProviderRegistry,
}

impl AppState {
    pub fn new(config: Config, registry: ProviderRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry,
        }
    }
}
