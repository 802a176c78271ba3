//! Lookup table from a configured provider name to a provider factory.

use crate::{AudioProvider, Error, Result};
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

/// Creates a fresh, unconnected provider.
pub type ProviderFactory = Arc<dyn Fn() -> Box<dyn AudioProvider> + Send + Sync>;

/// An immutable mapping from provider names to factories.
///
/// Built once at startup and shared read-only between sessions. Every lookup
/// produces a new instance, so sessions never share provider state.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    /// Creates a new provider instance for `name`.
    ///
    /// Lookup is exact-match. No socket is opened here; the returned provider
    /// still has to be connected.
    pub fn create(&self, name: &str) -> Result<Box<dyn AudioProvider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::Configuration {
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })?;
        debug!(provider = %name, "Resolved realtime provider");
        Ok(factory())
    }

    /// Registered names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[derive(Default)]
pub struct ProviderRegistryBuilder {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistryBuilder {
    /// Registers a factory under `name`, replacing any earlier registration.
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn AudioProvider> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry {
            factories: self.factories,
        }
    }
}
