pub mod error;
pub mod generic_types;
pub mod realtime_api;
pub mod registry;

pub use error::{Error, Result};
pub use generic_types::{AudioEvent, ProviderConfig};
pub use realtime_api::{AudioEventStream, AudioProvider};
pub use registry::{ProviderFactory, ProviderRegistry, ProviderRegistryBuilder};
