/// Failures a relay session can run into.
///
/// `Connection` and `Configuration` happen while a session is being set up and
/// end it before any audio moves. `Transport` and `Protocol` happen mid-call and
/// only stop the pump that observed them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend was unreachable or rejected the handshake.
    #[error("Connection error: {0}")]
    Connection(String),
    /// A read or write on an open socket failed.
    #[error("Transport error: {0}")]
    Transport(String),
    /// A frame could not be parsed.
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// The requested provider is not registered.
    #[error("Unknown provider: {name}. Available: {}", .available.join(", "))]
    Configuration { name: String, available: Vec<String> },
}

pub type Result<T> = std::result::Result<T, Error>;
