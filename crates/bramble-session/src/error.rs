//! Error types for session operations.

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No provider is registered under the requested name.
    #[error("Unknown session provider: {0}")]
    UnknownProvider(String),

    /// A provider was registered twice under the same name.
    #[error("Session provider registered twice: {0}")]
    DuplicateProvider(String),

    /// A provider was registered under an unusable name.
    #[error("Invalid session provider name: {0:?}")]
    InvalidProviderName(String),

    /// A session with this id is already live in the provider.
    #[error("Session already exists: {0}")]
    SessionExists(String),

    /// The OS random source could not produce a session id.
    #[error("Entropy source failed: {0}")]
    Entropy(String),
}

impl Error {
    /// Whether this error is a startup configuration problem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnknownProvider(_) | Error::DuplicateProvider(_) | Error::InvalidProviderName(_)
        )
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
