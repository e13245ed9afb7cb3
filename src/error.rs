use thiserror::Error;

/// Failures raised by storage adapters.
///
/// These never cross the public `Cache` surface directly: the facade maps
/// them to `false`/`None` returns and logs them, per the recoverable error
/// contract.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("storage backend i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage mutex poisoned")]
    Poisoned,

    #[error("entry encoding failed: {0}")]
    Encode(String),
}

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Failures raised by value serializers. Decode failures are treated as
/// cache misses by the facade, never as fatal errors.
#[derive(Debug, Error)]
pub enum SerializerError {
    #[error("value serialization failed: {0}")]
    Encode(String),

    #[error("value deserialization failed: {0}")]
    Decode(String),
}
