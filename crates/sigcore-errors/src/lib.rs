//! Error handling types for the sigcore signature pipeline.
//!
//! Every fallible entry point of expansion and verification returns [`Result`], so callers see a
//! single error vocabulary. A signature that simply fails to verify is *not* an error: it is
//! reported through the resolved verification result.

use thiserror::Error;

/// Core error type for sigcore operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The key tree contains a kind that expansion does not handle
    #[error("unsupported key kind:: {0}")]
    UnsupportedKeyKind(String),

    /// A pre-hashed message had the wrong length
    #[error("invalid message length:: expected {expected} bytes, got {actual}")]
    InvalidMessageLength { expected: usize, actual: usize },

    /// Key material could not be decoded
    #[error("invalid key:: {0}")]
    InvalidKey(String),

    /// The crypto engine refused a request
    #[error("crypto engine:: {0}")]
    Engine(#[from] EngineError),

    /// The verification future was cancelled before it resolved
    #[error("verification cancelled")]
    Cancelled,

    /// A bounded wait elapsed before the verification resolved
    #[error("verification timed out")]
    Timeout,

    /// Configuration could not be loaded or failed validation
    #[error("configuration:: {0}")]
    Config(String),
}

/// Errors raised by a crypto engine while accepting a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An offset or length points outside the request buffer
    #[error("invalid request segment {segment}: offset {offset}, length {length}, buffer {buffer_len}")]
    InvalidSegment {
        segment: &'static str,
        offset: usize,
        length: usize,
        buffer_len: usize,
    },

    /// The engine is no longer accepting work
    #[error("engine is shut down")]
    ShutDown,

    /// The engine could not be started
    #[error("engine startup failed: {0}")]
    Startup(String),
}

/// Result type alias for sigcore operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Numeric code for this error, stable across releases
    pub fn code(&self) -> u32 {
        match self {
            Error::UnsupportedKeyKind(_) => codes::UNSUPPORTED_KEY_KIND,
            Error::InvalidMessageLength { .. } => codes::INVALID_MESSAGE_LENGTH,
            Error::InvalidKey(_) => codes::INVALID_KEY,
            Error::Engine(_) => codes::ENGINE,
            Error::Cancelled => codes::CANCELLED,
            Error::Timeout => codes::TIMEOUT,
            Error::Config(_) => codes::CONFIG,
        }
    }
}

/// Error codes for sigcore errors
pub mod codes {
    /// Success
    pub const OK: u32 = 0;
    /// Unsupported key kind
    pub const UNSUPPORTED_KEY_KIND: u32 = 2;
    /// Invalid message length
    pub const INVALID_MESSAGE_LENGTH: u32 = 3;
    /// Invalid key material
    pub const INVALID_KEY: u32 = 4;
    /// Crypto engine failure
    pub const ENGINE: u32 = 5;
    /// Cancelled
    pub const CANCELLED: u32 = 6;
    /// Timed out
    pub const TIMEOUT: u32 = 7;
    /// Configuration
    pub const CONFIG: u32 = 8;
}
