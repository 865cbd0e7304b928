//! Error types

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building descriptors, creating engines or checking connectivity
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Descriptor could not be parsed
    #[error("invalid connection descriptor: {0}")]
    InvalidDescriptor(String),

    /// Any failure reported by the driver while connecting or executing
    #[error("connection failed: {0}")]
    Connection(String),

    /// No pooled connection became available in time
    #[error("timed out waiting for a pooled connection")]
    PoolTimeout,

    /// Query ran but did not return the expected shape
    #[error("unexpected query result: {0}")]
    UnexpectedResult(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from the connection path (driver or pool)
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::PoolTimeout)
    }
}

impl From<bb8::RunError<Error>> for Error {
    fn from(err: bb8::RunError<Error>) -> Self {
        match err {
            bb8::RunError::User(e) => e,
            bb8::RunError::TimedOut => Self::PoolTimeout,
        }
    }
}
