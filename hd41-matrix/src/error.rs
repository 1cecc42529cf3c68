//! Matrix interface error types

use hd41_transport::{ParseError, TransportError};
use thiserror::Error;

/// Errors from matrix operations
#[derive(Error, Debug)]
pub enum MatrixError {
    /// The exchange itself failed (no valid reply after all attempts)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A checksum-valid reply carried a payload outside its legal range
    #[error("Unexpected response: {0}")]
    Decode(#[from] ParseError),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl MatrixError {
    /// Whether the unit answered but the answer made no sense
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, MatrixError::Decode(_))
    }

    /// Whether the unit never produced a valid reply
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, MatrixError::Transport(_))
    }
}
