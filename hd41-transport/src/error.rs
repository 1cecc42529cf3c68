//! Transport error types

use thiserror::Error;

use crate::protocol::Command;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    /// All attempts of a command exchange failed (timeout, short reply or
    /// checksum mismatch on every try)
    #[error("No valid response to {command} after {attempts} attempts")]
    NoResponse { command: Command, attempts: usize },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serial port error: {0}")]
    Serial(String),

    #[error("Serial port permission denied: {0}")]
    PermissionDenied(String),
}

impl From<serialport::Error> for TransportError {
    fn from(e: serialport::Error) -> Self {
        match e.kind() {
            serialport::ErrorKind::NoDevice => TransportError::DeviceNotFound(e.description),
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                TransportError::PermissionDenied(e.description)
            }
            _ => TransportError::Serial(e.description),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => {
                TransportError::Disconnected
            }
            _ => TransportError::Io(e.to_string()),
        }
    }
}
