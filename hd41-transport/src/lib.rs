//! Transport layer for the Vorke HD41 HDMI matrix
//!
//! The HD41 speaks a fixed-length binary protocol over RS232: every command
//! is a pre-baked 13-byte frame and every reply is a 13-byte buffer whose
//! bytes sum to zero. This crate provides:
//!
//! - the frame catalog and wire layout (`protocol`)
//! - typed values and response decoders (`command`)
//! - a byte-level `Transport` trait with a serial-port backend
//! - `FlowControlTransport`, the command engine that adds response
//!   collection, checksum validation, draining and retries
//!
//! ```text
//! [SerialTransport / ScriptedTransport]  ← implements Transport (raw bytes)
//!                |
//!       [FlowControlTransport]           ← send, wait, validate, drain, retry
//!                |
//!         [MatrixInterface]
//! ```

pub mod command;
pub mod error;
pub mod flow_control;
pub mod protocol;
pub mod types;

mod discovery;
mod serial;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use command::{
    decode_connection, decode_edid, decode_source, decode_toggle, Edid, Feature, ParseError,
    Port, Source,
};
pub use discovery::{list_devices, open_device, open_path};
pub use error::TransportError;
pub use flow_control::{AttemptFailure, FlowControlTransport, RetryPolicy};
pub use protocol::{Command, Frame, Response, WireFrame, FRAME_LEN};
pub use serial::SerialTransport;
pub use types::{DiscoveredDevice, PortKind, TransportDeviceInfo, TransportType};

use async_trait::async_trait;

/// Byte-oriented half-duplex link to the unit
///
/// Implementations only move bytes. Framing, timeouts and retries live in
/// `FlowControlTransport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write all of `data` to the link
    async fn write(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Number of received bytes waiting to be read
    async fn available(&self) -> Result<usize, TransportError>;

    /// Read up to `buf.len()` bytes, never waiting for more than is available
    ///
    /// # Returns
    /// Number of bytes copied into `buf`
    async fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Close the transport gracefully
    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
