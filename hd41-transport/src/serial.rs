//! RS232 transport over a local serial port

use std::io::{Read, Write};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::debug;

use crate::error::TransportError;
use crate::types::{PortKind, TransportDeviceInfo, TransportType};
use crate::Transport;

/// Blocking timeout for the underlying port; reads never ask for more
/// than is already buffered, so this only bounds writes.
const PORT_TIMEOUT_MS: u64 = 100;

/// Serial transport for a unit wired to a local port
///
/// The line is configured 8N1 without flow control. Reads are bounded by
/// `bytes_to_read`, so `read` never blocks waiting for the unit.
pub struct SerialTransport {
    port: Mutex<Box<dyn SerialPort>>,
    info: TransportDeviceInfo,
}

impl SerialTransport {
    /// Open `path` at `baud_rate`
    pub fn open(path: &str, baud_rate: u32, kind: PortKind) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(PORT_TIMEOUT_MS))
            .open()?;
        debug!("Opened serial port {} at {} baud", path, baud_rate);

        Ok(Self::from_port(
            port,
            TransportDeviceInfo {
                port_name: path.to_string(),
                baud_rate,
                kind,
                transport_type: TransportType::Serial,
            },
        ))
    }

    /// Wrap an already opened port
    pub fn from_port(port: Box<dyn SerialPort>, info: TransportDeviceInfo) -> Self {
        Self {
            port: Mutex::new(port),
            info,
        }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut port = self.port.lock();
        port.write_all(data)?;
        port.flush()?;
        Ok(())
    }

    async fn available(&self) -> Result<usize, TransportError> {
        let port = self.port.lock();
        Ok(port.bytes_to_read()? as usize)
    }

    async fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut port = self.port.lock();
        let count = (port.bytes_to_read()? as usize).min(buf.len());
        if count == 0 {
            return Ok(0);
        }
        port.read_exact(&mut buf[..count])?;
        Ok(count)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    async fn close(&self) -> Result<(), TransportError> {
        let port = self.port.lock();
        port.clear(serialport::ClearBuffer::All)?;
        Ok(())
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        debug!("SerialTransport for {} dropped", self.info.port_name);
    }
}
