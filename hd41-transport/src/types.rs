//! Common types for transport layer

use std::fmt;

/// Transport type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    /// RS232 via a local serial port or USB adapter
    Serial,
    /// In-memory scripted link (tests)
    Scripted,
}

/// What kind of serial port the unit hangs off
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    /// USB-to-serial adapter
    Usb {
        vid: u16,
        pid: u16,
        serial: Option<String>,
        product: Option<String>,
    },
    /// On-board UART or PCI card
    Native,
    /// Bluetooth SPP
    Bluetooth,
    Unknown,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::Usb {
                vid, pid, product, ..
            } => {
                write!(f, "USB {vid:04X}:{pid:04X}")?;
                if let Some(product) = product {
                    write!(f, " ({product})")?;
                }
                Ok(())
            }
            PortKind::Native => f.write_str("native"),
            PortKind::Bluetooth => f.write_str("bluetooth"),
            PortKind::Unknown => f.write_str("unknown"),
        }
    }
}

/// Device identification information
#[derive(Debug, Clone)]
pub struct TransportDeviceInfo {
    /// Port path (e.g. `/dev/ttyUSB0`)
    pub port_name: String,
    /// Line speed
    pub baud_rate: u32,
    /// Port hardware
    pub kind: PortKind,
    /// Transport type
    pub transport_type: TransportType,
}

/// Serial port that can be opened
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Device information (baud rate is the default until opened)
    pub info: TransportDeviceInfo,
}
