//! Serial port discovery

use std::sync::Arc;

use serialport::SerialPortType;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::protocol::serial::DEFAULT_BAUD_RATE;
use crate::serial::SerialTransport;
use crate::types::{DiscoveredDevice, PortKind, TransportDeviceInfo, TransportType};
use crate::Transport;

fn port_kind(port_type: &SerialPortType) -> PortKind {
    match port_type {
        SerialPortType::UsbPort(usb) => PortKind::Usb {
            vid: usb.vid,
            pid: usb.pid,
            serial: usb.serial_number.clone(),
            product: usb.product.clone(),
        },
        SerialPortType::PciPort => PortKind::Native,
        SerialPortType::BluetoothPort => PortKind::Bluetooth,
        SerialPortType::Unknown => PortKind::Unknown,
    }
}

/// List serial ports present on this machine
pub fn list_devices() -> Result<Vec<DiscoveredDevice>, TransportError> {
    let ports = serialport::available_ports()?;
    debug!("Found {} serial ports", ports.len());

    Ok(ports
        .into_iter()
        .map(|p| DiscoveredDevice {
            info: TransportDeviceInfo {
                kind: port_kind(&p.port_type),
                port_name: p.port_name,
                baud_rate: DEFAULT_BAUD_RATE,
                transport_type: TransportType::Serial,
            },
        })
        .collect())
}

/// Open a discovered port at `baud_rate`
pub fn open_device(
    device: &DiscoveredDevice,
    baud_rate: u32,
) -> Result<Arc<dyn Transport>, TransportError> {
    info!("Opening {} ({})", device.info.port_name, device.info.kind);
    let transport =
        SerialTransport::open(&device.info.port_name, baud_rate, device.info.kind.clone())?;
    Ok(Arc::new(transport))
}

/// Open a port by path, filling in port details when the system knows them
pub fn open_path(path: &str, baud_rate: u32) -> Result<Arc<dyn Transport>, TransportError> {
    let kind = list_devices()
        .ok()
        .and_then(|devices| devices.into_iter().find(|d| d.info.port_name == path))
        .map(|d| d.info.kind)
        .unwrap_or(PortKind::Unknown);
    info!("Opening {} ({})", path, kind);
    let transport = SerialTransport::open(path, baud_rate, kind)?;
    Ok(Arc::new(transport))
}
