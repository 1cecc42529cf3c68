//! Synchronous helpers for port discovery.

use crate::error::MatrixError;
use hd41_transport::DiscoveredDevice;

/// List all serial ports the unit could be attached to
pub fn list_ports() -> Result<Vec<DiscoveredDevice>, MatrixError> {
    Ok(hd41_transport::list_devices()?)
}
