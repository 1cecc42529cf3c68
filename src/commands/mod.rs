//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `query`: Read-only commands (status, connected)
//! - `set`: Commands that read or change a setting (source, audio, auto, arc)
//! - `watch`: Continuous polling
//! - `utility`: Utility commands (raw, commands, list, config)

pub mod query;
pub mod set;
pub mod utility;
pub mod watch;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use hd41_matrix::MatrixInterface;
use hd41_transport::{
    open_device, open_path, DiscoveredDevice, FlowControlTransport, PortKind, TransportError,
};
use tracing::info;

use crate::config::Config;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Open the matrix named by `config`
///
/// Uses the configured port, else the first USB serial adapter, else the
/// first port the system reports.
pub fn open_matrix(config: &Config) -> anyhow::Result<MatrixInterface> {
    let baud_rate = config.serial.baud_rate;
    let transport = match &config.serial.port {
        Some(port) => open_path(port, baud_rate).with_context(|| format!("failed to open {port}"))?,
        None => {
            let devices = hd41_matrix::list_ports()?;
            let Some(device) = preferred_device(&devices) else {
                bail!(TransportError::DeviceNotFound(
                    "no serial ports found; pass --port".into()
                ));
            };
            info!(
                "No port configured, using {} ({})",
                device.info.port_name, device.info.kind
            );
            open_device(device, baud_rate)
                .with_context(|| format!("failed to open {}", device.info.port_name))?
        }
    };
    let flow = FlowControlTransport::with_policy(transport, config.protocol.retry_policy());
    Ok(MatrixInterface::new(Arc::new(flow)))
}

fn preferred_device(devices: &[DiscoveredDevice]) -> Option<&DiscoveredDevice> {
    devices
        .iter()
        .find(|d| matches!(d.info.kind, PortKind::Usb { .. }))
        .or_else(|| devices.first())
}

/// Set up a Ctrl-C handler that sets the given flag to false when triggered.
/// Returns the Arc<AtomicBool> for use in the main loop.
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}

/// "on"/"off" for a known state, "?" otherwise
pub fn on_off(state: Option<bool>) -> &'static str {
    match state {
        Some(true) => "on",
        Some(false) => "off",
        None => "?",
    }
}
