//! Continuous polling.
//!
//! Switch-like settings and connection sensors are polled on separate
//! intervals and only changes are logged. The first poll logs the initial
//! state.

use std::sync::atomic::Ordering;
use std::time::Duration;

use hd41_matrix::{MatrixStatus, SwitchBoard};
use tokio::time::Instant;
use tracing::{info, warn};

use super::{on_off, open_matrix, setup_interrupt_handler, CommandResult};
use crate::config::Config;

/// How often the loop checks for Ctrl-C and due polls
const TICK: Duration = Duration::from_millis(50);

pub async fn watch(config: &Config) -> CommandResult {
    let switch_groups = config.watch.groups.switches();
    let sensor_groups = config.watch.groups.sensors();
    if switch_groups.is_empty() && sensor_groups.is_empty() {
        warn!("All poll groups are disabled in the config, nothing to watch");
        return Ok(());
    }

    let hd41 = open_matrix(config)?;
    let running = setup_interrupt_handler();
    info!(
        "Watching {} (switches every {:?}, sensors every {:?}); Ctrl-C to stop",
        hd41.transport().device_info().port_name,
        config.watch.switch_interval(),
        config.watch.sensor_interval()
    );

    let mut board = SwitchBoard::new();
    let mut sensors = MatrixStatus::default();
    let mut next_switch = Instant::now();
    let mut next_sensor = Instant::now();

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();

        if !switch_groups.is_empty() && now >= next_switch {
            let status = hd41.poll(&switch_groups).await;
            for (switch, on) in board.apply_status(&status) {
                info!("{} -> {}", switch, on_off(Some(on)));
            }
            next_switch = now + config.watch.switch_interval();
        }

        if !sensor_groups.is_empty() && now >= next_sensor {
            let status = hd41.poll(&sensor_groups).await;
            for state in &status.connections {
                if state.connected.is_some() && sensors.connection(state.port) != state.connected {
                    let label = if state.connected == Some(true) {
                        "connected"
                    } else {
                        "disconnected"
                    };
                    info!("{} {}", state.port, label);
                }
            }
            sensors.merge(&status);
            next_sensor = now + config.watch.sensor_interval();
        }

        tokio::time::sleep(TICK).await;
    }

    info!("Stopped");
    hd41.transport().inner().close().await?;
    Ok(())
}
