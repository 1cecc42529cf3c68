//! Query (read-only) command handlers.

use anyhow::anyhow;
use hd41_matrix::{MatrixStatus, PollGroups, Port};

use super::{on_off, open_matrix, CommandResult};
use crate::config::Config;

/// Print a status snapshot in human-readable form
pub fn print_status(status: &MatrixStatus) {
    let unknown = || "?".to_string();
    println!(
        "Input:       {}",
        status.source.map(|s| s.to_string()).unwrap_or_else(unknown)
    );
    println!(
        "Audio:       {}",
        status.edid.map(|e| e.to_string()).unwrap_or_else(unknown)
    );
    println!("Auto-switch: {}", on_off(status.auto_switch));
    println!("ARC:         {}", on_off(status.arc));
    if !status.connections.is_empty() {
        println!("Connections:");
        for state in &status.connections {
            println!("  {:<9} {}", state.port.to_string(), connected_label(state.connected));
        }
    }
}

fn connected_label(state: Option<bool>) -> &'static str {
    match state {
        Some(true) => "connected",
        Some(false) => "disconnected",
        None => "?",
    }
}

/// Query every group once
pub async fn status(config: &Config, json: bool) -> CommandResult {
    let hd41 = open_matrix(config)?;
    let status = hd41.poll(&PollGroups::all()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let info = hd41.transport().device_info();
        println!("Device: {} @ {} baud ({})", info.port_name, info.baud_rate, info.kind);
        print_status(&status);
    }
    Ok(())
}

/// Connection state of one port, or all of them
pub async fn connected(config: &Config, port: Option<&str>) -> CommandResult {
    let ports = match port {
        Some(name) => vec![name.parse::<Port>().map_err(|e| anyhow!(e))?],
        None => Port::ALL.to_vec(),
    };

    let hd41 = open_matrix(config)?;
    for port in ports {
        match hd41.is_port_connected(port).await {
            Ok(state) => println!("{:<9} {}", port.to_string(), connected_label(Some(state))),
            Err(e) => eprintln!("Failed to query {port}: {e}"),
        }
    }
    Ok(())
}
