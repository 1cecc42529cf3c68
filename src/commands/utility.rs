//! Utility command handlers.

use std::path::Path;

use anyhow::anyhow;
use hd41_transport::{Command, WireFrame};

use super::{open_matrix, CommandResult};
use crate::config::Config;

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Send one catalog command and print the reply
pub async fn raw(config: &Config, name: &str) -> CommandResult {
    let cmd: Command = name.parse().map_err(|e: String| anyhow!(e))?;

    let hd41 = open_matrix(config)?;
    println!("Sending {} [{}]...", cmd, hex(cmd.frame()));

    let resp = hd41.raw(cmd).await?;
    println!("Response: [{}]", hex(resp.as_bytes()));
    println!("  {}", resp.wire());
    if !resp.wire().has_sync() {
        println!("  (reply has no sync header)");
    }
    Ok(())
}

/// List the command catalog
pub fn commands() -> CommandResult {
    println!(
        "{:<3} {:<26} {:<6} {:<39} Description",
        "#", "Name", "Kind", "Frame"
    );
    for cmd in Command::ALL {
        let kind = if cmd.is_query() { "query" } else { "set" };
        println!(
            "{:<3} {:<26} {:<6} {:<39} {}",
            cmd.index(),
            cmd.name(),
            kind,
            hex(cmd.frame()),
            cmd.description()
        );
    }
    let wire = WireFrame::from_array(*Command::GetSource.frame());
    println!("\nFrame layout: {wire}");
    Ok(())
}

/// List serial ports
pub fn list() -> CommandResult {
    let devices = hd41_matrix::list_ports()?;
    if devices.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }
    println!("Serial ports:");
    for device in devices {
        println!("  {:<20} {}", device.info.port_name, device.info.kind);
    }
    Ok(())
}

/// Print the effective configuration, optionally saving it
pub fn config(config: &Config, path: &Path, save: bool) -> CommandResult {
    print!("{}", toml::to_string_pretty(config)?);
    if save {
        config.save(path)?;
        println!("\nSaved to {}", path.display());
    }
    Ok(())
}
