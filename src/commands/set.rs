//! Get-or-set command handlers.
//!
//! Without an argument each command prints the current value; with one it
//! changes the setting. The unit only acknowledges receipt; a successful
//! set does not prove the change took effect.

use anyhow::anyhow;
use hd41_matrix::{Edid, Feature};

use super::{on_off, open_matrix, CommandResult};
use crate::cli::OnOff;
use crate::config::Config;

/// Get or select the video input
pub async fn source(config: &Config, input: Option<u8>) -> CommandResult {
    let hd41 = open_matrix(config)?;
    match input {
        Some(number) => {
            hd41.set_source_number(number).await?;
            println!("Input set to {number}");
        }
        None => println!("Input: {}", hd41.get_source().await?),
    }
    Ok(())
}

/// Get or select the audio profile
pub async fn audio(config: &Config, profile: Option<&str>) -> CommandResult {
    let edid = profile
        .map(|p| p.parse::<Edid>().map_err(|e| anyhow!(e)))
        .transpose()?;

    let hd41 = open_matrix(config)?;
    match edid {
        Some(edid) => {
            hd41.set_edid(edid).await?;
            println!("Audio set to {edid}");
        }
        None => println!("Audio: {}", hd41.get_edid().await?),
    }
    Ok(())
}

/// Get or set an on/off feature
pub async fn feature(config: &Config, feature: Feature, state: Option<OnOff>) -> CommandResult {
    let label = match feature {
        Feature::AutoSwitch => "Auto-switch",
        Feature::Arc => "ARC",
    };

    let hd41 = open_matrix(config)?;
    match state {
        Some(state) => {
            let enabled = bool::from(state);
            hd41.set_feature(feature, enabled).await?;
            println!("{label} turned {}", on_off(Some(enabled)));
        }
        None => {
            let enabled = hd41.get_feature(feature).await?;
            println!("{label}: {}", on_off(Some(enabled)));
        }
    }
    Ok(())
}
