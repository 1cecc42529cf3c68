// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hd41ctl")]
#[command(author, version, about = "Vorke HD41 HDMI matrix control over RS232")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Serial port (overrides the config file), e.g. /dev/ttyUSB0
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Baud rate (overrides the config file)
    #[arg(short, long, global = true)]
    pub baud: Option<u32>,

    /// Config file path (default: ~/.config/hd41/hd41ctl.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Query Commands ===
    /// Show everything the unit reports
    #[command(visible_alias = "st")]
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Connection state of one port (all ports when omitted)
    #[command(visible_alias = "conn")]
    Connected {
        /// Port (output, 1-4)
        port: Option<String>,
    },

    // === Query/Set Commands ===
    /// Get or select the video input
    #[command(visible_aliases = ["src", "input"])]
    Source {
        /// Input number (1-4)
        #[arg(value_parser = clap::value_parser!(u8).range(1..5))]
        input: Option<u8>,
    },

    /// Get or select the audio profile (EDID)
    #[command(visible_alias = "edid")]
    Audio {
        /// Profile (auto, stereo, dolby, hd)
        profile: Option<String>,
    },

    /// Get or set automatic input switching
    Auto {
        state: Option<OnOff>,
    },

    /// Get or set the Audio Return Channel
    Arc {
        state: Option<OnOff>,
    },

    // === Monitoring ===
    /// Poll the unit and log changes until Ctrl-C
    #[command(visible_alias = "w")]
    Watch,

    // === Utility Commands ===
    /// Send one catalog command and dump the reply
    Raw {
        /// Command name (see `hd41ctl commands`)
        command: String,
    },

    /// List the command catalog
    Commands,

    /// List serial ports
    #[command(visible_alias = "ls")]
    List,

    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OnOff {
    On,
    Off,
}

impl From<OnOff> for bool {
    fn from(value: OnOff) -> bool {
        matches!(value, OnOff::On)
    }
}
