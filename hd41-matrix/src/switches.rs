//! Logical switch board mirroring the unit's settings
//!
//! A host (home automation, a tray applet, the `watch` command) exposes
//! ten on/off switches. User toggles become device `Action`s; polled state
//! is mirrored back with `apply_status`, which never produces actions so a
//! refresh cannot echo a command to the unit.

use std::fmt;

use crate::group::ExclusiveGroup;
use crate::status::MatrixStatus;
use hd41_transport::{Edid, Feature, Source};

/// One logical switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Switch {
    Arc,
    AutoSwitch,
    Input(Source),
    Audio(Edid),
}

impl Switch {
    pub const ALL: [Switch; 10] = [
        Switch::Arc,
        Switch::AutoSwitch,
        Switch::Input(Source::Input1),
        Switch::Input(Source::Input2),
        Switch::Input(Source::Input3),
        Switch::Input(Source::Input4),
        Switch::Audio(Edid::Auto),
        Switch::Audio(Edid::Stereo),
        Switch::Audio(Edid::DolbyDts),
        Switch::Audio(Edid::HdAudio),
    ];
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Switch::Arc => f.write_str("arc"),
            Switch::AutoSwitch => f.write_str("auto-switch"),
            Switch::Input(source) => write!(f, "input-{}", source.number()),
            Switch::Audio(edid) => write!(f, "audio-{}", edid.name()),
        }
    }
}

/// Device operation requested by a switch toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetSource(Source),
    SetEdid(Edid),
    SetFeature(Feature, bool),
}

/// State of all logical switches
#[derive(Debug, Clone)]
pub struct SwitchBoard {
    arc: bool,
    auto_switch: bool,
    inputs: ExclusiveGroup<Source>,
    audio: ExclusiveGroup<Edid>,
}

impl Default for SwitchBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchBoard {
    /// Every switch off
    pub fn new() -> Self {
        Self {
            arc: false,
            auto_switch: false,
            inputs: ExclusiveGroup::new(Source::ALL),
            audio: ExclusiveGroup::new(Edid::ALL),
        }
    }

    pub fn is_on(&self, switch: Switch) -> bool {
        match switch {
            Switch::Arc => self.arc,
            Switch::AutoSwitch => self.auto_switch,
            Switch::Input(source) => self.inputs.is_on(source),
            Switch::Audio(edid) => self.audio.is_on(edid),
        }
    }

    /// Every switch with its state
    pub fn states(&self) -> Vec<(Switch, bool)> {
        Switch::ALL.iter().map(|&s| (s, self.is_on(s))).collect()
    }

    /// A user turned `switch` on or off
    ///
    /// Returns the action to send to the unit. Turning an input or audio
    /// switch off only clears it locally; the unit always has one selected.
    pub fn toggle(&mut self, switch: Switch, on: bool) -> Option<Action> {
        match switch {
            Switch::Arc => {
                self.arc = on;
                Some(Action::SetFeature(Feature::Arc, on))
            }
            Switch::AutoSwitch => {
                self.auto_switch = on;
                Some(Action::SetFeature(Feature::AutoSwitch, on))
            }
            Switch::Input(source) if on => {
                self.inputs.select(source);
                Some(Action::SetSource(source))
            }
            Switch::Audio(edid) if on => {
                self.audio.select(edid);
                Some(Action::SetEdid(edid))
            }
            Switch::Input(source) => {
                self.inputs.deselect(source);
                None
            }
            Switch::Audio(edid) => {
                self.audio.deselect(edid);
                None
            }
        }
    }

    /// Mirror polled state into the switches
    ///
    /// Fields the poll did not produce leave their switches alone. Returns
    /// the switches whose state changed.
    pub fn apply_status(&mut self, status: &MatrixStatus) -> Vec<(Switch, bool)> {
        let mut changed = Vec::new();

        if let Some(arc) = status.arc {
            if self.arc != arc {
                self.arc = arc;
                changed.push((Switch::Arc, arc));
            }
        }
        if let Some(auto) = status.auto_switch {
            if self.auto_switch != auto {
                self.auto_switch = auto;
                changed.push((Switch::AutoSwitch, auto));
            }
        }
        if let Some(changes) = status.source.and_then(|s| self.inputs.select(s)) {
            changed.extend(changes.into_iter().map(|(s, on)| (Switch::Input(s), on)));
        }
        if let Some(changes) = status.edid.and_then(|e| self.audio.select(e)) {
            changed.extend(changes.into_iter().map(|(e, on)| (Switch::Audio(e), on)));
        }

        changed
    }
}
