//! Typed command selection and response decoding
//!
//! Maps the unit's logical values (inputs, audio profiles, ports, toggled
//! features) onto catalog commands, and decodes checksum-validated
//! responses back into those values. A response byte outside its legal
//! domain is a protocol violation and yields `ParseError`, never a
//! fallback value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::protocol::{offset, value, Command, Response};

/// Decode error for checksum-valid responses with an illegal payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidValue {
        field: &'static str,
        offset: usize,
        value: u8,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue {
                field,
                offset,
                value,
            } => write!(
                f,
                "Invalid value for {} at byte {}: 0x{:02X}",
                field, offset, value
            ),
        }
    }
}

impl std::error::Error for ParseError {}

// =============================================================================
// Video source
// =============================================================================

/// Active video input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Input1,
    Input2,
    Input3,
    Input4,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Input1,
        Source::Input2,
        Source::Input3,
        Source::Input4,
    ];

    /// Zero-based index (Input1 = 0)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Front-panel number (Input1 = 1)
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Look up by front-panel number (1-4)
    pub fn from_number(number: u8) -> Option<Self> {
        number.checked_sub(1).and_then(|i| Self::from_index(i as usize))
    }

    /// Command selecting this input
    pub fn select_command(self) -> Command {
        match self {
            Source::Input1 => Command::SetSourceInput1,
            Source::Input2 => Command::SetSourceInput2,
            Source::Input3 => Command::SetSourceInput3,
            Source::Input4 => Command::SetSourceInput4,
        }
    }

    /// The physical port carrying this input
    pub fn port(self) -> Port {
        match self {
            Source::Input1 => Port::Input1,
            Source::Input2 => Port::Input2,
            Source::Input3 => Port::Input3,
            Source::Input4 => Port::Input4,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Input {}", self.number())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let digits = s
            .strip_prefix("input")
            .map(|rest| rest.trim_start_matches(['-', '_', ' ']))
            .unwrap_or(s.as_str());
        digits
            .parse::<u8>()
            .ok()
            .and_then(Self::from_number)
            .ok_or_else(|| format!("invalid input '{s}' (expected 1-4)"))
    }
}

// =============================================================================
// Audio profile (EDID)
// =============================================================================

/// Audio decoding profile advertised through the output EDID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Edid {
    /// Take the profile from the sink's EDID
    Auto,
    /// Stereo 2.0
    Stereo,
    /// Dolby/DTS 5.1
    DolbyDts,
    /// HD Audio 7.1
    HdAudio,
}

impl Edid {
    pub const ALL: [Edid; 4] = [Edid::Auto, Edid::Stereo, Edid::DolbyDts, Edid::HdAudio];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Command selecting this profile
    pub fn select_command(self) -> Command {
        match self {
            Edid::Auto => Command::SetEdidAuto,
            Edid::Stereo => Command::SetEdidStereo,
            Edid::DolbyDts => Command::SetEdidDolbyDts,
            Edid::HdAudio => Command::SetEdidHdAudio,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Edid::Auto => "auto",
            Edid::Stereo => "stereo",
            Edid::DolbyDts => "dolby-dts",
            Edid::HdAudio => "hd-audio",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Edid::Auto => "Auto (EDID)",
            Edid::Stereo => "Stereo 2.0",
            Edid::DolbyDts => "Dolby/DTS 5.1",
            Edid::HdAudio => "HD Audio 7.1",
        }
    }
}

impl fmt::Display for Edid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Edid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Edid::Auto),
            "stereo" | "2.0" => Ok(Edid::Stereo),
            "dolby" | "dts" | "dolby-dts" | "5.1" => Ok(Edid::DolbyDts),
            "hd" | "hd-audio" | "7.1" => Ok(Edid::HdAudio),
            other => Err(format!(
                "invalid audio profile '{other}' (expected auto, stereo, dolby-dts, hd-audio)"
            )),
        }
    }
}

// =============================================================================
// Physical ports
// =============================================================================

/// Physical connector, used for connection-state queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Port {
    Output,
    Input1,
    Input2,
    Input3,
    Input4,
}

impl Port {
    pub const ALL: [Port; 5] = [
        Port::Output,
        Port::Input1,
        Port::Input2,
        Port::Input3,
        Port::Input4,
    ];

    /// Command querying this port's connection state
    pub fn query_command(self) -> Command {
        match self {
            Port::Output => Command::IsOutputConnected,
            Port::Input1 => Command::IsInput1Connected,
            Port::Input2 => Command::IsInput2Connected,
            Port::Input3 => Command::IsInput3Connected,
            Port::Input4 => Command::IsInput4Connected,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Output => f.write_str("Output"),
            Port::Input1 => f.write_str("Input 1"),
            Port::Input2 => f.write_str("Input 2"),
            Port::Input3 => f.write_str("Input 3"),
            Port::Input4 => f.write_str("Input 4"),
        }
    }
}

impl FromStr for Port {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "output" | "out" => Ok(Port::Output),
            other => other
                .parse::<Source>()
                .map(Source::port)
                .map_err(|_| format!("invalid port '{other}' (expected output or 1-4)")),
        }
    }
}

// =============================================================================
// On/off features
// =============================================================================

/// Features with an enable/disable/query command triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Automatic switching to an active input
    AutoSwitch,
    /// Audio Return Channel
    Arc,
}

impl Feature {
    /// Command enabling or disabling the feature
    pub fn set_command(self, enabled: bool) -> Command {
        match (self, enabled) {
            (Feature::AutoSwitch, true) => Command::EnableAuto,
            (Feature::AutoSwitch, false) => Command::DisableAuto,
            (Feature::Arc, true) => Command::EnableArc,
            (Feature::Arc, false) => Command::DisableArc,
        }
    }

    pub fn query_command(self) -> Command {
        match self {
            Feature::AutoSwitch => Command::GetAuto,
            Feature::Arc => Command::GetArc,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::AutoSwitch => "auto_switch",
            Feature::Arc => "arc",
        }
    }
}

// =============================================================================
// Decoders
// =============================================================================

fn invalid(field: &'static str, offset: usize, value: u8) -> ParseError {
    error!(
        "{}: invalid response from device (0x{:02X} at byte {})",
        field, value, offset
    );
    ParseError::InvalidValue {
        field,
        offset,
        value,
    }
}

/// Decode a `GetSource` reply: byte 6 holds the input number (1-4)
pub fn decode_source(resp: &Response) -> Result<Source, ParseError> {
    let raw = resp.flag();
    Source::from_number(raw).ok_or_else(|| invalid("source", offset::FLAG, raw))
}

/// Decode a `GetEdid` reply: byte 6 holds the profile number (1-4)
pub fn decode_edid(resp: &Response) -> Result<Edid, ParseError> {
    let raw = resp.flag();
    raw.checked_sub(1)
        .and_then(|i| Edid::from_index(i as usize))
        .ok_or_else(|| invalid("edid", offset::FLAG, raw))
}

/// Decode a connection-state reply: byte 6 is 0x00 (connected) or 0xFF
pub fn decode_connection(resp: &Response) -> Result<bool, ParseError> {
    match resp.flag() {
        value::CONNECTED => Ok(true),
        value::DISCONNECTED => Ok(false),
        raw => Err(invalid("connection", offset::FLAG, raw)),
    }
}

/// Decode an auto-switch/ARC reply: byte 4 is 0x0F (on) or 0xF0 (off)
pub fn decode_toggle(resp: &Response, feature: Feature) -> Result<bool, ParseError> {
    match resp.param() {
        value::ON => Ok(true),
        value::OFF => Ok(false),
        raw => Err(invalid(feature.name(), offset::PARAM, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::build_frame;

    fn reply(param: u8, flag: u8) -> Response {
        Response::validate(build_frame(0x01, 0x00, param, flag)).unwrap()
    }

    #[test]
    fn test_source_decode_range() {
        assert_eq!(decode_source(&reply(0, 0x01)), Ok(Source::Input1));
        assert_eq!(decode_source(&reply(0, 0x04)), Ok(Source::Input4));
        assert_eq!(
            decode_source(&reply(0, 0x05)),
            Err(ParseError::InvalidValue {
                field: "source",
                offset: 6,
                value: 0x05
            })
        );
        assert!(decode_source(&reply(0, 0x00)).is_err());
        assert!(decode_source(&reply(0, 0xFF)).is_err());
    }

    #[test]
    fn test_edid_decode_range() {
        assert_eq!(decode_edid(&reply(0, 0x01)), Ok(Edid::Auto));
        assert_eq!(decode_edid(&reply(0, 0x02)), Ok(Edid::Stereo));
        assert_eq!(decode_edid(&reply(0, 0x03)), Ok(Edid::DolbyDts));
        assert_eq!(decode_edid(&reply(0, 0x04)), Ok(Edid::HdAudio));
        assert!(decode_edid(&reply(0, 0x00)).is_err());
        assert!(decode_edid(&reply(0, 0x05)).is_err());
    }

    #[test]
    fn test_connection_decode() {
        assert_eq!(decode_connection(&reply(0, 0x00)), Ok(true));
        assert_eq!(decode_connection(&reply(0, 0xFF)), Ok(false));
        assert!(decode_connection(&reply(0, 0x7E)).is_err());
    }

    #[test]
    fn test_toggle_decode() {
        assert_eq!(decode_toggle(&reply(0x0F, 0), Feature::Arc), Ok(true));
        assert_eq!(decode_toggle(&reply(0xF0, 0), Feature::Arc), Ok(false));
        assert_eq!(
            decode_toggle(&reply(0x3C, 0), Feature::Arc),
            Err(ParseError::InvalidValue {
                field: "arc",
                offset: 4,
                value: 0x3C
            })
        );
        assert!(decode_toggle(&reply(0xFF, 0), Feature::AutoSwitch).is_err());
    }

    #[test]
    fn test_decode_only_reads_its_own_byte() {
        // ARC state lives in byte 4; byte 6 garbage must not matter
        assert_eq!(decode_toggle(&reply(0x0F, 0x99), Feature::AutoSwitch), Ok(true));
        // Source lives in byte 6
        assert_eq!(decode_source(&reply(0x99, 0x02)), Ok(Source::Input2));
    }

    #[test]
    fn test_command_mapping() {
        assert_eq!(Source::Input3.select_command(), Command::SetSourceInput3);
        assert_eq!(Edid::HdAudio.select_command(), Command::SetEdidHdAudio);
        assert_eq!(Port::Output.query_command(), Command::IsOutputConnected);
        assert_eq!(Port::Input4.query_command(), Command::IsInput4Connected);
        assert_eq!(Feature::Arc.set_command(false), Command::DisableArc);
        assert_eq!(Feature::AutoSwitch.set_command(true), Command::EnableAuto);
        assert_eq!(Feature::AutoSwitch.query_command(), Command::GetAuto);
    }

    #[test]
    fn test_value_parsing() {
        assert_eq!("2".parse::<Source>(), Ok(Source::Input2));
        assert_eq!("input4".parse::<Source>(), Ok(Source::Input4));
        assert_eq!("Input-1".parse::<Source>(), Ok(Source::Input1));
        assert!("0".parse::<Source>().is_err());
        assert!("5".parse::<Source>().is_err());

        assert_eq!("5.1".parse::<Edid>(), Ok(Edid::DolbyDts));
        assert_eq!("HD".parse::<Edid>(), Ok(Edid::HdAudio));
        assert!("mono".parse::<Edid>().is_err());

        assert_eq!("out".parse::<Port>(), Ok(Port::Output));
        assert_eq!("3".parse::<Port>(), Ok(Port::Input3));
        assert!("6".parse::<Port>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Edid::DolbyDts).unwrap();
        assert_eq!(json, "\"dolby-dts\"");
        let port: Port = serde_json::from_str("\"input2\"").unwrap();
        assert_eq!(port, Port::Input2);
    }
}
