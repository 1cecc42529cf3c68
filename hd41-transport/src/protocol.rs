//! Protocol constants, frame catalog and checksum for the HD41 RS232 protocol
//!
//! Every frame in either direction is 13 bytes:
//!
//! ```text
//! [0xA5][0x5B][class][opcode][param][0x00][flag][0x00 x5][checksum]
//! ```
//!
//! The checksum byte is chosen so that all 13 bytes add up to zero (mod 256).

use std::fmt;
use std::str::FromStr;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Length of every command frame and every response buffer
pub const FRAME_LEN: usize = 13;

/// Sync header starting every frame
pub const SYNC: [u8; 2] = [0xA5, 0x5B];

/// A complete, checksummed command frame
pub type Frame = [u8; FRAME_LEN];

/// Payload byte offsets within a response buffer
pub mod offset {
    /// On/off state of auto-switch and ARC queries
    pub const PARAM: usize = 4;
    /// Selected input, selected EDID and connection state
    pub const FLAG: usize = 6;
}

/// Payload encodings used in responses
pub mod value {
    /// Feature enabled (auto-switch, ARC)
    pub const ON: u8 = 0x0F;
    /// Feature disabled (auto-switch, ARC)
    pub const OFF: u8 = 0xF0;
    /// Port has a connected sink/source
    pub const CONNECTED: u8 = 0x00;
    /// Port is unconnected
    pub const DISCONNECTED: u8 = 0xFF;
}

/// Exchange timing and retry limits
pub mod timing {
    /// Attempts per command before giving up
    pub const ATTEMPTS: usize = 3;
    /// Time allowed for a full response to arrive, per attempt (ms)
    pub const RESPONSE_TIMEOUT_MS: u64 = 1000;
    /// Sleep between checks of the receive queue (ms)
    pub const POLL_INTERVAL_MS: u64 = 1;
}

/// Serial line defaults
pub mod serial {
    /// The unit talks 9600 8N1
    pub const DEFAULT_BAUD_RATE: u32 = 9600;
}

/// Supported RS232 commands, one per catalog frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    SetSourceInput1 = 0,
    SetSourceInput2,
    SetSourceInput3,
    SetSourceInput4,
    GetSource,
    IsOutputConnected,
    IsInput1Connected,
    IsInput2Connected,
    IsInput3Connected,
    IsInput4Connected,
    SetEdidAuto,
    SetEdidStereo,
    SetEdidDolbyDts,
    SetEdidHdAudio,
    GetEdid,
    EnableAuto,
    DisableAuto,
    GetAuto,
    EnableArc,
    DisableArc,
    GetArc,
}

impl Command {
    /// Number of commands in the catalog
    pub const COUNT: usize = 21;

    /// All commands in catalog order
    pub const ALL: [Command; Self::COUNT] = [
        Command::SetSourceInput1,
        Command::SetSourceInput2,
        Command::SetSourceInput3,
        Command::SetSourceInput4,
        Command::GetSource,
        Command::IsOutputConnected,
        Command::IsInput1Connected,
        Command::IsInput2Connected,
        Command::IsInput3Connected,
        Command::IsInput4Connected,
        Command::SetEdidAuto,
        Command::SetEdidStereo,
        Command::SetEdidDolbyDts,
        Command::SetEdidHdAudio,
        Command::GetEdid,
        Command::EnableAuto,
        Command::DisableAuto,
        Command::GetAuto,
        Command::EnableArc,
        Command::DisableArc,
        Command::GetArc,
    ];

    /// The pre-baked frame for this command
    pub fn frame(self) -> &'static Frame {
        &CATALOG[self as usize]
    }

    /// Catalog index of this command
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a command by catalog index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether the command only reads device state
    pub fn is_query(self) -> bool {
        matches!(
            self,
            Command::GetSource
                | Command::IsOutputConnected
                | Command::IsInput1Connected
                | Command::IsInput2Connected
                | Command::IsInput3Connected
                | Command::IsInput4Connected
                | Command::GetEdid
                | Command::GetAuto
                | Command::GetArc
        )
    }

    /// CLI name for the command
    pub fn name(self) -> &'static str {
        match self {
            Command::SetSourceInput1 => "select-input-1",
            Command::SetSourceInput2 => "select-input-2",
            Command::SetSourceInput3 => "select-input-3",
            Command::SetSourceInput4 => "select-input-4",
            Command::GetSource => "query-input",
            Command::IsOutputConnected => "query-output-connection",
            Command::IsInput1Connected => "query-input-1-connection",
            Command::IsInput2Connected => "query-input-2-connection",
            Command::IsInput3Connected => "query-input-3-connection",
            Command::IsInput4Connected => "query-input-4-connection",
            Command::SetEdidAuto => "select-audio-auto",
            Command::SetEdidStereo => "select-audio-stereo",
            Command::SetEdidDolbyDts => "select-audio-dolby-dts",
            Command::SetEdidHdAudio => "select-audio-hd",
            Command::GetEdid => "query-audio",
            Command::EnableAuto => "auto-switch-on",
            Command::DisableAuto => "auto-switch-off",
            Command::GetAuto => "query-auto-switch",
            Command::EnableArc => "arc-on",
            Command::DisableArc => "arc-off",
            Command::GetArc => "query-arc",
        }
    }

    /// Human-readable description
    pub fn description(self) -> &'static str {
        match self {
            Command::SetSourceInput1 => "Select Input 1",
            Command::SetSourceInput2 => "Select Input 2",
            Command::SetSourceInput3 => "Select Input 3",
            Command::SetSourceInput4 => "Select Input 4",
            Command::GetSource => "Query Selected Input",
            Command::IsOutputConnected => "Query Conn State Output",
            Command::IsInput1Connected => "Query Conn State Input 1",
            Command::IsInput2Connected => "Query Conn State Input 2",
            Command::IsInput3Connected => "Query Conn State Input 3",
            Command::IsInput4Connected => "Query Conn State Input 4",
            Command::SetEdidAuto => "Select Audio Auto",
            Command::SetEdidStereo => "Select Audio Stereo 2.0",
            Command::SetEdidDolbyDts => "Select Audio Dolby/DTS 5.1",
            Command::SetEdidHdAudio => "Select Audio HD Audio 7.1",
            Command::GetEdid => "Query Selected Audio",
            Command::EnableAuto => "AutoSwitch On",
            Command::DisableAuto => "AutoSwitch Off",
            Command::GetAuto => "Query AutoSwitch",
            Command::EnableArc => "ARC On",
            Command::DisableArc => "ARC Off",
            Command::GetArc => "Query ARC",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), *self as u8)
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| format!("unknown command '{s}'"))
    }
}

/// Command frames, indexed by `Command` discriminant.
///
/// Checksums are baked in; they are verified at compile time below and
/// never recomputed when sending.
const FRAMES: [Frame; Command::COUNT] = [
    [0xA5, 0x5B, 0x02, 0x03, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF9],
    [0xA5, 0x5B, 0x02, 0x03, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8],
    [0xA5, 0x5B, 0x02, 0x03, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF7],
    [0xA5, 0x5B, 0x02, 0x03, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF6],
    [0xA5, 0x5B, 0x02, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFC],
    [0xA5, 0x5B, 0x01, 0x05, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF9],
    [0xA5, 0x5B, 0x01, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFA],
    [0xA5, 0x5B, 0x01, 0x04, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF9],
    [0xA5, 0x5B, 0x01, 0x04, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8],
    [0xA5, 0x5B, 0x01, 0x04, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF7],
    [0xA5, 0x5B, 0x03, 0x02, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF9],
    [0xA5, 0x5B, 0x03, 0x02, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8],
    [0xA5, 0x5B, 0x03, 0x02, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF7],
    [0xA5, 0x5B, 0x03, 0x02, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF6],
    [0xA5, 0x5B, 0x01, 0x0C, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF2],
    [0xA5, 0x5B, 0x02, 0x05, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xEA],
    [0xA5, 0x5B, 0x02, 0x05, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x09],
    [0xA5, 0x5B, 0x01, 0x0D, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF2],
    [0xA5, 0x5B, 0x10, 0x01, 0x0F, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xDF],
    [0xA5, 0x5B, 0x10, 0x01, 0xF0, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFE],
    [0xA5, 0x5B, 0x10, 0x02, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xED],
];

static CATALOG: [Frame; Command::COUNT] = FRAMES;

const _: () = {
    let mut i = 0;
    while i < FRAMES.len() {
        assert!(
            checksum(&FRAMES[i]) == 0,
            "catalog frame does not sum to zero"
        );
        i += 1;
    }
};

/// Sum of all bytes modulo 256; zero for a valid frame
pub const fn checksum(bytes: &[u8; FRAME_LEN]) -> u8 {
    let mut sum = 0u8;
    let mut i = 0;
    while i < FRAME_LEN {
        sum = sum.wrapping_add(bytes[i]);
        i += 1;
    }
    sum
}

/// Named view of the 13-byte wire layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct WireFrame {
    pub sync: [u8; 2],
    pub class: u8,
    pub opcode: u8,
    pub param: u8,
    pub reserved: u8,
    pub flag: u8,
    pub padding: [u8; 5],
    pub checksum: u8,
}

impl WireFrame {
    /// View raw bytes through the wire layout
    pub fn from_array(bytes: Frame) -> Self {
        zerocopy::transmute!(bytes)
    }

    /// Raw bytes of the frame
    pub fn to_array(self) -> Frame {
        zerocopy::transmute!(self)
    }

    /// Whether the sync header is present
    pub fn has_sync(&self) -> bool {
        self.sync == SYNC
    }
}

impl fmt::Display for WireFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "class=0x{:02X} opcode=0x{:02X} param=0x{:02X} flag=0x{:02X} sum=0x{:02X}",
            self.class, self.opcode, self.param, self.flag, self.checksum
        )
    }
}

/// Response buffer whose checksum was verified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    frame: WireFrame,
}

/// Response rejected because its bytes do not sum to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumMismatch {
    /// Sum of the received bytes (mod 256)
    pub sum: u8,
}

impl fmt::Display for ChecksumMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "checksum mismatch (sum 0x{:02X})", self.sum)
    }
}

impl std::error::Error for ChecksumMismatch {}

impl Response {
    /// Accept a received buffer only if all bytes sum to zero
    pub fn validate(bytes: Frame) -> Result<Self, ChecksumMismatch> {
        match checksum(&bytes) {
            0 => Ok(Self {
                frame: WireFrame::from_array(bytes),
            }),
            sum => Err(ChecksumMismatch { sum }),
        }
    }

    /// Raw bytes of the response
    pub fn as_bytes(&self) -> &[u8] {
        self.frame.as_bytes()
    }

    /// Wire-layout view
    pub fn wire(&self) -> &WireFrame {
        &self.frame
    }

    /// Byte 4: on/off state for auto-switch and ARC
    pub fn param(&self) -> u8 {
        self.frame.param
    }

    /// Byte 6: input, EDID index or connection state
    pub fn flag(&self) -> u8 {
        self.frame.flag
    }
}

/// Build a checksummed frame from its variable fields.
///
/// The catalog is authoritative for sending; this exists for tooling and
/// for producing well-formed replies in tests.
pub fn build_frame(class: u8, opcode: u8, param: u8, flag: u8) -> Frame {
    let mut frame = [0u8; FRAME_LEN];
    frame[..2].copy_from_slice(&SYNC);
    frame[2] = class;
    frame[3] = opcode;
    frame[4] = param;
    frame[6] = flag;
    frame[FRAME_LEN - 1] = 0u8.wrapping_sub(checksum(&frame));
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalog_frame_sums_to_zero() {
        for cmd in Command::ALL {
            assert_eq!(checksum(cmd.frame()), 0, "{cmd}");
            assert_eq!(&cmd.frame()[..2], &SYNC, "{cmd}");
        }
    }

    #[test]
    fn test_catalog_order_matches_commands() {
        for (i, cmd) in Command::ALL.iter().enumerate() {
            assert_eq!(cmd.index(), i);
            assert_eq!(Command::from_index(i), Some(*cmd));
        }
        assert_eq!(Command::from_index(Command::COUNT), None);
    }

    #[test]
    fn test_select_input_encoding() {
        let inputs = [
            Command::SetSourceInput1,
            Command::SetSourceInput2,
            Command::SetSourceInput3,
            Command::SetSourceInput4,
        ];
        for (n, cmd) in (1u8..=4).zip(inputs) {
            let wire = WireFrame::from_array(*cmd.frame());
            assert_eq!(wire.class, 0x02);
            assert_eq!(wire.opcode, 0x03);
            assert_eq!(wire.param, n);
            assert_eq!(wire.checksum, 0xFA - n);
        }
    }

    #[test]
    fn test_feature_toggle_encoding() {
        let on = WireFrame::from_array(*Command::EnableAuto.frame());
        let off = WireFrame::from_array(*Command::DisableAuto.frame());
        assert_eq!((on.class, on.opcode, on.param), (0x02, 0x05, value::ON));
        assert_eq!((off.class, off.opcode, off.param), (0x02, 0x05, value::OFF));

        let on = WireFrame::from_array(*Command::EnableArc.frame());
        let off = WireFrame::from_array(*Command::DisableArc.frame());
        assert_eq!((on.class, on.opcode, on.param), (0x10, 0x01, value::ON));
        assert_eq!((off.class, off.opcode, off.param), (0x10, 0x01, value::OFF));
    }

    #[test]
    fn test_connection_query_encoding() {
        let out = WireFrame::from_array(*Command::IsOutputConnected.frame());
        assert_eq!((out.class, out.opcode, out.param), (0x01, 0x05, 0x01));
        let in3 = WireFrame::from_array(*Command::IsInput3Connected.frame());
        assert_eq!((in3.class, in3.opcode, in3.param), (0x01, 0x04, 0x03));
    }

    #[test]
    fn test_query_selected_input_frame() {
        assert_eq!(
            Command::GetSource.frame(),
            &[0xA5, 0x5B, 0x02, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFC]
        );
        let wire = WireFrame::from_array(*Command::GetSource.frame());
        assert!(wire.has_sync());
        assert_eq!(wire.checksum, 0xFC);
        assert_eq!(&wire.to_array(), Command::GetSource.frame());
    }

    #[test]
    fn test_build_frame_reproduces_catalog() {
        assert_eq!(&build_frame(0x03, 0x02, 0x02, 0x01), Command::SetEdidStereo.frame());
        assert_eq!(&build_frame(0x10, 0x02, 0x00, 0x01), Command::GetArc.frame());
    }

    #[test]
    fn test_response_validation() {
        let good = build_frame(0x02, 0x01, 0x01, 0x03);
        let resp = Response::validate(good).unwrap();
        assert_eq!(resp.flag(), 0x03);
        assert_eq!(resp.param(), 0x01);
        assert_eq!(resp.as_bytes(), &good[..]);

        let mut bad = good;
        bad[6] ^= 0x40;
        let err = Response::validate(bad).unwrap_err();
        assert_eq!(err.sum, 0x40);
    }

    #[test]
    fn test_command_names_roundtrip() {
        for cmd in Command::ALL {
            assert_eq!(cmd.name().parse::<Command>(), Ok(cmd));
        }
        assert!("select-input-5".parse::<Command>().is_err());
    }

    #[test]
    fn test_query_classification() {
        let queries: Vec<_> = Command::ALL.iter().filter(|c| c.is_query()).collect();
        assert_eq!(queries.len(), 9);
        assert!(!Command::EnableArc.is_query());
    }
}
