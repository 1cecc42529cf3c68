//! Scripted in-memory transport for exercising the command engine
//!
//! Each write consumes the next scripted `Reply` and appends its bytes to
//! the receive queue, so tests can model corrupted, short, oversized or
//! missing responses as well as stray bytes left over from earlier traffic.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::TransportError;
use crate::protocol::{build_frame, Command, Frame, WireFrame};
use crate::types::{PortKind, TransportDeviceInfo, TransportType};
use crate::Transport;

/// What the simulated unit does in answer to one write
#[derive(Debug, Clone)]
pub enum Reply {
    /// Send these 13 bytes
    Frame(Frame),
    /// Send arbitrary bytes (short, oversized or garbage)
    Bytes(Vec<u8>),
    /// Send nothing
    Silence,
    /// Fail the write itself
    WriteError,
}

#[derive(Default)]
struct ScriptState {
    replies: VecDeque<Reply>,
    rx: VecDeque<u8>,
    written: Vec<Vec<u8>>,
    delivered: Vec<u8>,
}

/// Transport answering writes from a script
pub struct ScriptedTransport {
    state: Mutex<ScriptState>,
    info: TransportDeviceInfo,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    /// Transport with an empty script; every write is answered with silence
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScriptState::default()),
            info: TransportDeviceInfo {
                port_name: "scripted".into(),
                baud_rate: crate::protocol::serial::DEFAULT_BAUD_RATE,
                kind: PortKind::Unknown,
                transport_type: TransportType::Scripted,
            },
        }
    }

    /// Transport answering successive writes with `replies`
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let transport = Self::new();
        transport.state.lock().replies.extend(replies);
        transport
    }

    /// Append a reply to the script
    pub fn push_reply(&self, reply: Reply) {
        self.state.lock().replies.push_back(reply);
    }

    /// Put bytes into the receive queue right now
    pub fn inject(&self, bytes: &[u8]) {
        self.state.lock().rx.extend(bytes.iter().copied());
    }

    /// Every write so far
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    /// Commands written so far, resolved against the catalog
    pub fn written_commands(&self) -> Vec<Option<Command>> {
        self.written()
            .iter()
            .map(|w| Command::ALL.iter().copied().find(|c| c.frame()[..] == w[..]))
            .collect()
    }

    /// Bytes still waiting in the receive queue
    pub fn pending(&self) -> usize {
        self.state.lock().rx.len()
    }

    /// Every byte handed out by `read`, in order
    pub fn delivered(&self) -> Vec<u8> {
        self.state.lock().delivered.clone()
    }

    /// Scripted replies not yet consumed
    pub fn remaining_replies(&self) -> usize {
        self.state.lock().replies.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.written.push(data.to_vec());
        match state.replies.pop_front().unwrap_or(Reply::Silence) {
            Reply::Frame(frame) => state.rx.extend(frame),
            Reply::Bytes(bytes) => state.rx.extend(bytes),
            Reply::Silence => {}
            Reply::WriteError => return Err(TransportError::Io("scripted write failure".into())),
        }
        Ok(())
    }

    async fn available(&self) -> Result<usize, TransportError> {
        Ok(self.state.lock().rx.len())
    }

    async fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        let count = buf.len().min(state.rx.len());
        for slot in buf.iter_mut().take(count) {
            if let Some(byte) = state.rx.pop_front() {
                *slot = byte;
                state.delivered.push(byte);
            }
        }
        Ok(count)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }
}

/// A well-formed reply echoing `cmd`'s class and opcode
pub fn reply_to(cmd: Command, param: u8, flag: u8) -> Frame {
    let wire = WireFrame::from_array(*cmd.frame());
    build_frame(wire.class, wire.opcode, param, flag)
}

/// `frame` with one payload byte flipped so the checksum no longer holds
pub fn corrupted(mut frame: Frame) -> Frame {
    frame[7] ^= 0x5A;
    frame
}
