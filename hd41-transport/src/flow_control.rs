//! Flow-control transport layer
//!
//! `FlowControlTransport` wraps a raw `Transport` (which only moves bytes)
//! and turns it into a reliable command/response exchange:
//!
//! ```text
//! Idle → Sending → AwaitingResponse → Validating → Success
//!           ↑                │              │
//!           │                └──→ Invalid ←─┘
//!           └──── (drain) ───────────┘   └──→ Failure
//! ```
//!
//! The unit occasionally answers with truncated or corrupted buffers while
//! it is busy (e.g. mid-switch). Each attempt writes the frame, waits up to
//! the response timeout for exactly one buffer's worth of bytes, and accepts
//! it only if its checksum holds. Every rejected attempt drains whatever is
//! left in the receive queue before the next one, so bytes from one attempt
//! are never read as part of another.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::error::TransportError;
use crate::protocol::{timing, ChecksumMismatch, Command, Frame, Response, FRAME_LEN};
use crate::types::TransportDeviceInfo;
use crate::Transport;

/// Scratch size used while draining the receive queue
const DRAIN_CHUNK: usize = 64;

/// Attempt count and timing for a command exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before giving up (at least one)
    pub attempts: usize,
    /// Time allowed for a full response, measured from the write
    pub response_timeout: Duration,
    /// Sleep between receive-queue checks; each one yields to the scheduler
    pub poll_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: timing::ATTEMPTS,
            response_timeout: Duration::from_millis(timing::RESPONSE_TIMEOUT_MS),
            poll_interval: Duration::from_millis(timing::POLL_INTERVAL_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: usize, response_timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            attempts: attempts.max(1),
            response_timeout: Duration::from_millis(response_timeout_ms),
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
        }
    }
}

/// Why an attempt was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// A full buffer never arrived; `available` bytes were queued at timeout
    NoResponse { available: usize },
    /// A full buffer arrived but its bytes do not sum to zero
    Checksum(ChecksumMismatch),
    /// The link itself failed
    Io(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::NoResponse { available: 0 } => f.write_str("no response"),
            AttemptFailure::NoResponse { available } => {
                write!(f, "incomplete response ({available} of {FRAME_LEN} bytes)")
            }
            AttemptFailure::Checksum(m) => write!(f, "{m}"),
            AttemptFailure::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

/// State of one `send_command` exchange
#[derive(Debug)]
enum Exchange {
    Idle,
    Sending { attempt: usize },
    AwaitingResponse { attempt: usize, started: Instant },
    Validating { attempt: usize, buffer: Frame },
    Invalid { attempt: usize, failure: AttemptFailure },
    Success(Response),
    Failure,
}

/// Command engine on top of a raw byte transport
///
/// Only one exchange runs at a time; concurrent callers queue on an
/// internal lock. An exchange is never cancelled once started.
pub struct FlowControlTransport {
    inner: Arc<dyn Transport>,
    policy: RetryPolicy,
    query_lock: tokio::sync::Mutex<()>,
}

impl FlowControlTransport {
    /// Wrap `inner` with the default policy (3 attempts, 1 s timeout)
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            query_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Get the underlying raw transport
    pub fn inner(&self) -> &Arc<dyn Transport> {
        &self.inner
    }

    pub fn device_info(&self) -> &TransportDeviceInfo {
        self.inner.device_info()
    }

    /// Send `cmd` and return the first response that passes its checksum
    ///
    /// Fails with `TransportError::NoResponse` once every attempt timed
    /// out, came back short, failed its checksum or hit an I/O error. No
    /// bytes from a rejected attempt ever reach the caller.
    pub async fn send_command(&self, cmd: Command) -> Result<Response, TransportError> {
        let _guard = self.query_lock.lock().await;

        let mut state = Exchange::Idle;
        loop {
            state = match state {
                Exchange::Idle => {
                    self.drain(cmd).await;
                    Exchange::Sending { attempt: 1 }
                }
                Exchange::Sending { attempt } => self.transmit(cmd, attempt).await,
                Exchange::AwaitingResponse { attempt, started } => {
                    self.await_response(attempt, started).await
                }
                Exchange::Validating { attempt, buffer } => match Response::validate(buffer) {
                    Ok(resp) => Exchange::Success(resp),
                    Err(mismatch) => {
                        warn!("send_command({}): invalid checksum - discarding buffer", cmd);
                        Exchange::Invalid {
                            attempt,
                            failure: AttemptFailure::Checksum(mismatch),
                        }
                    }
                },
                Exchange::Invalid { attempt, failure } => {
                    warn!(
                        "send_command({}): {} on attempt {}/{}",
                        cmd, failure, attempt, self.policy.attempts
                    );
                    self.drain(cmd).await;
                    if attempt < self.policy.attempts {
                        Exchange::Sending {
                            attempt: attempt + 1,
                        }
                    } else {
                        Exchange::Failure
                    }
                }
                Exchange::Success(resp) => {
                    debug!("Got response for {}: {:02X?}", cmd, resp.as_bytes());
                    return Ok(resp);
                }
                Exchange::Failure => {
                    error!(
                        "send_command({}): unit not responding to command - giving up",
                        cmd
                    );
                    return Err(TransportError::NoResponse {
                        command: cmd,
                        attempts: self.policy.attempts,
                    });
                }
            };
        }
    }

    /// Sending → AwaitingResponse (or Invalid if the write fails)
    async fn transmit(&self, cmd: Command, attempt: usize) -> Exchange {
        let frame = cmd.frame();
        debug!("Sending {} (attempt {}): {:02X?}", cmd, attempt, frame);
        let started = Instant::now();
        match self.inner.write(frame).await {
            Ok(()) => Exchange::AwaitingResponse { attempt, started },
            Err(e) => Exchange::Invalid {
                attempt,
                failure: AttemptFailure::Io(e.to_string()),
            },
        }
    }

    /// AwaitingResponse → Validating once exactly one buffer is queued,
    /// or Invalid on timeout
    async fn await_response(&self, attempt: usize, started: Instant) -> Exchange {
        loop {
            let available = match self.inner.available().await {
                Ok(n) => n,
                Err(e) => {
                    return Exchange::Invalid {
                        attempt,
                        failure: AttemptFailure::Io(e.to_string()),
                    }
                }
            };

            if available == FRAME_LEN {
                let mut buffer = [0u8; FRAME_LEN];
                return match self.inner.read(&mut buffer).await {
                    Ok(FRAME_LEN) => Exchange::Validating { attempt, buffer },
                    Ok(n) => Exchange::Invalid {
                        attempt,
                        failure: AttemptFailure::NoResponse { available: n },
                    },
                    Err(e) => Exchange::Invalid {
                        attempt,
                        failure: AttemptFailure::Io(e.to_string()),
                    },
                };
            }

            if started.elapsed() > self.policy.response_timeout {
                return Exchange::Invalid {
                    attempt,
                    failure: AttemptFailure::NoResponse { available },
                };
            }

            // Yield so other tasks (and the runtime's timers) keep running
            tokio::time::sleep(self.policy.poll_interval).await;
        }
    }

    /// Read and discard everything in the receive queue
    ///
    /// # Returns
    /// Number of bytes discarded
    async fn drain(&self, cmd: Command) -> usize {
        let count = match self.inner.available().await {
            Ok(n) => n,
            Err(e) => {
                debug!("send_command({}): cannot check input buffer: {}", cmd, e);
                return 0;
            }
        };
        if count == 0 {
            return 0;
        }

        warn!(
            "send_command({}): discarding input buffer ({} bytes)",
            cmd, count
        );
        let mut scratch = [0u8; DRAIN_CHUNK];
        let mut remaining = count;
        while remaining > 0 {
            let want = remaining.min(DRAIN_CHUNK);
            match self.inner.read(&mut scratch[..want]).await {
                Ok(0) => break,
                Ok(n) => remaining -= n.min(remaining),
                Err(e) => {
                    debug!("send_command({}): drain read failed: {}", cmd, e);
                    break;
                }
            }
        }
        count - remaining
    }
}
