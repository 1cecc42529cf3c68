//! High-level interface for the Vorke HD41 HDMI matrix
//!
//! This crate exposes the unit's operations as typed async methods on top
//! of the command engine in `hd41-transport`, plus the host-side pieces
//! that sit above them: grouped status polling and the logical switch
//! board with its mutually exclusive groups.

pub mod error;
pub mod group;
pub mod status;
pub mod switches;
pub mod sync;

pub use error::MatrixError;
pub use group::ExclusiveGroup;
pub use status::{MatrixStatus, PollGroups};
pub use switches::{Action, Switch, SwitchBoard};
pub use sync::list_ports;

pub use hd41_transport::{Edid, Feature, Port, Source};

use std::sync::Arc;

use hd41_transport::{
    decode_connection, decode_edid, decode_source, decode_toggle, Command, FlowControlTransport,
    Response,
};
use tracing::debug;

/// High-level matrix interface using any transport
///
/// Getters return `Ok` only when the unit answered with a valid frame
/// whose payload is in range. Setters report whether the exchange
/// succeeded; the protocol has no way to confirm the unit applied the
/// change.
pub struct MatrixInterface {
    transport: Arc<FlowControlTransport>,
}

impl MatrixInterface {
    /// Create a new matrix interface
    pub fn new(transport: Arc<FlowControlTransport>) -> Self {
        Self { transport }
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &Arc<FlowControlTransport> {
        &self.transport
    }

    async fn exchange(&self, cmd: Command) -> Result<Response, MatrixError> {
        Ok(self.transport.send_command(cmd).await?)
    }

    // === Video source ===

    /// Switch the output to `source`
    pub async fn set_source(&self, source: Source) -> Result<(), MatrixError> {
        debug!("set_source({})", source);
        self.exchange(source.select_command()).await?;
        Ok(())
    }

    /// Switch the output to front-panel input `number` (1-4)
    pub async fn set_source_number(&self, number: u8) -> Result<(), MatrixError> {
        let source = Source::from_number(number).ok_or_else(|| {
            MatrixError::InvalidParameter(format!("input must be 1-4, got {number}"))
        })?;
        self.set_source(source).await
    }

    /// Get the currently selected input
    pub async fn get_source(&self) -> Result<Source, MatrixError> {
        let resp = self.exchange(Command::GetSource).await?;
        Ok(decode_source(&resp)?)
    }

    // === Audio profile ===

    /// Select the audio decoding profile
    pub async fn set_edid(&self, edid: Edid) -> Result<(), MatrixError> {
        debug!("set_edid({})", edid);
        self.exchange(edid.select_command()).await?;
        Ok(())
    }

    /// Get the selected audio decoding profile
    pub async fn get_edid(&self) -> Result<Edid, MatrixError> {
        let resp = self.exchange(Command::GetEdid).await?;
        Ok(decode_edid(&resp)?)
    }

    // === Connection state ===

    /// Whether something is plugged into `port`
    pub async fn is_port_connected(&self, port: Port) -> Result<bool, MatrixError> {
        let resp = self.exchange(port.query_command()).await?;
        Ok(decode_connection(&resp)?)
    }

    // === Auto-switch / ARC ===

    /// Enable or disable `feature`
    pub async fn set_feature(&self, feature: Feature, enabled: bool) -> Result<(), MatrixError> {
        debug!("set_feature({:?}, {})", feature, enabled);
        self.exchange(feature.set_command(enabled)).await?;
        Ok(())
    }

    /// Whether `feature` is enabled
    pub async fn get_feature(&self, feature: Feature) -> Result<bool, MatrixError> {
        let resp = self.exchange(feature.query_command()).await?;
        Ok(decode_toggle(&resp, feature)?)
    }

    /// Enable or disable automatic input switching
    pub async fn set_auto(&self, enabled: bool) -> Result<(), MatrixError> {
        self.set_feature(Feature::AutoSwitch, enabled).await
    }

    /// Whether automatic input switching is enabled
    pub async fn get_auto(&self) -> Result<bool, MatrixError> {
        self.get_feature(Feature::AutoSwitch).await
    }

    /// Enable or disable the Audio Return Channel
    pub async fn set_arc(&self, enabled: bool) -> Result<(), MatrixError> {
        self.set_feature(Feature::Arc, enabled).await
    }

    /// Whether the Audio Return Channel is enabled
    pub async fn get_arc(&self) -> Result<bool, MatrixError> {
        self.get_feature(Feature::Arc).await
    }

    // === Raw ===

    /// Run one catalog command and return the validated reply
    pub async fn raw(&self, cmd: Command) -> Result<Response, MatrixError> {
        self.exchange(cmd).await
    }

    // === Host integration ===

    /// Carry out a switch board action
    pub async fn apply(&self, action: Action) -> Result<(), MatrixError> {
        match action {
            Action::SetSource(source) => self.set_source(source).await,
            Action::SetEdid(edid) => self.set_edid(edid).await,
            Action::SetFeature(feature, enabled) => self.set_feature(feature, enabled).await,
        }
    }

    /// Query every enabled group once
    ///
    /// A failed query leaves its field empty; it never aborts the poll.
    pub async fn poll(&self, groups: &PollGroups) -> MatrixStatus {
        status::poll(self, groups).await
    }
}
