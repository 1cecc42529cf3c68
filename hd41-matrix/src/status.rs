//! Grouped status polling
//!
//! Only groups a host actually uses are queried, which keeps RS232 traffic
//! down: each enabled group costs one exchange per poll (one per port for
//! connection state).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MatrixError;
use crate::MatrixInterface;
use hd41_transport::{Edid, Feature, Port, Source};

/// Which parts of the unit's state to query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollGroups {
    /// Selected video input
    pub input: bool,
    /// Selected audio profile
    pub audio: bool,
    pub auto_switch: bool,
    pub arc: bool,
    /// Ports whose connection state is queried
    pub connections: Vec<Port>,
}

impl Default for PollGroups {
    fn default() -> Self {
        Self::all()
    }
}

impl PollGroups {
    /// Every group and every port
    pub fn all() -> Self {
        Self {
            input: true,
            audio: true,
            auto_switch: true,
            arc: true,
            connections: Port::ALL.to_vec(),
        }
    }

    /// Nothing at all
    pub fn none() -> Self {
        Self {
            input: false,
            audio: false,
            auto_switch: false,
            arc: false,
            connections: Vec::new(),
        }
    }

    /// The switch-like groups (input, audio, auto-switch, ARC)
    pub fn switches(&self) -> Self {
        Self {
            connections: Vec::new(),
            ..self.clone()
        }
    }

    /// Only the connection sensors
    pub fn sensors(&self) -> Self {
        Self {
            connections: self.connections.clone(),
            ..Self::none()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query_count() == 0
    }

    /// Exchanges one poll costs
    pub fn query_count(&self) -> usize {
        [self.input, self.audio, self.auto_switch, self.arc]
            .iter()
            .filter(|&&on| on)
            .count()
            + self.connections.len()
    }
}

/// Connection state of one port; `None` if the query failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortState {
    pub port: Port,
    pub connected: Option<bool>,
}

/// Snapshot of the unit's state
///
/// Fields are `None` when the group was not polled or its query failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatrixStatus {
    pub source: Option<Source>,
    pub edid: Option<Edid>,
    pub auto_switch: Option<bool>,
    pub arc: Option<bool>,
    pub connections: Vec<PortState>,
}

impl MatrixStatus {
    /// Connection state of `port`, if known
    pub fn connection(&self, port: Port) -> Option<bool> {
        self.connections
            .iter()
            .find(|s| s.port == port)
            .and_then(|s| s.connected)
    }

    /// Overlay the known values of `newer` onto this snapshot
    pub fn merge(&mut self, newer: &MatrixStatus) {
        self.source = newer.source.or(self.source);
        self.edid = newer.edid.or(self.edid);
        self.auto_switch = newer.auto_switch.or(self.auto_switch);
        self.arc = newer.arc.or(self.arc);
        for state in &newer.connections {
            if state.connected.is_none() {
                continue;
            }
            match self.connections.iter_mut().find(|s| s.port == state.port) {
                Some(existing) => existing.connected = state.connected,
                None => self.connections.push(*state),
            }
        }
    }
}

fn settle<T>(what: &str, result: Result<T, MatrixError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("poll: {} query failed: {}", what, e);
            None
        }
    }
}

pub(crate) async fn poll(matrix: &MatrixInterface, groups: &PollGroups) -> MatrixStatus {
    let mut status = MatrixStatus::default();

    if groups.arc {
        status.arc = settle("arc", matrix.get_feature(Feature::Arc).await);
    }
    if groups.auto_switch {
        status.auto_switch = settle("auto_switch", matrix.get_feature(Feature::AutoSwitch).await);
    }
    if groups.input {
        status.source = settle("source", matrix.get_source().await);
    }
    if groups.audio {
        status.edid = settle("edid", matrix.get_edid().await);
    }
    for &port in &groups.connections {
        let connected = settle("connection", matrix.is_port_connected(port).await);
        status.connections.push(PortState { port, connected });
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_count() {
        assert_eq!(PollGroups::all().query_count(), 9);
        assert_eq!(PollGroups::none().query_count(), 0);
        assert!(PollGroups::none().is_empty());
        assert_eq!(PollGroups::all().switches().query_count(), 4);
        assert_eq!(PollGroups::all().sensors().query_count(), 5);
    }

    #[test]
    fn test_groups_deserialize_with_defaults() {
        let groups: PollGroups = serde_json::from_str(r#"{"arc": false}"#).unwrap();
        assert!(!groups.arc);
        assert!(groups.input);
        assert_eq!(groups.connections.len(), 5);

        let groups: PollGroups =
            serde_json::from_str(r#"{"connections": ["output", "input2"]}"#).unwrap();
        assert_eq!(groups.connections, vec![Port::Output, Port::Input2]);
    }

    #[test]
    fn test_merge_keeps_known_values() {
        let mut status = MatrixStatus {
            source: Some(Source::Input2),
            arc: Some(true),
            connections: vec![PortState {
                port: Port::Output,
                connected: Some(true),
            }],
            ..Default::default()
        };
        let newer = MatrixStatus {
            source: None,
            edid: Some(Edid::Stereo),
            arc: Some(false),
            connections: vec![
                PortState {
                    port: Port::Output,
                    connected: None,
                },
                PortState {
                    port: Port::Input1,
                    connected: Some(false),
                },
            ],
            ..Default::default()
        };

        status.merge(&newer);
        assert_eq!(status.source, Some(Source::Input2));
        assert_eq!(status.edid, Some(Edid::Stereo));
        assert_eq!(status.arc, Some(false));
        assert_eq!(status.connection(Port::Output), Some(true));
        assert_eq!(status.connection(Port::Input1), Some(false));
        assert_eq!(status.connection(Port::Input4), None);
    }
}
