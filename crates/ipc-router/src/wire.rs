//! Frame codec at the transport boundary.
//!
//! Everything a transport carries is one of these frames, serialized with
//! bincode. Data frames carry user payloads; the control frames keep
//! remote registries in sync and implement resume-transmission flow
//! control.

use crate::domain::{PortAddress, PortName, RouterError};
use serde::{Deserialize, Serialize};

/// A unit of traffic between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    /// A user payload from `src` to `dst`.
    Data {
        src: PortAddress,
        dst: PortAddress,
        payload: Vec<u8>,
    },
    /// A port on the sending node registered `name`.
    ServerAnnounce { name: PortName, addr: PortAddress },
    /// A port on the sending node dropped `name`.
    ServerRemove { name: PortName, addr: PortAddress },
    /// `peer`'s receive queue drained; the flow-controlled port `dst` may
    /// transmit again.
    ResumeTx { dst: PortAddress, peer: PortAddress },
}

/// Serialize a frame for a transport.
pub fn encode(frame: &Frame) -> Result<Vec<u8>, RouterError> {
    bincode::serialize(frame).map_err(|e| RouterError::MalformedInput(e.to_string()))
}

/// Decode an inbound frame. Undecodable bytes are a `MalformedInput`
/// failure reported to the transport, never a panic.
pub fn decode(bytes: &[u8]) -> Result<Frame, RouterError> {
    bincode::deserialize(bytes).map_err(|e| RouterError::MalformedInput(e.to_string()))
}
