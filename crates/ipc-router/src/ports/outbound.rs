//! Outbound (driven) ports.
//!
//! The router never knows how frames physically move; it hands serialized
//! frames to a [`Transport`] keyed by destination node. Shared memory,
//! SMD, HSIC and friends all live behind this seam.

use crate::domain::NodeId;
use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The link is unusable (disconnected, restarting).
    #[error("Transport link down")]
    LinkDown,

    /// The link is momentarily unwritable; retry after the router's
    /// resume-transmission notification.
    #[error("Transport backpressure")]
    Backpressure,

    /// Underlying I/O failure.
    #[error("Transport I/O error: {0}")]
    Io(String),
}

/// A frame mover between this node and its peers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand a serialized frame to the link serving `node`.
    async fn transmit(&self, node: NodeId, frame: Vec<u8>) -> Result<(), TransportError>;

    /// Whether the link can currently accept frames. A false answer makes
    /// the router fail sends with backpressure instead of queueing.
    fn writable(&self) -> bool {
        true
    }
}
