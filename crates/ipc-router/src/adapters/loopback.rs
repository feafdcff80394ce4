//! In-process transport.
//!
//! Moves frames between two routers living in the same process by calling
//! the peer's demultiplexer directly. Used by the integration suite in
//! place of shared-memory or SMD links; the writable flag lets tests
//! exercise backpressure and resume-transmission.

use crate::domain::NodeId;
use crate::ports::outbound::{Transport, TransportError};
use crate::service::IpcRouter;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One direction of an in-process link.
pub struct LoopbackTransport {
    /// Node on the sending side; stamped on inbound frames at the peer.
    from: NodeId,
    peer: RwLock<Option<Arc<IpcRouter>>>,
    writable: AtomicBool,
}

impl LoopbackTransport {
    #[must_use]
    pub fn new(from: NodeId) -> Self {
        Self {
            from,
            peer: RwLock::new(None),
            writable: AtomicBool::new(true),
        }
    }

    /// Point this direction at the receiving router.
    pub fn attach(&self, peer: Arc<IpcRouter>) {
        *self.peer.write() = Some(peer);
    }

    /// Toggle backpressure for tests.
    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn transmit(&self, node: NodeId, frame: Vec<u8>) -> Result<(), TransportError> {
        if !self.writable() {
            return Err(TransportError::Backpressure);
        }
        let peer = self.peer.read().clone().ok_or(TransportError::LinkDown)?;
        if peer.node() != node {
            return Err(TransportError::LinkDown);
        }
        peer.on_frame_received(self.from, &frame)
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    fn writable(&self) -> bool {
        self.writable.load(Ordering::SeqCst)
    }
}

/// Wire two routers together with a loopback link in each direction.
/// Returns the two directions so tests can inject faults.
pub async fn connect(
    a: &Arc<IpcRouter>,
    b: &Arc<IpcRouter>,
) -> (Arc<LoopbackTransport>, Arc<LoopbackTransport>) {
    let a_to_b = Arc::new(LoopbackTransport::new(a.node()));
    let b_to_a = Arc::new(LoopbackTransport::new(b.node()));
    a_to_b.attach(b.clone());
    b_to_a.attach(a.clone());
    a.register_transport(b.node(), a_to_b.clone()).await;
    b.register_transport(a.node(), b_to_a.clone()).await;
    (a_to_b, b_to_a)
}
