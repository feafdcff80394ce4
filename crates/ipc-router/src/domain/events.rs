//! Flow-control events delivered to port owners.
//!
//! The original callback-in-lock design is replaced by a typed event
//! channel per port: the router pushes onto an unbounded channel and never
//! waits on the consumer, so one slow port owner cannot stall delivery to
//! other ports.

use super::value_objects::PortAddress;
use tokio::sync::mpsc;
use tracing::debug;

/// Asynchronous notifications a port owner can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortEvent {
    /// A message was enqueued on this port's receive queue.
    ReadAvailable,
    /// The router handed a payload from this port off for transmission.
    WriteDone,
    /// A previously flow-controlled destination is writable again.
    ResumeTransmission {
        /// The port (or link endpoint) that drained.
        peer: PortAddress,
    },
}

/// Sending half of a port's event channel.
///
/// Emission is fire-and-forget: events for a dropped receiver are
/// discarded, never an error on the router's path.
#[derive(Debug, Clone)]
pub struct EventNotifier {
    tx: mpsc::UnboundedSender<PortEvent>,
}

impl EventNotifier {
    /// Create a notifier and the receiver handed to the port owner.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PortEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Push an event; best-effort, non-blocking.
    pub fn emit(&self, event: PortEvent) {
        if self.tx.send(event).is_err() {
            debug!(?event, "Port event dropped (owner gone)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{NodeId, PortId};

    #[test]
    fn test_emit_and_receive() {
        let (notifier, mut rx) = EventNotifier::channel();
        notifier.emit(PortEvent::ReadAvailable);
        notifier.emit(PortEvent::WriteDone);

        assert_eq!(rx.try_recv(), Ok(PortEvent::ReadAvailable));
        assert_eq!(rx.try_recv(), Ok(PortEvent::WriteDone));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_after_receiver_dropped_is_silent() {
        let (notifier, rx) = EventNotifier::channel();
        drop(rx);
        // Must not panic or block.
        notifier.emit(PortEvent::ResumeTransmission {
            peer: PortAddress::new(NodeId(1), PortId(2)),
        });
    }
}
