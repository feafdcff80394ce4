//! Core entities: messages, communication-mode descriptors, and per-port
//! traffic counters.

use super::value_objects::{NodeId, PortAddress};
use std::sync::atomic::{AtomicU64, Ordering};

/// An immutable payload plus the sender's address.
///
/// Queued by value: the sender may reuse its buffer the moment `send`
/// returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Address of the sending port.
    pub src: PortAddress,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
}

impl Message {
    #[must_use]
    pub fn new(src: PortAddress, payload: Vec<u8>) -> Self {
        Self { src, payload }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Records which transport link (node + restart generation) last carried
/// traffic for a port. A generation change means the link restarted since
/// this port last used it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommMode {
    pub node: NodeId,
    pub generation: u64,
}

/// Snapshot of a port's traffic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortStats {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Lock-free traffic counters owned by a port.
#[derive(Debug, Default)]
pub struct PortCounters {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

impl PortCounters {
    pub fn record_sent(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_received(&self, bytes: usize) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> PortStats {
        PortStats {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }
}
