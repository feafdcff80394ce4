//! Bounded receive queue.
//!
//! Pure FIFO state machine; the owning port wraps it in a `parking_lot`
//! mutex so push/pop/close are individually atomic. Policy on overflow is
//! reject-new (never evict old), which preserves arrival order for
//! everything already accepted.

use super::entities::Message;
use super::errors::RouterError;
use super::value_objects::PortAddress;
use std::collections::VecDeque;

/// Per-port FIFO of inbound messages with flow-control bookkeeping.
#[derive(Debug)]
pub struct ReceiveQueue {
    items: VecDeque<Message>,
    capacity: usize,
    closed: bool,
    /// Senders that hit `QueueFull` and are owed a resume-transmission
    /// notification once the queue drains below the watermark.
    blocked_senders: Vec<PortAddress>,
}

impl ReceiveQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
            closed: false,
            blocked_senders: Vec::new(),
        }
    }

    /// Append to the tail.
    ///
    /// Fails `PortClosed` after [`close`](Self::close), `QueueFull` at
    /// capacity. Never reorders or evicts accepted messages.
    pub fn push(&mut self, message: Message) -> Result<(), RouterError> {
        if self.closed {
            return Err(RouterError::PortClosed);
        }
        if self.items.len() >= self.capacity {
            return Err(RouterError::QueueFull);
        }
        self.items.push_back(message);
        Ok(())
    }

    /// Pop the head, if any.
    pub fn pop(&mut self) -> Option<Message> {
        self.items.pop_front()
    }

    /// Byte length of the head message; 0 when empty.
    #[must_use]
    pub fn peek_size(&self) -> usize {
        self.items.front().map_or(0, Message::len)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Record a sender that was rejected with `QueueFull`, so it can be
    /// resumed once the queue drains. Duplicates are collapsed.
    pub fn note_blocked_sender(&mut self, sender: PortAddress) {
        if !self.blocked_senders.contains(&sender) {
            self.blocked_senders.push(sender);
        }
    }

    /// Senders to resume now, if the queue has drained below its watermark
    /// (half of capacity). Empty when nothing is owed.
    pub fn take_resumable_senders(&mut self) -> Vec<PortAddress> {
        if self.blocked_senders.is_empty() || self.items.len() > self.capacity / 2 {
            return Vec::new();
        }
        std::mem::take(&mut self.blocked_senders)
    }

    /// Transition to closed and release all queued messages.
    ///
    /// Idempotent; later pushes fail `PortClosed`.
    pub fn close(&mut self) -> Vec<Message> {
        self.closed = true;
        self.blocked_senders.clear();
        self.items.drain(..).collect()
    }
}
