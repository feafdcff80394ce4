//! The port entity: an addressable endpoint with a receive queue,
//! lifecycle state, flow-control event channel, and traffic counters.
//!
//! Lock discipline: the lifecycle mutex is distinct from the queue mutex,
//! and close acquires them in a fixed order (lifecycle, then queue) so it
//! can never deadlock against a concurrent send or read. Blocked readers
//! park on a per-port `Notify`, so an enqueue wakes at most this port's
//! waiters.

use super::entities::{CommMode, Message, PortCounters, PortStats};
use super::errors::RouterError;
use super::events::{EventNotifier, PortEvent};
use super::queue::ReceiveQueue;
use super::value_objects::{PortAddress, PortName};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Predicate invoked by the router before enqueuing an inbound message.
/// Rejection drops the message silently.
pub type PermissionCheck = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Active,
    Closed,
}

/// Shared state of a port. The router's table holds a non-owning
/// `Arc<PortState>`; exclusive ownership stays with the creator's
/// [`PortHandle`] until close.
pub struct PortState {
    address: PortAddress,
    lifecycle: Mutex<Lifecycle>,
    queue: Mutex<ReceiveQueue>,
    rx_notify: Notify,
    events: EventNotifier,
    counters: PortCounters,
    permission: RwLock<Option<PermissionCheck>>,
    comm_mode: Mutex<Option<CommMode>>,
    name: Mutex<Option<PortName>>,
}

impl PortState {
    /// Create port state plus the event receiver handed to the owner.
    pub fn new(address: PortAddress, queue_depth: usize) -> (Arc<Self>, UnboundedReceiver<PortEvent>) {
        let (events, rx) = EventNotifier::channel();
        let state = Arc::new(Self {
            address,
            lifecycle: Mutex::new(Lifecycle::Active),
            queue: Mutex::new(ReceiveQueue::new(queue_depth)),
            rx_notify: Notify::new(),
            events,
            counters: PortCounters::default(),
            permission: RwLock::new(None),
            comm_mode: Mutex::new(None),
            name: Mutex::new(None),
        });
        (state, rx)
    }

    #[must_use]
    pub fn address(&self) -> PortAddress {
        self.address
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.lifecycle.lock() == Lifecycle::Closed
    }

    #[must_use]
    pub fn stats(&self) -> PortStats {
        self.counters.snapshot()
    }

    pub fn record_sent(&self, bytes: usize) {
        self.counters.record_sent(bytes);
    }

    /// Append an inbound message, wake one blocked reader, and fire
    /// `ReadAvailable`. On `QueueFull` the sender is remembered for a
    /// later resume-transmission.
    pub fn enqueue(&self, message: Message) -> Result<(), RouterError> {
        let src = message.src;
        let len = message.len();
        {
            let mut queue = self.queue.lock();
            if let Err(err) = queue.push(message) {
                if err == RouterError::QueueFull {
                    queue.note_blocked_sender(src);
                }
                return Err(err);
            }
        }
        self.counters.record_received(len);
        self.rx_notify.notify_one();
        self.events.emit(PortEvent::ReadAvailable);
        Ok(())
    }

    /// Pop the head without blocking.
    ///
    /// Returns the message plus any senders that may now resume. Empty
    /// queue yields `WouldBlock`, closed port `PortClosed`.
    pub fn try_pop(&self) -> Result<(Message, Vec<PortAddress>), RouterError> {
        let mut queue = self.queue.lock();
        match queue.pop() {
            Some(message) => {
                let resume = queue.take_resumable_senders();
                Ok((message, resume))
            }
            None if queue.is_closed() => Err(RouterError::PortClosed),
            None => Err(RouterError::WouldBlock),
        }
    }

    /// Pop the head, suspending until a message arrives, the port closes,
    /// or `deadline` elapses.
    pub async fn pop_wait(
        &self,
        deadline: Option<Instant>,
    ) -> Result<(Message, Vec<PortAddress>), RouterError> {
        loop {
            // Register for wakeup before checking the queue, so an enqueue
            // between the check and the await is not lost.
            let notified = self.rx_notify.notified();
            tokio::pin!(notified);

            match self.try_pop() {
                Err(RouterError::WouldBlock) => {}
                other => return other,
            }

            match deadline {
                Some(at) => {
                    if tokio::time::timeout_at(at, notified).await.is_err() {
                        return Err(RouterError::TimedOut);
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Byte length of the head message without consuming it.
    pub fn peek_size(&self) -> Result<usize, RouterError> {
        let queue = self.queue.lock();
        if queue.is_closed() {
            return Err(RouterError::PortClosed);
        }
        Ok(queue.peek_size())
    }

    /// Transition to closed: drain the queue and wake every blocked
    /// reader. Returns false if already closed (idempotent).
    pub fn close(&self) -> bool {
        {
            let mut lifecycle = self.lifecycle.lock();
            if *lifecycle == Lifecycle::Closed {
                return false;
            }
            *lifecycle = Lifecycle::Closed;
            // Queue lock taken after lifecycle lock, matching the order
            // used everywhere else.
            self.queue.lock().close();
        }
        self.rx_notify.notify_waiters();
        true
    }

    pub fn set_permission_check(&self, check: PermissionCheck) {
        *self.permission.write() = Some(check);
    }

    /// Whether the destination accepts this inbound message. Defaults to
    /// allow when no hook is installed.
    #[must_use]
    pub fn permits(&self, message: &Message) -> bool {
        match self.permission.read().as_ref() {
            Some(check) => check(message),
            None => true,
        }
    }

    /// Fire a flow-control event at the owner. No-op once closed: a closed
    /// port never receives further notifications.
    pub fn notify_event(&self, event: PortEvent) {
        if self.is_closed() {
            return;
        }
        self.events.emit(event);
    }

    #[must_use]
    pub fn comm_mode(&self) -> Option<CommMode> {
        *self.comm_mode.lock()
    }

    pub fn set_comm_mode(&self, mode: CommMode) {
        *self.comm_mode.lock() = Some(mode);
    }

    #[must_use]
    pub fn name(&self) -> Option<PortName> {
        *self.name.lock()
    }

    /// Record the registered name. A port holds zero or one name;
    /// re-registering the same name is a no-op.
    pub fn set_name(&self, name: PortName) -> Result<(), RouterError> {
        let mut slot = self.name.lock();
        match *slot {
            Some(existing) if existing == name => Ok(()),
            Some(existing) => Err(RouterError::MalformedInput(format!(
                "port already registered as {existing}"
            ))),
            None => {
                *slot = Some(name);
                Ok(())
            }
        }
    }

    pub fn clear_name(&self) {
        *self.name.lock() = None;
    }
}

/// Owner-side handle to a port.
///
/// Created by the router and exclusively owned by the caller until closed.
/// Dropping the handle closes the port locally; `close_port` on the router
/// additionally unregisters its name and removes it from the routing table.
pub struct PortHandle {
    state: Arc<PortState>,
    events: UnboundedReceiver<PortEvent>,
}

impl PortHandle {
    pub(crate) fn new(state: Arc<PortState>, events: UnboundedReceiver<PortEvent>) -> Self {
        Self { state, events }
    }

    pub(crate) fn state(&self) -> &Arc<PortState> {
        &self.state
    }

    #[must_use]
    pub fn address(&self) -> PortAddress {
        self.state.address()
    }

    #[must_use]
    pub fn name(&self) -> Option<PortName> {
        self.state.name()
    }

    #[must_use]
    pub fn stats(&self) -> PortStats {
        self.state.stats()
    }

    /// Which transport link (node + generation) last carried this port's
    /// traffic, if any.
    #[must_use]
    pub fn comm_mode(&self) -> Option<CommMode> {
        self.state.comm_mode()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Install the permission hook consulted before every inbound enqueue.
    pub fn set_permission_check<F>(&self, check: F)
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.state.set_permission_check(Arc::new(check));
    }

    /// Await the next flow-control event. `None` once the port is gone.
    pub async fn next_event(&mut self) -> Option<PortEvent> {
        self.events.recv().await
    }

    /// Non-blocking event poll.
    pub fn try_next_event(&mut self) -> Option<PortEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for PortHandle {
    fn drop(&mut self) {
        self.state.close();
    }
}

// Manual impl: the event receiver is not Debug.
impl fmt::Debug for PortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortHandle")
            .field("address", &self.state.address())
            .field("closed", &self.state.is_closed())
            .finish_non_exhaustive()
    }
}
