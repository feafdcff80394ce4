//! Inbound (driving) port: the API exposed to the user-facing front end.
//!
//! One trait, two implementations: [`crate::IpcRouter`] when the subsystem
//! is enabled, [`crate::DisabledRouter`] when configured out, so callers
//! get `Unsupported` uniformly instead of a conditionally compiled
//! signature.

use crate::domain::{
    Destination, InstanceMask, Message, PortAddress, PortHandle, PortName, RouterError,
};
use async_trait::async_trait;
use std::time::Duration;

/// Operations exposed to front ends (socket-family shims and kernel
/// subsystems alike). Error codes map to negative integers via
/// [`RouterError::errno`].
#[async_trait]
pub trait RouterApi: Send + Sync {
    /// Allocate a new port with an empty queue and a fresh unique address.
    fn create_port(&self) -> Result<PortHandle, RouterError>;

    /// Unregister the port's name, then close it. Idempotent; wakes any
    /// blocked readers with a terminal result. Never fails on a live
    /// router.
    async fn close_port(&self, handle: &PortHandle) -> Result<(), RouterError>;

    /// Publish a (service, instance) name for the port and announce it to
    /// attached transports. A port holds at most one name.
    async fn register_name(&self, handle: &PortHandle, name: PortName) -> Result<(), RouterError>;

    /// Route a payload from `src` to a destination address or name.
    /// Local destinations are enqueued directly; remote ones are framed
    /// and handed to the owning transport.
    async fn send(
        &self,
        src: &PortHandle,
        dest: Destination,
        payload: &[u8],
    ) -> Result<(), RouterError>;

    /// Pop the head of the port's receive queue, suspending until a
    /// message arrives, the port closes, or the timeout (falling back to
    /// the configured default) elapses.
    async fn read(
        &self,
        handle: &PortHandle,
        timeout: Option<Duration>,
    ) -> Result<Message, RouterError>;

    /// Non-suspending read; `WouldBlock` when the queue is empty.
    async fn try_read(&self, handle: &PortHandle) -> Result<Message, RouterError>;

    /// Byte length of the head message without consuming it; 0 when the
    /// queue is empty.
    fn peek_size(&self, handle: &PortHandle) -> Result<usize, RouterError>;

    /// Resolve every registered port matching `name` under `mask`, up to
    /// `max_results`. Zero matches is an empty vector, not an error.
    fn lookup_name(
        &self,
        name: PortName,
        mask: InstanceMask,
        max_results: usize,
    ) -> Result<Vec<PortAddress>, RouterError>;
}
