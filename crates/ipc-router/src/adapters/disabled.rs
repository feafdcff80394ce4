//! The configured-out router.
//!
//! When the subsystem is disabled, callers still get a [`RouterApi`]
//! object; every operation fails `Unsupported` (errno `-ENODEV`), the
//! runtime equivalent of the subsystem being compiled out.

use crate::domain::{
    Destination, InstanceMask, Message, PortAddress, PortHandle, PortName, RouterError,
};
use crate::ports::inbound::RouterApi;
use async_trait::async_trait;
use std::time::Duration;

/// Router stub for disabled configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRouter;

impl DisabledRouter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RouterApi for DisabledRouter {
    fn create_port(&self) -> Result<PortHandle, RouterError> {
        Err(RouterError::Unsupported)
    }

    async fn close_port(&self, _handle: &PortHandle) -> Result<(), RouterError> {
        Err(RouterError::Unsupported)
    }

    async fn register_name(&self, _handle: &PortHandle, _name: PortName) -> Result<(), RouterError> {
        Err(RouterError::Unsupported)
    }

    async fn send(
        &self,
        _src: &PortHandle,
        _dest: Destination,
        _payload: &[u8],
    ) -> Result<(), RouterError> {
        Err(RouterError::Unsupported)
    }

    async fn read(
        &self,
        _handle: &PortHandle,
        _timeout: Option<Duration>,
    ) -> Result<Message, RouterError> {
        Err(RouterError::Unsupported)
    }

    async fn try_read(&self, _handle: &PortHandle) -> Result<Message, RouterError> {
        Err(RouterError::Unsupported)
    }

    fn peek_size(&self, _handle: &PortHandle) -> Result<usize, RouterError> {
        Err(RouterError::Unsupported)
    }

    fn lookup_name(
        &self,
        _name: PortName,
        _mask: InstanceMask,
        _max_results: usize,
    ) -> Result<Vec<PortAddress>, RouterError> {
        Err(RouterError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_port_unsupported() {
        let router = DisabledRouter::new();
        let err = router.create_port().unwrap_err();
        assert_eq!(err, RouterError::Unsupported);
        assert_eq!(err.errno(), -19);
    }

    #[tokio::test]
    async fn test_lookup_unsupported() {
        let router = DisabledRouter::new();
        assert_eq!(
            router
                .lookup_name(PortName::new(1, 0), InstanceMask::ANY, 8)
                .unwrap_err(),
            RouterError::Unsupported
        );
    }
}
