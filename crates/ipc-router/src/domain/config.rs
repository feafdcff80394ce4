//! Router configuration.
//!
//! Process-wide settings fixed at subsystem construction. No persisted
//! state exists in this core.

use std::time::Duration;

/// Default maximum payload size per frame (64 KiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Default receive queue depth per port.
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 128;

/// Construction-time configuration for an [`crate::IpcRouter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Payloads longer than this fail `MessageTooLarge` before any
    /// transport involvement.
    pub max_frame_size: usize,
    /// Receive queue depth per port; enqueue beyond this fails `QueueFull`.
    pub max_queue_depth: usize,
    /// Deadline applied to blocking reads that pass no explicit timeout.
    /// `None` means wait indefinitely.
    pub default_read_timeout: Option<Duration>,
    /// When false the subsystem is compiled-out equivalent: every
    /// operation returns `Unsupported`.
    pub enabled: bool,
}

impl RouterConfig {
    #[must_use]
    pub fn with_max_frame_size(mut self, bytes: usize) -> Self {
        self.max_frame_size = bytes;
        self
    }

    #[must_use]
    pub fn with_max_queue_depth(mut self, depth: usize) -> Self {
        self.max_queue_depth = depth;
        self
    }

    #[must_use]
    pub fn with_default_read_timeout(mut self, timeout: Duration) -> Self {
        self.default_read_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            max_queue_depth: DEFAULT_MAX_QUEUE_DEPTH,
            default_read_timeout: None,
            enabled: true,
        }
    }
}
