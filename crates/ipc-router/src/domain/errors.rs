//! Router error taxonomy.
//!
//! Every failure is returned synchronously to the caller; nothing is raised
//! asynchronously. The front-end boundary (socket-family shims and friends)
//! speaks negative integer codes, so each variant maps 1:1 to an errno via
//! [`RouterError::errno`].

use thiserror::Error;

/// Errors surfaced by the IPC router core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    /// Allocation failure (port id space or memory exhausted).
    #[error("Resource exhausted")]
    ResourceExhausted,

    /// Operation on a port that has been torn down.
    #[error("Port closed")]
    PortClosed,

    /// Receive queue at configured depth; message rejected, nothing evicted.
    #[error("Receive queue full")]
    QueueFull,

    /// Non-blocking read with nothing available.
    #[error("Would block")]
    WouldBlock,

    /// Name resolved to zero candidates, or the address is unknown.
    #[error("No route to destination")]
    NoRoute,

    /// Destination transport is stale or restarted.
    #[error("Link down")]
    LinkDown,

    /// Payload exceeds the configured maximum frame size.
    #[error("Message too large: {len} bytes exceeds limit of {max}")]
    MessageTooLarge { len: usize, max: usize },

    /// Inbound message rejected by the destination's permission hook.
    /// Internal: the router absorbs this silently rather than propagating
    /// it to the sender.
    #[error("Permission denied")]
    PermissionDenied,

    /// Subsystem disabled at configuration time; all operations fail this way.
    #[error("IPC router unsupported on this configuration")]
    Unsupported,

    /// Blocking read deadline elapsed before a message arrived.
    #[error("Read timed out")]
    TimedOut,

    /// Malformed caller input or an undecodable inbound frame.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl RouterError {
    /// Negative errno-style code for the user-facing front end.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::ResourceExhausted => -12,        // ENOMEM
            Self::PortClosed => -108,              // ESHUTDOWN
            Self::QueueFull => -105,               // ENOBUFS
            Self::WouldBlock => -11,               // EAGAIN
            Self::NoRoute => -113,                 // EHOSTUNREACH
            Self::LinkDown => -100,                // ENETDOWN
            Self::MessageTooLarge { .. } => -90,   // EMSGSIZE
            Self::PermissionDenied => -1,          // EPERM
            Self::Unsupported => -19,              // ENODEV
            Self::TimedOut => -110,                // ETIMEDOUT
            Self::MalformedInput(_) => -22,        // EINVAL
        }
    }
}
