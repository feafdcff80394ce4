//! # IPC Router - Message Passing Between Execution Contexts
//!
//! Lets independent execution contexts (processes, kernel subsystems,
//! remote processor cores) exchange discrete messages through named,
//! dynamically-resolvable ports, without senders knowing receivers'
//! physical location.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  send()   ┌──────────────┐  transmit()  ┌───────────┐
//! │ Port A   │ ────────▶ │  IpcRouter   │ ───────────▶ │ Transport │
//! └──────────┘           │  (dispatch)  │              └───────────┘
//!                        └──────┬───────┘                    │
//!       read() ◀─ receive queue ┘        on_frame_received() ┘
//! ```
//!
//! - **Local delivery:** straight into the destination port's bounded
//!   receive queue, waking its blocked readers.
//! - **Remote delivery:** resolved by node, framed, and handed to the
//!   owning [`Transport`].
//! - **Name resolution:** (service, instance) pairs map to addresses via
//!   the registry; remote registrations arrive over control frames.
//! - **Flow control:** `ReadAvailable`, `WriteDone`, and
//!   `ResumeTransmission` events on a per-port channel that never blocks
//!   the router.
//!
//! ## Capability gating
//!
//! [`build_router`] returns the real [`IpcRouter`] or a
//! [`DisabledRouter`] whose every operation fails
//! [`RouterError::Unsupported`], so front ends handle a disabled
//! subsystem identically to a runtime failure.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod wire;

// Re-export main types
pub use adapters::{DisabledRouter, LoopbackTransport};
pub use domain::{
    CommMode, Destination, InstanceId, InstanceMask, Message, NodeId, PortAddress, PortEvent,
    PortHandle, PortId, PortName, PortStats, RouterConfig, RouterError, ServiceId,
    DEFAULT_MAX_FRAME_SIZE, DEFAULT_MAX_QUEUE_DEPTH,
};
pub use ports::{RouterApi, Transport, TransportError};
pub use service::{build_router, IpcRouter};
