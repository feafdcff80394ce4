//! Port (trait) definitions at the subsystem boundary.
//!
//! Inbound: the API the user-facing front end drives. Outbound: the
//! transport collaborator that physically moves frames between nodes.

pub mod inbound;
pub mod outbound;

pub use inbound::RouterApi;
pub use outbound::{Transport, TransportError};
