//! Domain layer: addressing, ports, queues, name resolution, events.
//!
//! Pure message-routing logic with no transport knowledge; the service
//! layer wires these types to the outbound ports.

pub mod config;
pub mod entities;
pub mod errors;
pub mod events;
pub mod port;
pub mod queue;
pub mod registry;
pub mod value_objects;

pub use config::{RouterConfig, DEFAULT_MAX_FRAME_SIZE, DEFAULT_MAX_QUEUE_DEPTH};
pub use entities::{CommMode, Message, PortCounters, PortStats};
pub use errors::RouterError;
pub use events::{EventNotifier, PortEvent};
pub use port::{PermissionCheck, PortHandle, PortState};
pub use queue::ReceiveQueue;
pub use registry::NameRegistry;
pub use value_objects::{
    Destination, InstanceId, InstanceMask, NodeId, PortAddress, PortId, PortName, ServiceId,
};
