//! Value objects for port addressing and naming.
//!
//! A [`PortAddress`] locates a live port (node + local id); a [`PortName`]
//! is a (service, instance) pair used only for registration and lookup.
//! These types carry no behavior beyond equality, ordering, and mask
//! matching, and are consumed by every other component.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a processing node (local processor or remote core).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Node-local port identifier.
///
/// Allocated from a monotonically increasing counter and never reused,
/// so a stale address can never alias a newer port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortId(pub u32);

/// Unique locator for a live port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortAddress {
    /// Node that owns the port.
    pub node: NodeId,
    /// Port id local to that node.
    pub port: PortId,
}

impl PortAddress {
    #[must_use]
    pub const fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node.0, self.port.0)
    }
}

/// Service identifier half of a port name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub u32);

/// Instance identifier half of a port name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

/// Mask applied to instance ids during lookup.
///
/// An entry matches when `(registered & mask) == (requested & mask)`,
/// so [`InstanceMask::ALL`] demands an exact instance and
/// [`InstanceMask::ANY`] matches every instance of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMask(pub u32);

impl InstanceMask {
    /// Exact-instance match.
    pub const ALL: Self = Self(u32::MAX);
    /// Match every instance of the service.
    pub const ANY: Self = Self(0);

    /// Whether `registered` satisfies this mask against `requested`.
    #[must_use]
    pub const fn matches(self, requested: InstanceId, registered: InstanceId) -> bool {
        (registered.0 & self.0) == (requested.0 & self.0)
    }
}

/// A (service, instance) pair used for dynamic lookup.
///
/// Distinct from a [`PortAddress`]: multiple ports may register distinct
/// instances of the same service, and a port holds zero or one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortName {
    pub service: ServiceId,
    pub instance: InstanceId,
}

impl PortName {
    #[must_use]
    pub const fn new(service: u32, instance: u32) -> Self {
        Self {
            service: ServiceId(service),
            instance: InstanceId(instance),
        }
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service.0, self.instance.0)
    }
}

/// Where a message should go: a concrete address or a resolvable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Deliver to this exact port.
    Address(PortAddress),
    /// Resolve the name first, then deliver to the first match.
    Name(PortName),
}
