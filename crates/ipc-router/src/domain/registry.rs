//! Name resolution registry.
//!
//! Maps (service, instance) names to port addresses, local or remote.
//! Mutated under its own `RwLock`, independent of per-port locks, so name
//! traffic never serializes unrelated port traffic. Register/unregister are
//! idempotent and publish atomically: a lookup observes an entry fully or
//! not at all.

use super::value_objects::{InstanceMask, NodeId, PortAddress, PortName};
use parking_lot::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    name: PortName,
    addr: PortAddress,
}

/// Registry of named ports.
#[derive(Debug, Default)]
pub struct NameRegistry {
    /// Registration order is preserved, which keeps lookup results stable
    /// for a given snapshot.
    entries: RwLock<Vec<Registration>>,
}

impl NameRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a name for an address. Registering an identical pair again
    /// is a no-op.
    pub fn register(&self, name: PortName, addr: PortAddress) {
        let mut entries = self.entries.write();
        let reg = Registration { name, addr };
        if !entries.contains(&reg) {
            debug!(%name, %addr, "Name registered");
            entries.push(reg);
        }
    }

    /// Remove a (name, address) pair. Unregistering a non-existent pair is
    /// a no-op, never an error.
    pub fn unregister(&self, name: PortName, addr: PortAddress) {
        let mut entries = self.entries.write();
        if let Some(pos) = entries
            .iter()
            .position(|r| r.name == name && r.addr == addr)
        {
            entries.remove(pos);
            debug!(%name, %addr, "Name unregistered");
        }
    }

    /// Remove every name held by `addr`, returning the names removed.
    pub fn unregister_port(&self, addr: PortAddress) -> Vec<PortName> {
        let mut entries = self.entries.write();
        let mut removed = Vec::new();
        entries.retain(|r| {
            if r.addr == addr {
                removed.push(r.name);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Remove every registration that points at a given node, returning
    /// the pairs removed. Used when a remote transport restarts.
    pub fn unregister_node(&self, node: NodeId) -> Vec<(PortName, PortAddress)> {
        let mut entries = self.entries.write();
        let mut removed = Vec::new();
        entries.retain(|r| {
            if r.addr.node == node {
                removed.push((r.name, r.addr));
                false
            } else {
                true
            }
        });
        removed
    }

    /// Resolve all registered ports whose service matches and whose
    /// instance satisfies the mask, up to `max_results`. Zero matches is
    /// an empty vector, not an error.
    #[must_use]
    pub fn lookup(&self, name: PortName, mask: InstanceMask, max_results: usize) -> Vec<PortAddress> {
        self.entries
            .read()
            .iter()
            .filter(|r| {
                r.name.service == name.service && mask.matches(name.instance, r.name.instance)
            })
            .map(|r| r.addr)
            .take(max_results)
            .collect()
    }

    /// All current registrations, used to announce known services to a
    /// newly attached transport.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(PortName, PortAddress)> {
        self.entries.read().iter().map(|r| (r.name, r.addr)).collect()
    }
}
