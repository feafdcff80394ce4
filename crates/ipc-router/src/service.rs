//! # IPC Router Service
//!
//! The router/dispatcher: owns the port table, drives name resolution,
//! and moves messages between local queues and remote transports.
//!
//! ## Architecture
//!
//! Implements the inbound port [`RouterApi`] and depends on one outbound
//! port per remote node ([`Transport`]). Local delivery goes straight to
//! the destination port's receive queue; remote delivery serializes a
//! [`Frame`] and hands it to the owning link. Inbound frames arrive via
//! [`IpcRouter::on_frame_received`] and are demultiplexed to local ports.
//!
//! ## Thread Safety
//!
//! The service is shared across tasks via `Arc`. The port table, the name
//! registry, and each port's queue sit behind their own locks; none is
//! held across an await point.

use crate::domain::{
    CommMode, Destination, InstanceMask, Message, NodeId, PortAddress, PortEvent, PortHandle,
    PortId, PortName, PortState, RouterConfig, RouterError,
};
use crate::ports::inbound::RouterApi;
use crate::ports::outbound::{Transport, TransportError};
use crate::wire::{self, Frame};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// State of one attached transport link.
struct TransportLink {
    transport: Arc<dyn Transport>,
    /// Bumped on every restart; lets ports detect that the link they last
    /// used is gone.
    generation: u64,
    /// Set on restart, cleared when a transport re-registers. Sends to a
    /// stale link fail `LinkDown` instead of hanging.
    stale: bool,
    /// (source, destination) pairs flow-controlled by link backpressure,
    /// owed a resume-transmission once the link is writable again.
    flow_controlled: Vec<(PortAddress, PortAddress)>,
}

/// The IPC router core for one node.
pub struct IpcRouter {
    node: NodeId,
    config: RouterConfig,
    /// Next local port id. Monotonic, never reused.
    next_port_id: AtomicU32,
    /// Port table: lifecycle lock, held only for create/close/lookup of
    /// the `Arc`, never during data-path work.
    ports: RwLock<HashMap<PortAddress, Arc<PortState>>>,
    registry: crate::domain::NameRegistry,
    links: RwLock<HashMap<NodeId, TransportLink>>,
}

impl IpcRouter {
    #[must_use]
    pub fn new(node: NodeId, config: RouterConfig) -> Self {
        Self {
            node,
            config,
            next_port_id: AtomicU32::new(1),
            ports: RwLock::new(HashMap::new()),
            registry: crate::domain::NameRegistry::new(),
            links: RwLock::new(HashMap::new()),
        }
    }

    /// This router's node id.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Number of live local ports.
    #[must_use]
    pub fn port_count(&self) -> usize {
        self.ports.read().len()
    }

    /// Attach (or re-attach after restart) the transport serving `node`,
    /// then announce this node's registered names over it.
    pub async fn register_transport(&self, node: NodeId, transport: Arc<dyn Transport>) {
        let announce: Vec<(PortName, PortAddress)> = self
            .registry
            .snapshot()
            .into_iter()
            .filter(|(_, addr)| addr.node == self.node)
            .collect();

        {
            let mut links = self.links.write();
            let generation = links.get(&node).map_or(0, |l| l.generation + 1);
            links.insert(
                node,
                TransportLink {
                    transport: transport.clone(),
                    generation,
                    stale: false,
                    flow_controlled: Vec::new(),
                },
            );
            debug!(node = node.0, generation, "Transport registered");
        }

        for (name, addr) in announce {
            self.transmit_control(node, &transport, Frame::ServerAnnounce { name, addr })
                .await;
        }
    }

    /// A transport reported a restart: mark the link stale and purge every
    /// name registered behind it. Pending sends to the node fail
    /// `LinkDown` until the transport re-registers.
    pub fn handle_transport_restart(&self, node: NodeId) {
        let purged = self.registry.unregister_node(node);
        let mut links = self.links.write();
        if let Some(link) = links.get_mut(&node) {
            link.generation += 1;
            link.stale = true;
            link.flow_controlled.clear();
            warn!(
                node = node.0,
                generation = link.generation,
                purged_names = purged.len(),
                "Transport restarted; link marked stale"
            );
        }
    }

    /// A previously flow-controlled transport is writable again: resume
    /// every sender blocked on it.
    pub fn transport_writable(&self, node: NodeId) {
        let resumes = {
            let mut links = self.links.write();
            match links.get_mut(&node) {
                Some(link) => std::mem::take(&mut link.flow_controlled),
                None => return,
            }
        };
        for (src, dst) in resumes {
            if let Some(port) = self.local_port(src) {
                port.notify_event(PortEvent::ResumeTransmission { peer: dst });
            }
        }
    }

    /// Demultiplex one inbound frame from the transport serving `from`.
    ///
    /// Data frames for unknown, closed, or rejecting ports are dropped
    /// (logged, never an error to the transport); only undecodable bytes
    /// fail.
    pub fn on_frame_received(&self, from: NodeId, bytes: &[u8]) -> Result<(), RouterError> {
        let frame = match wire::decode(bytes) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(node = from.0, %err, "Dropping undecodable inbound frame");
                return Err(err);
            }
        };

        match frame {
            Frame::Data { src, dst, payload } => self.deliver_inbound(from, src, dst, payload),
            Frame::ServerAnnounce { name, addr } => {
                self.registry.register(name, addr);
            }
            Frame::ServerRemove { name, addr } => {
                self.registry.unregister(name, addr);
            }
            Frame::ResumeTx { dst, peer } => {
                if let Some(port) = self.local_port(dst) {
                    port.notify_event(PortEvent::ResumeTransmission { peer });
                }
            }
        }
        Ok(())
    }

    fn deliver_inbound(&self, from: NodeId, src: PortAddress, dst: PortAddress, payload: Vec<u8>) {
        if dst.node != self.node {
            debug!(%dst, "Dropping frame for foreign node (no forwarding)");
            return;
        }
        let Some(port) = self.local_port(dst) else {
            debug!(%dst, "Dropping frame for unknown port");
            return;
        };

        let message = Message::new(src, payload);
        if !port.permits(&message) {
            // Silent-drop semantics: the sender is not told.
            warn!(%src, %dst, "Inbound message rejected by permission hook");
            return;
        }

        match port.enqueue(message) {
            Ok(()) => {
                if let Some(generation) = self.link_generation(from) {
                    port.set_comm_mode(CommMode {
                        node: from,
                        generation,
                    });
                }
            }
            Err(RouterError::QueueFull) => {
                // Sender recorded for resume-transmission; message dropped.
                debug!(%src, %dst, "Receive queue full, remote sender flow-controlled");
            }
            Err(err) => {
                debug!(%src, %dst, %err, "Dropping inbound message");
            }
        }
    }

    fn local_port(&self, addr: PortAddress) -> Option<Arc<PortState>> {
        self.ports.read().get(&addr).cloned()
    }

    fn link_generation(&self, node: NodeId) -> Option<u64> {
        self.links.read().get(&node).map(|l| l.generation)
    }

    /// Best-effort control-frame transmission; failures are logged only.
    async fn transmit_control(&self, node: NodeId, transport: &Arc<dyn Transport>, frame: Frame) {
        let bytes = match wire::encode(&frame) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%err, "Failed to encode control frame");
                return;
            }
        };
        if let Err(err) = transport.transmit(node, bytes).await {
            debug!(node = node.0, %err, "Control frame not delivered");
        }
    }

    /// Broadcast a control frame over every non-stale link.
    async fn broadcast_control(&self, frame: Frame) {
        let targets: Vec<(NodeId, Arc<dyn Transport>)> = self
            .links
            .read()
            .iter()
            .filter(|(_, link)| !link.stale)
            .map(|(node, link)| (*node, link.transport.clone()))
            .collect();
        for (node, transport) in targets {
            self.transmit_control(node, &transport, frame.clone()).await;
        }
    }

    fn resolve(&self, dest: Destination) -> Result<PortAddress, RouterError> {
        match dest {
            Destination::Address(addr) => Ok(addr),
            Destination::Name(name) => self
                .registry
                .lookup(name, InstanceMask::ALL, 1)
                .first()
                .copied()
                .ok_or(RouterError::NoRoute),
        }
    }

    async fn send_local(
        &self,
        src: &Arc<PortState>,
        dst: PortAddress,
        payload: &[u8],
    ) -> Result<(), RouterError> {
        let Some(dest) = self.local_port(dst) else {
            return Err(RouterError::NoRoute);
        };

        let message = Message::new(src.address(), payload.to_vec());
        if !dest.permits(&message) {
            // Deliberate: permission drops are invisible to the sender.
            warn!(src = %src.address(), %dst, "Message dropped by permission hook");
            src.record_sent(payload.len());
            src.notify_event(PortEvent::WriteDone);
            return Ok(());
        }

        dest.enqueue(message)?;
        src.record_sent(payload.len());
        src.notify_event(PortEvent::WriteDone);
        Ok(())
    }

    async fn send_remote(
        &self,
        src: &Arc<PortState>,
        dst: PortAddress,
        payload: &[u8],
    ) -> Result<(), RouterError> {
        let (transport, generation) = {
            let links = self.links.read();
            let link = links.get(&dst.node).ok_or(RouterError::NoRoute)?;
            if link.stale {
                return Err(RouterError::LinkDown);
            }
            (link.transport.clone(), link.generation)
        };

        if !transport.writable() {
            self.note_flow_controlled(src.address(), dst);
            return Err(RouterError::QueueFull);
        }

        let frame = Frame::Data {
            src: src.address(),
            dst,
            payload: payload.to_vec(),
        };
        let bytes = wire::encode(&frame)?;

        match transport.transmit(dst.node, bytes).await {
            Ok(()) => {
                src.set_comm_mode(CommMode {
                    node: dst.node,
                    generation,
                });
                src.record_sent(payload.len());
                src.notify_event(PortEvent::WriteDone);
                Ok(())
            }
            Err(TransportError::Backpressure) => {
                self.note_flow_controlled(src.address(), dst);
                Err(RouterError::QueueFull)
            }
            Err(err) => {
                warn!(node = dst.node.0, %err, "Transport failed; marking link stale");
                if let Some(link) = self.links.write().get_mut(&dst.node) {
                    link.stale = true;
                }
                Err(RouterError::LinkDown)
            }
        }
    }

    fn note_flow_controlled(&self, src: PortAddress, dst: PortAddress) {
        if let Some(link) = self.links.write().get_mut(&dst.node) {
            if !link.flow_controlled.contains(&(src, dst)) {
                link.flow_controlled.push((src, dst));
            }
        }
    }

    /// Deliver resume-transmission to every sender released by a drained
    /// queue: local ones get an event, remote ones a `ResumeTx` frame.
    async fn dispatch_resume(&self, reader: PortAddress, senders: Vec<PortAddress>) {
        for sender in senders {
            if sender.node == self.node {
                if let Some(port) = self.local_port(sender) {
                    port.notify_event(PortEvent::ResumeTransmission { peer: reader });
                }
                continue;
            }
            let transport = {
                let links = self.links.read();
                links
                    .get(&sender.node)
                    .filter(|l| !l.stale)
                    .map(|l| l.transport.clone())
            };
            if let Some(transport) = transport {
                self.transmit_control(
                    sender.node,
                    &transport,
                    Frame::ResumeTx {
                        dst: sender,
                        peer: reader,
                    },
                )
                .await;
            }
        }
    }
}

#[async_trait]
impl RouterApi for IpcRouter {
    fn create_port(&self) -> Result<PortHandle, RouterError> {
        // Ids are never reused, so exhaustion latches: the counter parks
        // at MAX instead of wrapping into live addresses.
        let mut id = self.next_port_id.load(Ordering::Relaxed);
        loop {
            if id == u32::MAX {
                return Err(RouterError::ResourceExhausted);
            }
            match self.next_port_id.compare_exchange_weak(
                id,
                id + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => id = current,
            }
        }
        let addr = PortAddress::new(self.node, PortId(id));
        let (state, events) = PortState::new(addr, self.config.max_queue_depth);
        self.ports.write().insert(addr, state.clone());
        debug!(%addr, "Port created");
        Ok(PortHandle::new(state, events))
    }

    async fn close_port(&self, handle: &PortHandle) -> Result<(), RouterError> {
        let addr = handle.address();

        // Unregister before close so resolve-then-deliver cannot race a
        // closing port.
        let names = self.registry.unregister_port(addr);
        handle.state().clear_name();
        for name in names {
            self.broadcast_control(Frame::ServerRemove { name, addr }).await;
        }

        handle.state().close();
        self.ports.write().remove(&addr);
        debug!(%addr, "Port closed");
        Ok(())
    }

    async fn register_name(&self, handle: &PortHandle, name: PortName) -> Result<(), RouterError> {
        if handle.is_closed() {
            return Err(RouterError::PortClosed);
        }
        let addr = handle.address();
        handle.state().set_name(name)?;
        self.registry.register(name, addr);
        self.broadcast_control(Frame::ServerAnnounce { name, addr }).await;
        Ok(())
    }

    async fn send(
        &self,
        src: &PortHandle,
        dest: Destination,
        payload: &[u8],
    ) -> Result<(), RouterError> {
        if src.is_closed() {
            return Err(RouterError::PortClosed);
        }
        if payload.len() > self.config.max_frame_size {
            return Err(RouterError::MessageTooLarge {
                len: payload.len(),
                max: self.config.max_frame_size,
            });
        }

        let dst = self.resolve(dest)?;
        if dst.node == self.node {
            self.send_local(src.state(), dst, payload).await
        } else {
            self.send_remote(src.state(), dst, payload).await
        }
    }

    async fn read(
        &self,
        handle: &PortHandle,
        timeout: Option<Duration>,
    ) -> Result<Message, RouterError> {
        let deadline = timeout
            .or(self.config.default_read_timeout)
            .map(|t| Instant::now() + t);
        let (message, resume) = handle.state().pop_wait(deadline).await?;
        self.dispatch_resume(handle.address(), resume).await;
        Ok(message)
    }

    async fn try_read(&self, handle: &PortHandle) -> Result<Message, RouterError> {
        let (message, resume) = handle.state().try_pop()?;
        self.dispatch_resume(handle.address(), resume).await;
        Ok(message)
    }

    fn peek_size(&self, handle: &PortHandle) -> Result<usize, RouterError> {
        handle.state().peek_size()
    }

    fn lookup_name(
        &self,
        name: PortName,
        mask: InstanceMask,
        max_results: usize,
    ) -> Result<Vec<PortAddress>, RouterError> {
        if max_results == 0 {
            return Err(RouterError::MalformedInput(
                "max_results must be non-zero".into(),
            ));
        }
        Ok(self.registry.lookup(name, mask, max_results))
    }
}

/// Build the router selected by configuration: the real core when
/// enabled, the always-`Unsupported` stub otherwise.
#[must_use]
pub fn build_router(node: NodeId, config: RouterConfig) -> Arc<dyn RouterApi> {
    if config.enabled {
        Arc::new(IpcRouter::new(node, config))
    } else {
        Arc::new(crate::adapters::DisabledRouter::new())
    }
}
