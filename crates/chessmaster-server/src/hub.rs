//! Relay hub: serializes every connection's events into the controller.
//!
//! One task owns the [`RelayController`] and processes events strictly one at a time, so
//! the game and the seats are never touched concurrently. Outbound messages go into
//! bounded per-connection queues with `try_send`; a slow client loses messages rather than
//! stalling everyone else.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use chessmaster_core::RulesEngine;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::ConnectionId;
use crate::relay::{Outbound, RelayController, Target};

/// Events flowing from transports into the hub.
#[derive(Debug)]
pub enum HubEvent {
    Connected {
        id: ConnectionId,
        outbound: mpsc::Sender<ServerMessage>,
    },
    Disconnected {
        id: ConnectionId,
    },
    Message {
        id: ConnectionId,
        message: ClientMessage,
    },
}

/// The hub task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("relay hub is no longer running")]
pub struct HubClosed;

/// Cloneable entry point for transports.
#[derive(Clone, Debug)]
pub struct HubHandle {
    events: mpsc::Sender<HubEvent>,
    next_id: Arc<AtomicU64>,
    outbound_queue: usize,
}

impl HubHandle {
    /// Register a new connection. Returns its id and the queue its messages arrive on.
    pub async fn connect(
        &self,
    ) -> Result<(ConnectionId, mpsc::Receiver<ServerMessage>), HubClosed> {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (outbound, inbox) = mpsc::channel(self.outbound_queue);
        self.submit(HubEvent::Connected { id, outbound }).await?;
        Ok((id, inbox))
    }

    pub async fn send(&self, id: ConnectionId, message: ClientMessage) -> Result<(), HubClosed> {
        self.submit(HubEvent::Message { id, message }).await
    }

    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), HubClosed> {
        self.submit(HubEvent::Disconnected { id }).await
    }

    async fn submit(&self, event: HubEvent) -> Result<(), HubClosed> {
        self.events.send(event).await.map_err(|_| HubClosed)
    }
}

/// Owner of the controller and the outbound queues.
pub struct RelayHub<E> {
    controller: RelayController<E>,
    connections: HashMap<ConnectionId, mpsc::Sender<ServerMessage>>,
    events: mpsc::Receiver<HubEvent>,
}

impl<E: RulesEngine> RelayHub<E> {
    /// Create a hub and its handle. Nothing runs until [`RelayHub::run`] is awaited.
    pub fn new(
        controller: RelayController<E>,
        inbound_queue: usize,
        outbound_queue: usize,
    ) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::channel(inbound_queue.max(1));
        let hub = Self {
            controller,
            connections: HashMap::new(),
            events: rx,
        };
        let handle = HubHandle {
            events: tx,
            next_id: Arc::new(AtomicU64::new(1)),
            outbound_queue: outbound_queue.max(1),
        };
        (hub, handle)
    }

    /// Process events until every [`HubHandle`] is dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle_event(event);
        }
        info!("Relay hub stopped");
    }

    pub fn handle_event(&mut self, event: HubEvent) {
        let outbound = match event {
            HubEvent::Connected { id, outbound } => {
                self.connections.insert(id, outbound);
                self.controller.on_connect(id)
            }
            HubEvent::Disconnected { id } => {
                if self.connections.remove(&id).is_none() {
                    return;
                }
                self.controller.on_disconnect(id)
            }
            HubEvent::Message { id, message } => {
                if !self.connections.contains_key(&id) {
                    debug!("Dropping message from unknown connection {}", id);
                    return;
                }
                self.controller.handle_message(id, message)
            }
        };
        self.deliver(outbound);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn deliver(&self, outbound: Vec<Outbound>) {
        for Outbound { target, message } in outbound {
            match target {
                Target::Connection(id) => {
                    if let Some(queue) = self.connections.get(&id) {
                        push(id, queue, message);
                    }
                }
                Target::All => {
                    for (&id, queue) in &self.connections {
                        push(id, queue, message.clone());
                    }
                }
            }
        }
    }
}

fn push(id: ConnectionId, queue: &mpsc::Sender<ServerMessage>, message: ServerMessage) {
    match queue.try_send(message) {
        Ok(()) => {}
        Err(TrySendError::Full(message)) => {
            warn!("Outbound queue full for {}, dropping {:?}", id, message);
        }
        // The transport is tearing down; its Disconnected event is on the way.
        Err(TrySendError::Closed(message)) => {
            warn!("Outbound queue closed for {}, dropping {:?}", id, message);
        }
    }
}
