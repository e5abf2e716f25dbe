//! Fan-out of session events to connected clients.
//!
//! Broadcasts go through one `tokio::sync::broadcast` channel so every
//! subscriber sees them in sequence order. Events addressed to a single
//! client go through that client's own unbounded queue. A subscriber that
//! falls further behind than the broadcast buffer is told it lagged and
//! must resync from a fresh snapshot.

use std::collections::HashMap;

use gavel_types::{AuctionEvent, ClientId, EventEnvelope, StateSnapshot};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, trace};

use crate::session::Dispatch;

pub struct BroadcastHub {
    events: broadcast::Sender<EventEnvelope>,
    clients: HashMap<ClientId, mpsc::UnboundedSender<AuctionEvent>>,
}

impl BroadcastHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            events,
            clients: HashMap::new(),
        }
    }

    /// Register a client. The caller pairs the receivers with a snapshot
    /// taken in the same step so nothing falls between them.
    pub fn connect(
        &mut self,
    ) -> (
        ClientId,
        broadcast::Receiver<EventEnvelope>,
        mpsc::UnboundedReceiver<AuctionEvent>,
    ) {
        let client = ClientId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.insert(client, tx);
        debug!(%client, clients = self.clients.len(), "client connected");
        (client, self.events.subscribe(), rx)
    }

    pub fn disconnect(&mut self, client: ClientId) {
        if self.clients.remove(&client).is_some() {
            debug!(%client, clients = self.clients.len(), "client disconnected");
        }
    }

    pub fn dispatch(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Broadcast(envelope) => {
                trace!(seq = envelope.seq, event = envelope.event.name(), "broadcast");
                // No subscribers is not an error.
                let _ = self.events.send(envelope);
            }
            Dispatch::Unicast { client, event } => {
                let Some(tx) = self.clients.get(&client) else {
                    trace!(%client, event = event.name(), "unicast to unknown client dropped");
                    return;
                };
                if tx.send(event).is_err() {
                    self.disconnect(client);
                }
            }
        }
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

/// What a connected client receives next.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// A broadcast, in sequence order.
    Event(EventEnvelope),
    /// An event addressed only to this client.
    Direct(AuctionEvent),
    /// This many broadcasts were dropped; take a fresh snapshot.
    Lagged(u64),
}

/// A client's end of the session: the snapshot it connected with plus its
/// event streams.
pub struct ClientConnection {
    pub client_id: ClientId,
    pub snapshot: StateSnapshot,
    events: broadcast::Receiver<EventEnvelope>,
    direct: mpsc::UnboundedReceiver<AuctionEvent>,
    direct_open: bool,
}

impl ClientConnection {
    pub(crate) fn new(
        client_id: ClientId,
        snapshot: StateSnapshot,
        events: broadcast::Receiver<EventEnvelope>,
        direct: mpsc::UnboundedReceiver<AuctionEvent>,
    ) -> Self {
        Self {
            client_id,
            snapshot,
            events,
            direct,
            direct_open: true,
        }
    }

    /// Wait for the next message. `None` once the session has shut down.
    pub async fn next(&mut self) -> Option<ClientMessage> {
        loop {
            tokio::select! {
                biased;
                direct = self.direct.recv(), if self.direct_open => match direct {
                    Some(event) => return Some(ClientMessage::Direct(event)),
                    None => self.direct_open = false,
                },
                event = self.events.recv() => return match event {
                    Ok(envelope) => Some(ClientMessage::Event(envelope)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(client = %self.client_id, skipped = n, "client lagged");
                        Some(ClientMessage::Lagged(n))
                    }
                    Err(broadcast::error::RecvError::Closed) => None,
                },
            }
        }
    }

    /// Next message if one is already queued.
    pub fn try_next(&mut self) -> Option<ClientMessage> {
        if let Ok(event) = self.direct.try_recv() {
            return Some(ClientMessage::Direct(event));
        }
        match self.events.try_recv() {
            Ok(envelope) => Some(ClientMessage::Event(envelope)),
            Err(broadcast::error::TryRecvError::Lagged(n)) => Some(ClientMessage::Lagged(n)),
            Err(_) => None,
        }
    }
}
