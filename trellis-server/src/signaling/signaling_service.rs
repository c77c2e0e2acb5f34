use crate::room::RoomRegistry;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use trellis_core::{ClientMessage, PeerId, RoomId, ServerMessage};

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
    rooms_by_peer: DashMap<PeerId, RoomId>,
    registry: RoomRegistry,
}

/// Stateless router between connected peers. Holds the connection table and
/// the room registry; never inspects forwarded negotiation payloads.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                rooms_by_peer: DashMap::new(),
                registry: RoomRegistry::new(),
            }),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    /// Registers the outbound channel for a freshly attached connection and
    /// tells it the identifier it was assigned.
    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id.clone(), tx);
        self.send_to(
            &peer_id,
            &ServerMessage::Welcome {
                peer_id: peer_id.clone(),
            },
        );
    }

    /// Puts the peer into `room` and notifies the other members. A connection
    /// is in at most one room; joining a second room leaves the first.
    pub fn join_room(&self, peer_id: &PeerId, room: &RoomId) {
        let previous = self
            .inner
            .rooms_by_peer
            .insert(peer_id.clone(), room.clone());

        if let Some(old) = previous {
            if old != *room {
                self.broadcast_departure(peer_id, &old);
            }
        }

        if let Some(others) = self.inner.registry.join(room, peer_id) {
            for member in others {
                self.send_to(
                    &member,
                    &ServerMessage::UserConnected {
                        peer_id: peer_id.clone(),
                    },
                );
            }
        } else {
            debug!("Peer {peer_id} re-joined room '{room}'");
        }
    }

    /// Removes the peer from whatever room it is in and notifies the
    /// remaining members. Explicit leave-room and transport close both land
    /// here; the membership removal happens at most once.
    pub fn leave_room(&self, peer_id: &PeerId) {
        let Some((_, room)) = self.inner.rooms_by_peer.remove(peer_id) else {
            return;
        };
        self.broadcast_departure(peer_id, &room);
    }

    /// Transport-level departure: drops the connection and runs the same
    /// leave path as an explicit leave-room.
    pub fn disconnect(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
        self.leave_room(peer_id);
        info!("Peer {peer_id} disconnected");
    }

    /// Forwards a negotiation message to its target, tagged with the sender
    /// identifier. A missing target is dropped without notice: the peer may
    /// have just departed.
    pub fn relay(&self, from: &PeerId, msg: ClientMessage) {
        let (to, routed) = match msg {
            ClientMessage::Offer { to, offer } => (
                to,
                ServerMessage::Offer {
                    from: from.clone(),
                    offer,
                },
            ),
            ClientMessage::Answer { to, answer } => (
                to,
                ServerMessage::Answer {
                    from: from.clone(),
                    answer,
                },
            ),
            ClientMessage::IceCandidate { to, candidate } => (
                to,
                ServerMessage::IceCandidate {
                    from: from.clone(),
                    candidate,
                },
            ),
            other => {
                warn!("Peer {from} sent a non-routable message: {other:?}");
                return;
            }
        };

        self.send_to(&to, &routed);
    }

    pub fn is_connected(&self, peer_id: &PeerId) -> bool {
        self.inner.peers.contains_key(peer_id)
    }

    fn broadcast_departure(&self, peer_id: &PeerId, room: &RoomId) {
        let Some(remaining) = self.inner.registry.leave(room, peer_id) else {
            return;
        };
        for member in remaining {
            self.send_to(
                &member,
                &ServerMessage::UserDisconnected {
                    peer_id: peer_id.clone(),
                },
            );
        }
    }

    fn send_to(&self, peer_id: &PeerId, msg: &ServerMessage) {
        let Some(peer) = self.inner.peers.get(peer_id) else {
            debug!("Dropping message for absent peer {peer_id}");
            return;
        };
        match serde_json::to_string(msg) {
            Ok(json) => {
                if peer.send(Message::Text(json.into())).is_err() {
                    debug!("Outbound channel closed for {peer_id}");
                }
            }
            Err(e) => error!("Failed to serialize server message: {e}"),
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}
