use dashmap::DashMap;
use std::collections::HashSet;
use tracing::info;
use trellis_core::{PeerId, RoomId};

/// Room membership table. Rooms come into existence on first join and vanish
/// when the last member leaves; absence of an entry is the empty state.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, HashSet<PeerId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Adds `peer` to `room`. Returns the other current members (the set to
    /// notify), or `None` if the peer was already a member.
    pub fn join(&self, room: &RoomId, peer: &PeerId) -> Option<Vec<PeerId>> {
        let mut members = self.rooms.entry(room.clone()).or_default();
        if !members.insert(peer.clone()) {
            return None;
        }
        info!("Peer {peer} joined room '{room}' ({} members)", members.len());
        Some(members.iter().filter(|m| *m != peer).cloned().collect())
    }

    /// Removes `peer` from `room`. Returns the remaining members (the set to
    /// notify), or `None` if the peer was not a member.
    pub fn leave(&self, room: &RoomId, peer: &PeerId) -> Option<Vec<PeerId>> {
        let remaining = {
            let mut members = self.rooms.get_mut(room)?;
            if !members.remove(peer) {
                return None;
            }
            members.iter().cloned().collect::<Vec<_>>()
        };

        if remaining.is_empty() {
            self.rooms.remove_if(room, |_, members| members.is_empty());
            info!("Room '{room}' is empty, dropping it");
        }

        Some(remaining)
    }

    pub fn members(&self, room: &RoomId) -> Vec<PeerId> {
        self.rooms
            .get(room)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
