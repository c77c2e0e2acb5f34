use crate::error::{MediaError, TransportError};
use crate::media::{LocalMediaSession, MediaSource, RemoteTrack};
use crate::orchestrator::peer_session::{NegotiationRole, PeerSession};
use crate::transport::{PeerTransportFactory, TransportEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use trellis_core::{ClientMessage, IceCandidate, PeerId, ServerMessage, SessionDescription};

/// Client-side session: owns the local media and one negotiation per remote
/// peer, and turns relay messages into the negotiation messages to send back.
///
/// The session arena admits insertion only when a negotiation is created and
/// removal only at teardown, so at most one entry exists per remote id.
pub struct Orchestrator {
    sessions: HashMap<PeerId, PeerSession>,
    media: LocalMediaSession,
    factory: Arc<dyn PeerTransportFactory>,
    event_tx: mpsc::Sender<TransportEvent>,
    self_id: Option<PeerId>,
}

impl Orchestrator {
    /// Acquires local media and prepares the session. Acquisition failure is
    /// fatal: it surfaces to the caller and no negotiation is ever created.
    pub async fn connect(
        source: &dyn MediaSource,
        factory: Arc<dyn PeerTransportFactory>,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, MediaError> {
        let media = LocalMediaSession::acquire(source).await?;

        Ok(Self {
            sessions: HashMap::new(),
            media,
            factory,
            event_tx,
            self_id: None,
        })
    }

    /// Single dispatch entry point for everything the relay delivers.
    /// Returns the messages to send back through the relay. A failure stays
    /// local to the peer it concerns: that negotiation is abandoned, the
    /// others continue untouched.
    pub async fn handle_message(&mut self, msg: ServerMessage) -> Vec<ClientMessage> {
        match msg {
            ServerMessage::Welcome { peer_id } => {
                info!("Assigned connection id {peer_id}");
                self.self_id = Some(peer_id);
                Vec::new()
            }
            ServerMessage::UserConnected { peer_id } => self.initiate(peer_id).await,
            ServerMessage::UserDisconnected { peer_id } => {
                self.teardown(&peer_id).await;
                Vec::new()
            }
            ServerMessage::Offer { from, offer } => self.handle_offer(from, offer).await,
            ServerMessage::Answer { from, answer } => {
                self.handle_answer(from, answer).await;
                Vec::new()
            }
            ServerMessage::IceCandidate { from, candidate } => {
                self.handle_candidate(from, candidate).await;
                Vec::new()
            }
        }
    }

    /// Starts an outbound negotiation toward a newly seen member.
    pub async fn initiate(&mut self, remote_id: PeerId) -> Vec<ClientMessage> {
        if self.sessions.contains_key(&remote_id) {
            warn!("Negotiation with {remote_id} already exists, ignoring initiate");
            return Vec::new();
        }

        let mut session = match self
            .create_session(remote_id.clone(), NegotiationRole::Initiator)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not create negotiation with {remote_id}: {e}");
                return Vec::new();
            }
        };

        match session.start_offer().await {
            Ok(offer) => {
                self.sessions.insert(remote_id.clone(), session);
                vec![ClientMessage::Offer {
                    to: remote_id,
                    offer,
                }]
            }
            Err(e) => {
                warn!("Abandoning negotiation with {remote_id}: {e}");
                session.close().await;
                Vec::new()
            }
        }
    }

    async fn handle_offer(&mut self, from: PeerId, offer: SessionDescription) -> Vec<ClientMessage> {
        if !self.sessions.contains_key(&from) {
            match self
                .create_session(from.clone(), NegotiationRole::Responder)
                .await
            {
                Ok(session) => {
                    self.sessions.insert(from.clone(), session);
                }
                Err(e) => {
                    warn!("Could not create negotiation with {from}: {e}");
                    return Vec::new();
                }
            }
        }

        let Some(session) = self.sessions.get_mut(&from) else {
            return Vec::new();
        };

        match session.apply_remote_offer(offer).await {
            Ok(answer) => vec![ClientMessage::Answer { to: from, answer }],
            Err(e) => {
                warn!("Abandoning negotiation with {from}: {e}");
                self.teardown(&from).await;
                Vec::new()
            }
        }
    }

    async fn handle_answer(&mut self, from: PeerId, answer: SessionDescription) {
        let Some(session) = self.sessions.get_mut(&from) else {
            warn!("Answer from {from} with no matching negotiation, discarding");
            return;
        };

        if let Err(e) = session.apply_remote_answer(answer).await {
            warn!("Abandoning negotiation with {from}: {e}");
            self.teardown(&from).await;
        }
    }

    async fn handle_candidate(&mut self, from: PeerId, candidate: IceCandidate) {
        let Some(session) = self.sessions.get_mut(&from) else {
            warn!("Candidate from {from} with no matching negotiation, discarding");
            return;
        };

        if let Err(e) = session.apply_candidate(candidate).await {
            warn!("Abandoning negotiation with {from}: {e}");
            self.teardown(&from).await;
        }
    }

    /// Closes and removes the negotiation with `remote_id`, dropping its
    /// buffered candidates and its remote tracks.
    pub async fn teardown(&mut self, remote_id: &PeerId) {
        if let Some(mut session) = self.sessions.remove(remote_id) {
            session.close().await;
            info!("Tore down negotiation with {remote_id}");
        }
    }

    /// Events surfacing from the per-peer transports.
    pub async fn handle_transport_event(&mut self, event: TransportEvent) -> Option<ClientMessage> {
        match event {
            TransportEvent::CandidateDiscovered(remote_id, candidate) => self
                .sessions
                .contains_key(&remote_id)
                .then_some(ClientMessage::IceCandidate {
                    to: remote_id,
                    candidate,
                }),
            TransportEvent::TrackReceived(remote_id, track) => {
                if let Some(session) = self.sessions.get_mut(&remote_id) {
                    session.push_remote_track(track);
                } else {
                    debug!("Track for unknown peer {remote_id}, dropping");
                }
                None
            }
            TransportEvent::StateChanged(remote_id, state) => {
                debug!("Connection state for {remote_id}: {state}");
                None
            }
        }
    }

    /// Leaves the room: closes every live negotiation and releases the local
    /// capture tracks. In-flight negotiation steps are abandoned with their
    /// transports. Returns the departure message to send.
    pub async fn leave(&mut self) -> ClientMessage {
        let remote_ids: Vec<_> = self.sessions.keys().cloned().collect();
        for remote_id in remote_ids {
            self.teardown(&remote_id).await;
        }
        self.media.release();
        ClientMessage::LeaveRoom
    }

    /// Self plus one per live negotiation.
    pub fn participant_count(&self) -> usize {
        1 + self.sessions.len()
    }

    pub fn self_id(&self) -> Option<&PeerId> {
        self.self_id.as_ref()
    }

    pub fn session(&self, remote_id: &PeerId) -> Option<&PeerSession> {
        self.sessions.get(remote_id)
    }

    pub fn media(&self) -> &LocalMediaSession {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut LocalMediaSession {
        &mut self.media
    }

    /// Incoming tracks for a remote peer, exposed once non-empty.
    pub fn remote_tracks(&self, remote_id: &PeerId) -> Option<&[RemoteTrack]> {
        self.sessions
            .get(remote_id)
            .map(|session| session.remote_tracks())
            .filter(|tracks| !tracks.is_empty())
    }

    async fn create_session(
        &self,
        remote_id: PeerId,
        role: NegotiationRole,
    ) -> Result<PeerSession, TransportError> {
        let transport = self
            .factory
            .create(remote_id.clone(), self.event_tx.clone())
            .await?;

        for track in self.media.tracks() {
            transport.attach_track(track).await?;
        }

        Ok(PeerSession::new(remote_id, role, transport))
    }
}
