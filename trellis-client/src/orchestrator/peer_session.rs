use crate::error::TransportError;
use crate::media::RemoteTrack;
use crate::transport::PeerTransport;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};
use trellis_core::{IceCandidate, PeerId, SessionDescription};

/// Mirrors the negotiation protocol's local/remote description presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
}

/// Which side opened this negotiation. Fixed for the life of the session;
/// glare resolution may still make an initiator act as responder for one
/// offer/answer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Initiator,
    Responder,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Applied,
    Discarded,
}

/// Negotiation state machine for a single remote peer: description exchange,
/// glare resolution, candidate buffering and the incoming track sink.
pub struct PeerSession {
    remote_id: PeerId,
    role: NegotiationRole,
    state: SignalingState,
    remote_description_set: bool,
    pending_candidates: VecDeque<IceCandidate>,
    remote_tracks: Vec<RemoteTrack>,
    transport: Arc<dyn PeerTransport>,
}

impl PeerSession {
    pub fn new(remote_id: PeerId, role: NegotiationRole, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            remote_id,
            role,
            state: SignalingState::Stable,
            remote_description_set: false,
            pending_candidates: VecDeque::new(),
            remote_tracks: Vec::new(),
            transport,
        }
    }

    pub fn remote_id(&self) -> &PeerId {
        &self.remote_id
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn state(&self) -> SignalingState {
        self.state
    }

    pub fn pending_candidate_count(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Aggregated incoming tracks attributed to this peer.
    pub fn remote_tracks(&self) -> &[RemoteTrack] {
        &self.remote_tracks
    }

    pub fn push_remote_track(&mut self, track: RemoteTrack) {
        self.remote_tracks.push(track);
    }

    /// Initiator path: produce a local offer and apply it.
    pub async fn start_offer(&mut self) -> Result<SessionDescription, TransportError> {
        let offer = self.transport.create_offer().await?;
        self.transport.set_local_description(offer.clone()).await?;
        self.state = SignalingState::HaveLocalOffer;
        Ok(offer)
    }

    /// Responder path. A pending local offer means both sides offered at
    /// once; this side yields by rolling its own offer back, then applies the
    /// remote offer and produces the answer.
    pub async fn apply_remote_offer(
        &mut self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, TransportError> {
        if self.state != SignalingState::Stable {
            debug!(
                "Glare with {}: rolling back pending local description",
                self.remote_id
            );
            self.transport.rollback_local_description().await?;
            self.state = SignalingState::Stable;
        }

        self.transport.set_remote_description(offer).await?;
        self.state = SignalingState::HaveRemoteOffer;
        self.remote_description_set = true;
        self.flush_pending_candidates().await?;

        let answer = self.transport.create_answer().await?;
        self.transport.set_local_description(answer.clone()).await?;
        self.state = SignalingState::Stable;
        Ok(answer)
    }

    /// Applies a remote answer if one is actually pending. Duplicate or late
    /// answers are discarded so an already-advanced negotiation stays intact.
    pub async fn apply_remote_answer(
        &mut self,
        answer: SessionDescription,
    ) -> Result<AnswerOutcome, TransportError> {
        if self.state != SignalingState::HaveLocalOffer {
            warn!(
                "Discarding answer from {} in state {:?}",
                self.remote_id, self.state
            );
            return Ok(AnswerOutcome::Discarded);
        }

        self.transport.set_remote_description(answer).await?;
        self.state = SignalingState::Stable;
        self.remote_description_set = true;
        self.flush_pending_candidates().await?;
        Ok(AnswerOutcome::Applied)
    }

    /// Applies the candidate when a remote description is present, otherwise
    /// holds it until one is set.
    pub async fn apply_candidate(&mut self, candidate: IceCandidate) -> Result<(), TransportError> {
        if !self.remote_description_set {
            debug!(
                "Buffering candidate from {} until remote description is set",
                self.remote_id
            );
            self.pending_candidates.push_back(candidate);
            return Ok(());
        }
        self.transport.add_ice_candidate(candidate).await
    }

    async fn flush_pending_candidates(&mut self) -> Result<(), TransportError> {
        while let Some(candidate) = self.pending_candidates.pop_front() {
            self.transport.add_ice_candidate(candidate).await?;
        }
        Ok(())
    }

    /// Closes the transport and discards anything still buffered.
    pub async fn close(&mut self) {
        self.pending_candidates.clear();
        self.remote_tracks.clear();
        self.transport.close().await;
    }
}
