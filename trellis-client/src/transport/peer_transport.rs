use crate::error::TransportError;
use crate::media::{LocalTrack, RemoteTrack};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use trellis_core::{IceCandidate, PeerId, SessionDescription};

/// Events a transport pushes back into the orchestrator's event loop.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A local network-reachability candidate was discovered; relay it to the
    /// remote peer.
    CandidateDiscovered(PeerId, IceCandidate),
    /// A remote media track arrived.
    TrackReceived(PeerId, RemoteTrack),
    /// Connection health changed. Observability only.
    StateChanged(PeerId, String),
}

/// Seam over the underlying peer-to-peer negotiation transport: an
/// RTCPeerConnection in production, a mock in tests.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError>;

    /// Discards the pending, not-yet-acknowledged local description.
    async fn rollback_local_description(&self) -> Result<(), TransportError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), TransportError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError>;

    async fn attach_track(&self, track: &LocalTrack) -> Result<(), TransportError>;

    async fn close(&self);
}

#[async_trait]
pub trait PeerTransportFactory: Send + Sync {
    async fn create(
        &self,
        remote_id: PeerId,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError>;
}
