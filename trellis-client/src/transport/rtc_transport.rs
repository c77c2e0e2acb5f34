use crate::error::TransportError;
use crate::media::{LocalTrack, RemoteTrack, TrackKind};
use crate::transport::peer_transport::{PeerTransport, PeerTransportFactory, TransportEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use trellis_core::{IceCandidate, IceServerConfig, PeerId, SdpKind, SessionDescription};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// Builds one [`RtcTransport`] per remote peer, all sharing the same ICE
/// server configuration.
pub struct RtcTransportFactory {
    ice_servers: Vec<IceServerConfig>,
}

impl RtcTransportFactory {
    pub fn new(ice_servers: Option<Vec<IceServerConfig>>) -> Self {
        Self {
            ice_servers: ice_servers.unwrap_or_else(IceServerConfig::default_stun),
        }
    }
}

#[async_trait]
impl PeerTransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        remote_id: PeerId,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let transport = RtcTransport::new(remote_id, self.ice_servers.clone(), event_tx).await?;
        Ok(Arc::new(transport))
    }
}

/// `webrtc`-backed peer transport for one remote participant.
pub struct RtcTransport {
    remote_id: PeerId,
    pc: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    pub async fn new(
        remote_id: PeerId,
        ice_servers: Vec<IceServerConfig>,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| TransportError::Track(e.to_string()))?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| TransportError::Track(e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .into_iter()
                .map(|server| RTCIceServer {
                    urls: server.urls,
                    username: server.username.unwrap_or_default(),
                    credential: server.credential.unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let pc = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| TransportError::Sdp(e.to_string()))?,
        );

        // Trickle ICE: locally discovered candidates go out through the relay.
        let ice_tx = event_tx.clone();
        let ice_peer = remote_id.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let peer = ice_peer.clone();

            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                };
                let _ = tx
                    .send(TransportEvent::CandidateDiscovered(peer, candidate))
                    .await;
            })
        }));

        let track_tx = event_tx.clone();
        let track_peer = remote_id.clone();
        pc.on_track(Box::new(move |track: Arc<TrackRemote>, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let peer = track_peer.clone();

            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => TrackKind::Audio,
                    RTPCodecType::Video => TrackKind::Video,
                    RTPCodecType::Unspecified => return,
                };
                info!("Received remote {kind:?} track from {peer}");
                let remote = RemoteTrack {
                    id: track.id(),
                    kind,
                };
                let _ = tx.send(TransportEvent::TrackReceived(peer, remote)).await;
            })
        }));

        let state_tx = event_tx;
        let state_peer = remote_id.clone();
        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            let peer = state_peer.clone();

            Box::pin(async move {
                debug!("Peer connection state for {peer}: {state}");
                let _ = tx
                    .send(TransportEvent::StateChanged(peer, state.to_string()))
                    .await;
            })
        }));

        Ok(Self { remote_id, pc })
    }

    fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription, TransportError> {
        let rtc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp),
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp),
        };
        rtc.map_err(|e| TransportError::Sdp(e.to_string()))
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        let offer = self
            .pc
            .create_offer(None)
            .await
            .map_err(|e| TransportError::Sdp(e.to_string()))?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        let answer = self
            .pc
            .create_answer(None)
            .await
            .map_err(|e| TransportError::Sdp(e.to_string()))?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError> {
        self.pc
            .set_local_description(Self::to_rtc_description(desc)?)
            .await
            .map_err(|e| TransportError::Sdp(e.to_string()))
    }

    async fn rollback_local_description(&self) -> Result<(), TransportError> {
        // set_local_description refuses an empty-SDP rollback, so the
        // rollback has to carry the pending description's SDP.
        let Some(pending) = self.pc.local_description().await else {
            return Err(TransportError::Sdp(
                "no pending local description to roll back".to_string(),
            ));
        };

        let mut rollback = RTCSessionDescription::default();
        rollback.sdp_type = RTCSdpType::Rollback;
        rollback.sdp = pending.sdp;

        self.pc
            .set_local_description(rollback)
            .await
            .map_err(|e| TransportError::Sdp(e.to_string()))
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), TransportError> {
        self.pc
            .set_remote_description(Self::to_rtc_description(desc)?)
            .await
            .map_err(|e| TransportError::Sdp(e.to_string()))
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.pc
            .add_ice_candidate(init)
            .await
            .map_err(|e| TransportError::Ice(e.to_string()))
    }

    async fn attach_track(&self, track: &LocalTrack) -> Result<(), TransportError> {
        let capability = match track.kind {
            TrackKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                ..Default::default()
            },
            TrackKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
        };

        let local = Arc::new(TrackLocalStaticSample::new(
            capability,
            track.id.clone(),
            "trellis".to_owned(),
        ));

        self.pc
            .add_track(local)
            .await
            .map(|_| ())
            .map_err(|e| TransportError::Track(e.to_string()))
    }

    async fn close(&self) {
        if let Err(e) = self.pc.close().await {
            debug!("Error closing transport for {}: {e}", self.remote_id);
        }
    }
}
