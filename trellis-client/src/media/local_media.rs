use crate::error::MediaError;
use crate::media::track::{LocalTrack, TrackKind};
use async_trait::async_trait;
use tracing::info;

/// External capture collaborator (camera/microphone). Acquisition can fail
/// because a device is missing or permission was denied.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn capture(&self) -> Result<Vec<LocalTrack>, MediaError>;
}

/// The acquired capture tracks plus the mute/camera toggles. Negotiation
/// logic reads the tracks and never mutates them.
pub struct LocalMediaSession {
    tracks: Vec<LocalTrack>,
    muted: bool,
    video_disabled: bool,
}

impl LocalMediaSession {
    pub async fn acquire(source: &dyn MediaSource) -> Result<Self, MediaError> {
        let tracks = source.capture().await?;
        info!("Acquired {} local capture tracks", tracks.len());

        Ok(Self {
            tracks,
            muted: false,
            video_disabled: false,
        })
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    /// Flips the microphone toggle; returns the new muted state.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Flips the camera toggle; returns the new disabled state.
    pub fn toggle_video(&mut self) -> bool {
        self.video_disabled = !self.video_disabled;
        self.video_disabled
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_video_disabled(&self) -> bool {
        self.video_disabled
    }

    pub fn is_enabled(&self, kind: TrackKind) -> bool {
        match kind {
            TrackKind::Audio => !self.muted,
            TrackKind::Video => !self.video_disabled,
        }
    }

    /// Stops and drops the capture tracks.
    pub fn release(&mut self) {
        self.tracks.clear();
    }
}
