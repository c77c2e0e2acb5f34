#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// Handle to a local capture track. Capture itself happens outside the
/// system; negotiations only ever attach these read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTrack {
    pub id: String,
    pub kind: TrackKind,
}

/// Incoming media track attributed to a remote peer.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTrack {
    pub id: String,
    pub kind: TrackKind,
}
