use thiserror::Error;

/// Local capture failure. Fatal to the whole session: no negotiations are
/// created once this surfaces.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("media access denied: {0}")]
    AccessDenied(String),
}

/// Failure inside a single peer transport. Never escapes the negotiation it
/// belongs to.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("description error: {0}")]
    Sdp(String),

    #[error("candidate error: {0}")]
    Ice(String),

    #[error("track error: {0}")]
    Track(String),
}
