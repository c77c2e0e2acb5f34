mod orchestrator;
mod peer_session;

pub use orchestrator::*;
pub use peer_session::*;
