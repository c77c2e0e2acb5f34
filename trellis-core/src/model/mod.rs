mod peer;
mod room;
mod signaling;

pub use peer::*;
pub use room::*;
pub use signaling::*;
