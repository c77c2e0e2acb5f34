pub mod error;
pub mod media;
pub mod orchestrator;
pub mod transport;

pub use error::*;
pub use media::*;
pub use orchestrator::*;
pub use transport::*;
