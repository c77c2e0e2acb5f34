pub use trellis_core::model::PeerId;

pub mod model {
    pub use trellis_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use trellis_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use trellis_client::*;
}
