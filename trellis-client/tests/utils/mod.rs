
pub use mock_media::*;
pub use mock_transport::*;
pub use signal_helpers::*;
