//! AVTransport service operations
//!
//! Operations for loading media and controlling playback on a renderer.

mod pause;
mod play;
mod set_av_transport_uri;
mod stop;

pub use pause::{PauseOperation, PauseRequest};
pub use play::{PlayOperation, PlayRequest};
pub use set_av_transport_uri::{SetAVTransportURIOperation, SetAVTransportURIRequest};
pub use stop::{StopOperation, StopRequest};
