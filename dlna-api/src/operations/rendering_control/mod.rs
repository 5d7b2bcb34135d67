//! RenderingControl service operations
//!
//! Operations for mute and volume on the `Master` channel. These only need
//! the RenderingControl control URL and are independent of playback.

mod mute;
mod volume;

pub use mute::{
    GetMuteOperation, GetMuteRequest, GetMuteResponse, SetMuteOperation, SetMuteRequest,
};
pub use volume::{
    GetVolumeOperation, GetVolumeRequest, GetVolumeResponse, SetVolumeOperation,
    SetVolumeRequest, MAX_VOLUME,
};
