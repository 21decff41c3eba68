//! Shared stereo audio buffers for vamiga-bridge
//!
//! The bridge writes one half of each channel buffer while the host plays
//! the other half.

pub mod buffer;
pub mod stream;

pub use buffer::{ChannelBuffer, Half};
pub use stream::StereoStream;

/// Audio sample format
pub type Sample = f32;

/// Default number of samples per channel buffer
pub const DEFAULT_CAPACITY: usize = 2048;
