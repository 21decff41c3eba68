//! Host bridge for vamiga-bridge
//!
//! `AmigaBridge` composes the five bridge components around a shared
//! engine handle:
//!
//! - [`ErrorChannel`]: captures the most recent failure
//! - [`ConfigDispatcher`]: validated option changes and reads
//! - [`AudioBridge`]: half-alternating stereo buffers
//! - [`ImageLoader`]: disk and firmware blobs
//! - [`EventRelay`]: ordered hand-off of engine messages to the host

pub mod audio;
pub mod bridge;
pub mod capture;
pub mod constants;
pub mod dispatcher;
pub mod loader;
pub mod relay;

pub use audio::AudioBridge;
pub use bridge::AmigaBridge;
pub use capture::{ErrorChannel, ErrorRecord};
pub use constants::{constant_table, constants_json, error_code_key, msg_type_key};
pub use dispatcher::ConfigDispatcher;
pub use loader::ImageLoader;
pub use relay::EventRelay;
