//! Core types for vamiga-bridge
//!
//! This crate provides the foundational types shared by the engine and the
//! host bridge: the error taxonomy, the option / message / value constant
//! tables, the bridge settings and logging setup.

#[macro_use]
mod keyed;

pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod option;
pub mod values;

pub use config::{BridgeConfig, LogLevel};
pub use error::{
    AudioError, BridgeError, DriveError, EngineError, ErrorCode, MediaError, MemoryError,
    OptionError, Result,
};
pub use message::{MessageEvent, MsgType};
pub use option::{ConfigOption, Opt, OptScope};
pub use values::{
    AgnusRevision, BankMap, CiaRevision, CpuRevision, DeniseRevision, DriveMechanics,
    FloppyDriveType, Palette, RamInitPattern, RtcRevision, SerialPortDevice, UnmappedMemory,
    VideoFormat,
};
