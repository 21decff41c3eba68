//! Error types for vamiga-bridge

use crate::option::Opt;
use thiserror::Error;

/// Main error type for every fallible bridge and engine operation
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Option error: {0}")]
    Option(#[from] OptionError),

    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid settings: {0}")]
    Settings(String),
}

/// Configuration option errors (validation failures)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("Unknown option: {0}")]
    Unknown(i64),

    #[error("Invalid index {index} for {option}")]
    InvalidIndex { option: Opt, index: i64 },

    #[error("{0} does not take an index")]
    NotIndexed(Opt),

    #[error("Invalid argument {value} for {option}")]
    InvalidArgument { option: Opt, value: i64 },

    #[error("{0} is locked while the machine is powered on")]
    Locked(Opt),
}

/// Floppy drive errors (resource-state failures)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriveError {
    #[error("No such drive: df{0}")]
    NoSuchDrive(usize),

    #[error("Drive df{0} is not connected")]
    NotConnected(usize),
}

/// Memory subsystem errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("No Kickstart ROM installed")]
    RomMissing,

    #[error("Invalid Kickstart ROM: {0}")]
    InvalidRom(String),

    #[error("Invalid extension ROM: {0}")]
    InvalidExt(String),
}

/// Disk and firmware image decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Blob is not a valid {0} image")]
    TypeMismatch(&'static str),

    #[error("Corrupted image: {0}")]
    Corrupted(String),

    #[error("Unsupported image: {0}")]
    Unsupported(String),

    #[error("ROM image is encrypted")]
    EncryptedRom,

    #[error("Disk full: {needed} blocks needed, {available} available")]
    DiskFull { needed: usize, available: usize },
}

/// Audio stream errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("Invalid buffer offset {offset} (expected 0 or {half})")]
    InvalidOffset { offset: usize, half: usize },

    #[error("Channel buffers have not been allocated")]
    NotAllocated,

    #[error("Invalid buffer capacity: {0}")]
    InvalidCapacity(usize),
}

/// Engine lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Engine thread has not been launched")]
    NotLaunched,

    #[error("Engine thread is already running")]
    AlreadyLaunched,

    #[error("Failed to spawn engine thread: {0}")]
    Spawn(String),
}

keyed_enum! {
    /// Stable failure kind reported to the host
    pub enum ErrorCode("ERROR_") {
        Ok = 0 => "OK",
        Unknown = 1 => "UNKNOWN",
        SettingsInvalid = 2 => "SETTINGS_INVALID",

        OptUnsupported = 100 => "OPT_UNSUPPORTED",
        OptInvArg = 101 => "OPT_INVARG",
        OptInvId = 102 => "OPT_INV_ID",
        OptLocked = 103 => "OPT_LOCKED",

        RomMissing = 200 => "ROM_MISSING",
        RomInvalid = 201 => "ROM_INVALID",
        RomEncrypted = 202 => "ROM_ENCRYPTED",
        ExtInvalid = 203 => "EXT_INVALID",

        DriveNotFound = 300 => "DRIVE_NOT_FOUND",
        DriveNotConnected = 301 => "DRIVE_NOT_CONNECTED",

        FileTypeMismatch = 400 => "FILE_TYPE_MISMATCH",
        FileCorrupted = 401 => "FILE_CORRUPTED",
        FileUnsupported = 402 => "FILE_UNSUPPORTED",
        FsOutOfSpace = 403 => "FS_OUT_OF_SPACE",

        AudioInvalidOffset = 500 => "AUDIO_INVALID_OFFSET",
        AudioNotAllocated = 501 => "AUDIO_NOT_ALLOCATED",
        AudioInvalidCapacity = 502 => "AUDIO_INVALID_CAPACITY",

        ThreadNotLaunched = 600 => "THREAD_NOT_LAUNCHED",
        ThreadAlreadyLaunched = 601 => "THREAD_ALREADY_LAUNCHED",
        ThreadSpawn = 602 => "THREAD_SPAWN",
    }
}

impl BridgeError {
    /// Stable failure kind for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Option(err) => match err {
                OptionError::Unknown(_) | OptionError::NotIndexed(_) => ErrorCode::OptUnsupported,
                OptionError::InvalidIndex { .. } => ErrorCode::OptInvId,
                OptionError::InvalidArgument { .. } => ErrorCode::OptInvArg,
                OptionError::Locked(_) => ErrorCode::OptLocked,
            },
            Self::Drive(err) => match err {
                DriveError::NoSuchDrive(_) => ErrorCode::DriveNotFound,
                DriveError::NotConnected(_) => ErrorCode::DriveNotConnected,
            },
            Self::Memory(err) => match err {
                MemoryError::RomMissing => ErrorCode::RomMissing,
                MemoryError::InvalidRom(_) => ErrorCode::RomInvalid,
                MemoryError::InvalidExt(_) => ErrorCode::ExtInvalid,
            },
            Self::Media(err) => match err {
                MediaError::TypeMismatch(_) => ErrorCode::FileTypeMismatch,
                MediaError::Corrupted(_) => ErrorCode::FileCorrupted,
                MediaError::Unsupported(_) => ErrorCode::FileUnsupported,
                MediaError::EncryptedRom => ErrorCode::RomEncrypted,
                MediaError::DiskFull { .. } => ErrorCode::FsOutOfSpace,
            },
            Self::Audio(err) => match err {
                AudioError::InvalidOffset { .. } => ErrorCode::AudioInvalidOffset,
                AudioError::NotAllocated => ErrorCode::AudioNotAllocated,
                AudioError::InvalidCapacity(_) => ErrorCode::AudioInvalidCapacity,
            },
            Self::Engine(err) => match err {
                EngineError::NotLaunched => ErrorCode::ThreadNotLaunched,
                EngineError::AlreadyLaunched => ErrorCode::ThreadAlreadyLaunched,
                EngineError::Spawn(_) => ErrorCode::ThreadSpawn,
            },
            Self::Settings(_) => ErrorCode::SettingsInvalid,
        }
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OptionError::InvalidArgument {
            option: Opt::ChipRam,
            value: 333,
        };
        assert_eq!(format!("{}", err), "Invalid argument 333 for OPT_CHIP_RAM");

        let err = DriveError::NotConnected(2);
        assert_eq!(format!("{}", err), "Drive df2 is not connected");
    }

    #[test]
    fn test_error_conversion() {
        let err: BridgeError = OptionError::Locked(Opt::AgnusRevision).into();
        assert!(matches!(err, BridgeError::Option(_)));
        assert_eq!(err.code(), ErrorCode::OptLocked);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(BridgeError::from(MemoryError::RomMissing).code(), ErrorCode::RomMissing);
        assert_eq!(
            BridgeError::from(AudioError::InvalidOffset { offset: 3, half: 1024 }).code(),
            ErrorCode::AudioInvalidOffset
        );
        assert_eq!(ErrorCode::from_raw(301), Some(ErrorCode::DriveNotConnected));
        assert_eq!(ErrorCode::DriveNotConnected.constant_name(), "ERROR_DRIVE_NOT_CONNECTED");
        assert_eq!(ErrorCode::from_raw(9999), None);
    }
}
