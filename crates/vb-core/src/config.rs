//! Settings for vamiga-bridge
//!
//! The settings file seeds the bridge: audio buffer sizing, the bootstrap
//! option defaults applied before the first host command, the event queue
//! bound and the log level.

use crate::error::{AudioError, BridgeError};
use crate::option::{ConfigOption, Opt};
use crate::values::AgnusRevision;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct BridgeConfig {
    pub audio: AudioSettings,
    pub memory: MemorySettings,
    pub drives: DriveSettings,
    pub events: EventSettings,
    pub debug: DebugSettings,
}

/// Audio stream settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Samples per channel buffer (both halves)
    pub buffer_capacity: usize,
    /// Host output sample rate
    pub sample_rate: u32,
    pub volume_left: i64,
    pub volume_right: i64,
    /// Per Paula channel volume (0-100)
    pub channel_volume: [i64; 4],
    /// Per Paula channel pan
    pub channel_pan: [i64; 4],
}

/// Memory layout settings (sizes in KB)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub chip_ram: i64,
    pub slow_ram: i64,
    pub fast_ram: i64,
    /// Agnus revision key (e.g. "OCS", "ECS_1MB")
    pub agnus_revision: String,
}

/// Floppy drive settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    /// Connection state of df0-df3 (df0 is always connected)
    pub connected: [bool; 4],
}

/// Event relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Maximum number of undelivered events (0 = unbounded)
    pub queue_capacity: usize,
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct DebugSettings {
    pub log_level: LogLevel,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// Default implementations

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            buffer_capacity: 2048,
            sample_rate: 44100,
            volume_left: 100,
            volume_right: 100,
            channel_volume: [100; 4],
            channel_pan: [0; 4],
        }
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            chip_ram: 1024,
            slow_ram: 512,
            fast_ram: 0,
            agnus_revision: "OCS".to_string(),
        }
    }
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            connected: [true, true, false, false],
        }
    }
}

impl Default for EventSettings {
    fn default() -> Self {
        Self { queue_capacity: 0 }
    }
}

impl BridgeConfig {
    /// Load settings from the default location, or create them if missing
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the settings file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vamiga-bridge")
            .join("config.toml")
    }

    /// Check settings that are not validated by the engine itself
    pub fn validate(&self) -> Result<(), BridgeError> {
        let capacity = self.audio.buffer_capacity;
        if capacity == 0 || capacity % 2 != 0 {
            return Err(AudioError::InvalidCapacity(capacity).into());
        }
        if self.audio.sample_rate == 0 {
            return Err(BridgeError::Settings("sample rate must be non-zero".to_string()));
        }
        self.agnus_revision()?;
        Ok(())
    }

    /// Resolve the configured Agnus revision key
    pub fn agnus_revision(&self) -> Result<AgnusRevision, BridgeError> {
        AgnusRevision::from_key(&self.memory.agnus_revision).ok_or_else(|| {
            BridgeError::Settings(format!(
                "unknown Agnus revision '{}'",
                self.memory.agnus_revision
            ))
        })
    }

    /// Ordered option defaults applied before any host command is processed
    pub fn boot_sequence(&self) -> Result<Vec<ConfigOption>, BridgeError> {
        self.validate()?;

        let audio = &self.audio;
        let mut seq = vec![
            ConfigOption::scalar(Opt::Audvoll, audio.volume_left),
            ConfigOption::scalar(Opt::Audvolr, audio.volume_right),
        ];
        for (channel, &volume) in audio.channel_volume.iter().enumerate() {
            seq.push(ConfigOption::indexed(Opt::Audvol, channel as i64, volume));
        }
        for (channel, &pan) in audio.channel_pan.iter().enumerate() {
            seq.push(ConfigOption::indexed(Opt::Audpan, channel as i64, pan));
        }

        seq.push(ConfigOption::scalar(Opt::ChipRam, self.memory.chip_ram));
        seq.push(ConfigOption::scalar(Opt::SlowRam, self.memory.slow_ram));
        seq.push(ConfigOption::scalar(Opt::FastRam, self.memory.fast_ram));
        seq.push(ConfigOption::scalar(Opt::AgnusRevision, self.agnus_revision()?.raw()));

        // df0 cannot be disconnected
        for (drive, &connected) in self.drives.connected.iter().enumerate().skip(1) {
            seq.push(ConfigOption::indexed(Opt::DriveConnect, drive as i64, connected as i64));
        }

        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.audio.buffer_capacity, 2048);
        assert_eq!(config.memory.chip_ram, 1024);
        assert_eq!(config.memory.slow_ram, 512);
        assert!(config.drives.connected[1]);
        assert_eq!(config.events.queue_capacity, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = BridgeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: BridgeConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.audio.buffer_capacity, config.audio.buffer_capacity);
        assert_eq!(parsed.memory.agnus_revision, "OCS");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: BridgeConfig = toml::from_str("[memory]\nchip_ram = 512\n").unwrap();
        assert_eq!(parsed.memory.chip_ram, 512);
        assert_eq!(parsed.memory.slow_ram, 512);
        assert_eq!(parsed.audio.sample_rate, 44100);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = BridgeConfig::default();
        config.memory.agnus_revision = "ECS_1MB".to_string();
        config.save_to(&path).unwrap();

        let loaded = BridgeConfig::load_from(&path).unwrap();
        assert_eq!(loaded.agnus_revision().unwrap(), AgnusRevision::Ecs1Mb);
    }

    #[test]
    fn test_boot_sequence_order() {
        let seq = BridgeConfig::default().boot_sequence().unwrap();
        assert_eq!(seq[0], ConfigOption::scalar(Opt::Audvoll, 100));
        assert_eq!(seq[1], ConfigOption::scalar(Opt::Audvolr, 100));
        assert_eq!(seq[2], ConfigOption::indexed(Opt::Audvol, 0, 100));
        assert!(seq.contains(&ConfigOption::scalar(Opt::AgnusRevision, AgnusRevision::Ocs.raw())));
        assert_eq!(seq.last(), Some(&ConfigOption::indexed(Opt::DriveConnect, 3, 0)));
        assert!(!seq
            .iter()
            .any(|o| o.key == Opt::DriveConnect && o.index == Some(0)));
    }

    #[test]
    fn test_invalid_settings() {
        let mut config = BridgeConfig::default();
        config.audio.buffer_capacity = 1023;
        assert!(matches!(
            config.validate(),
            Err(BridgeError::Audio(AudioError::InvalidCapacity(1023)))
        ));

        let mut config = BridgeConfig::default();
        config.memory.agnus_revision = "AGA".to_string();
        assert!(matches!(config.boot_sequence(), Err(BridgeError::Settings(_))));
    }
}
