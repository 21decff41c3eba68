//! The engine surface consumed by the bridge

use vb_core::{MessageEvent, Opt, Result};
use vb_media::{DiskInfo, ExtRomFile, FloppyDisk, RomFile};

/// Number of floppy drive slots (df0-df3)
pub const DRIVE_COUNT: usize = 4;

/// Callback invoked by the message bus on the engine thread
pub type MessageListener = Box<dyn Fn(MessageEvent) + Send + Sync>;

/// Execution state of the emulated machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Off,
    Paused,
    Running,
}

/// Emulation engine trait
///
/// Every method takes `&self`. Implementations serialize against their own
/// engine thread internally, so a handle can be shared as `Arc<dyn Engine>`.
pub trait Engine: Send + Sync {
    // Lifecycle

    /// Start the engine thread
    fn launch(&self) -> Result<()>;

    /// Stop the engine thread and wait for it to exit
    fn shutdown(&self);

    fn is_launched(&self) -> bool;

    fn power_on(&self) -> Result<()>;

    fn power_off(&self);

    fn run(&self) -> Result<()>;

    fn pause(&self);

    /// Power off, announce the halt and stop the engine thread
    fn halt(&self);

    fn hard_reset(&self);

    fn soft_reset(&self);

    fn warp_on(&self);

    fn warp_off(&self);

    fn state(&self) -> ExecState;

    fn is_powered_on(&self) -> bool {
        self.state() != ExecState::Off
    }

    fn is_running(&self) -> bool {
        self.state() == ExecState::Running
    }

    fn is_warping(&self) -> bool;

    /// Fraction of the frame budget spent emulating (0.0 - 1.0)
    fn cpu_load(&self) -> f64;

    /// Frames emulated since the last hard reset
    fn frame_count(&self) -> u64;

    /// CPU cycles elapsed since the last hard reset
    fn cpu_clock(&self) -> u64;

    /// True while a floppy drive motor is on
    fn is_spinning(&self) -> bool;

    // Configuration

    /// Set an option (on every sub-target for per-target options)
    fn configure(&self, option: Opt, value: i64) -> Result<()>;

    /// Set an option on one sub-target
    fn configure_indexed(&self, option: Opt, index: i64, value: i64) -> Result<()>;

    fn config_item(&self, option: Opt) -> i64;

    fn config_item_indexed(&self, option: Opt, index: i64) -> i64;

    // Floppy drives

    fn drive_count(&self) -> usize {
        DRIVE_COUNT
    }

    /// Replace the disk in `drive`, releasing the previous one
    fn swap_disk(&self, drive: usize, disk: FloppyDisk) -> Result<()>;

    fn eject_disk(&self, drive: usize) -> Result<()>;

    fn disk_info(&self, drive: usize) -> Option<DiskInfo>;

    // Memory

    fn load_rom(&self, rom: RomFile) -> Result<()>;

    fn load_ext(&self, ext: ExtRomFile) -> Result<()>;

    fn has_rom(&self) -> bool;

    fn has_ext(&self) -> bool;

    /// CRC32 of the installed Kickstart (0 when absent)
    fn rom_fingerprint(&self) -> u32;

    // Audio muxer

    fn set_sample_rate(&self, rate: u32);

    /// Move `left.len()` stereo samples out of the muxer
    fn copy_samples(&self, left: &mut [f32], right: &mut [f32]);

    /// Muxer buffer fill ratio (0.0 - 1.0)
    fn mixer_fill_level(&self) -> f64;

    // Message bus

    fn set_listener(&self, listener: MessageListener);

    fn clear_listener(&self);
}
