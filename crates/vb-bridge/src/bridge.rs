//! Host-facing bridge
//!
//! `AmigaBridge` owns the engine handle for its lifetime. Construction
//! registers the event listener, launches the engine thread and applies the
//! boot defaults. Dropping it stops the engine thread, then unregisters the
//! listener.

use crate::audio::AudioBridge;
use crate::capture::{ErrorChannel, ErrorRecord};
use crate::dispatcher::ConfigDispatcher;
use crate::loader::ImageLoader;
use crate::relay::EventRelay;
use std::sync::Arc;
use tracing::{debug, info};
use vb_audio::{ChannelBuffer, Half};
use vb_core::{BridgeConfig, ErrorCode, MessageEvent, Result};
use vb_engine::{Engine, ExecState};
use vb_media::{DiskFormat, DiskInfo, RomDescriptor};

pub struct AmigaBridge {
    engine: Arc<dyn Engine>,
    errors: Arc<ErrorChannel>,
    config: ConfigDispatcher,
    audio: AudioBridge,
    loader: ImageLoader,
    events: EventRelay,
}

impl AmigaBridge {
    /// Attach to `engine` and bring it into the configured boot state
    pub fn new(engine: Arc<dyn Engine>, settings: &BridgeConfig) -> Result<Self> {
        let errors = Arc::new(ErrorChannel::new());
        let boot = errors.capture("bootstrap", settings.boot_sequence())?;

        let events = EventRelay::new(settings.events.queue_capacity);
        engine.set_listener(events.listener());

        let setup = || -> Result<(ConfigDispatcher, AudioBridge)> {
            if !engine.is_launched() {
                errors.capture("launch", engine.launch())?;
            }

            let config = ConfigDispatcher::new(Arc::clone(&engine), Arc::clone(&errors));
            config.bootstrap(&boot)?;

            let audio = AudioBridge::new(
                Arc::clone(&engine),
                Arc::clone(&errors),
                settings.audio.buffer_capacity,
            )?;
            audio.set_sample_rate(settings.audio.sample_rate);
            Ok((config, audio))
        };

        let (config, audio) = match setup() {
            Ok(parts) => parts,
            Err(err) => {
                engine.shutdown();
                engine.clear_listener();
                return Err(err);
            }
        };

        info!("Bridge ready ({} bootstrap options)", boot.len());
        Ok(Self {
            loader: ImageLoader::new(Arc::clone(&engine), Arc::clone(&errors)),
            engine,
            errors,
            config,
            audio,
            events,
        })
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    pub fn config(&self) -> &ConfigDispatcher {
        &self.config
    }

    pub fn audio(&self) -> &AudioBridge {
        &self.audio
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    pub fn events(&self) -> &EventRelay {
        &self.events
    }

    // Last error

    pub fn last_error(&self) -> Option<ErrorRecord> {
        self.errors.last_error()
    }

    pub fn error_code(&self) -> ErrorCode {
        self.errors.error_code()
    }

    pub fn what(&self) -> String {
        self.errors.what()
    }

    // Lifecycle

    pub fn power_on(&self) -> Result<()> {
        self.errors.capture("power_on", self.engine.power_on())
    }

    pub fn power_off(&self) {
        self.engine.power_off();
    }

    pub fn run(&self) -> Result<()> {
        self.errors.capture("run", self.engine.run())
    }

    pub fn pause(&self) {
        self.engine.pause();
    }

    /// Toggle between running and paused
    pub fn stop_and_go(&self) -> Result<()> {
        if self.engine.is_running() {
            self.engine.pause();
            Ok(())
        } else {
            self.run()
        }
    }

    pub fn halt(&self) {
        self.engine.halt();
    }

    pub fn hard_reset(&self) {
        self.engine.hard_reset();
    }

    pub fn soft_reset(&self) {
        self.engine.soft_reset();
    }

    pub fn warp_on(&self) {
        self.engine.warp_on();
    }

    pub fn warp_off(&self) {
        self.engine.warp_off();
    }

    pub fn in_warp_mode(&self) -> bool {
        self.engine.is_warping()
    }

    pub fn is_powered_on(&self) -> bool {
        self.engine.is_powered_on()
    }

    pub fn is_powered_off(&self) -> bool {
        !self.engine.is_powered_on()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.engine.state() == ExecState::Paused
    }

    pub fn cpu_load(&self) -> f64 {
        self.engine.cpu_load()
    }

    pub fn frame_count(&self) -> u64 {
        self.engine.frame_count()
    }

    /// CPU cycles since the last hard reset
    pub fn cpu_clock(&self) -> u64 {
        self.engine.cpu_clock()
    }

    pub fn is_spinning(&self) -> bool {
        self.engine.is_spinning()
    }

    // Configuration

    pub fn set_option(&self, key: i64, value: i64) -> Result<()> {
        self.config.set_option(key, value)
    }

    pub fn set_indexed_option(&self, key: i64, index: i64, value: i64) -> Result<()> {
        self.config.set_indexed_option(key, index, value)
    }

    pub fn get_option(&self, key: i64) -> i64 {
        self.config.get_option(key)
    }

    pub fn get_indexed_option(&self, key: i64, index: i64) -> i64 {
        self.config.get_indexed_option(key, index)
    }

    // Media

    pub fn insert_disk(&self, blob: &[u8], drive: usize) -> Result<Option<DiskFormat>> {
        self.loader.insert_disk(blob, drive)
    }

    pub fn eject_disk(&self, drive: usize) -> Result<()> {
        self.loader.eject_disk(drive)
    }

    pub fn disk_info(&self, drive: usize) -> Option<DiskInfo> {
        self.loader.disk_info(drive)
    }

    pub fn analyze_rom(&self, blob: &[u8]) -> Result<Option<RomDescriptor>> {
        self.loader.analyze_rom(blob)
    }

    pub fn load_rom(&self, blob: &[u8]) -> Result<bool> {
        self.loader.load_rom(blob)
    }

    pub fn load_ext(&self, blob: &[u8]) -> Result<bool> {
        self.loader.load_ext(blob)
    }

    pub fn rom_fingerprint(&self) -> u32 {
        self.loader.rom_fingerprint()
    }

    // Audio

    pub fn left_channel_buffer(&self) -> ChannelBuffer {
        self.audio.left_channel_buffer()
    }

    pub fn right_channel_buffer(&self) -> ChannelBuffer {
        self.audio.right_channel_buffer()
    }

    pub fn update_audio(&self, offset: usize) -> Result<Half> {
        self.audio.update_audio(offset)
    }

    pub fn audio_fill_level(&self) -> i32 {
        self.audio.audio_fill_level()
    }

    pub fn set_sample_rate(&self, rate: u32) {
        self.audio.set_sample_rate(rate);
    }

    // Events

    pub fn poll_event(&self) -> Option<MessageEvent> {
        self.events.poll()
    }

    pub fn drain_events(&self) -> Vec<MessageEvent> {
        self.events.drain()
    }
}

impl Drop for AmigaBridge {
    fn drop(&mut self) {
        debug!("Detaching bridge");
        self.engine.shutdown();
        self.engine.clear_listener();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vb_core::{AudioError, BridgeError, Opt};
    use vb_engine::HeadlessAmiga;

    fn engine() -> Arc<dyn Engine> {
        Arc::new(HeadlessAmiga::new())
    }

    #[test]
    fn test_bootstrap_defaults() {
        let bridge = AmigaBridge::new(engine(), &BridgeConfig::default()).unwrap();
        assert!(bridge.engine().is_launched());
        assert_eq!(bridge.config().get(Opt::ChipRam), 1024);
        assert_eq!(bridge.config().get(Opt::SlowRam), 512);
        assert_eq!(bridge.config().get(Opt::Audvoll), 100);
        assert_eq!(bridge.config().get_indexed(Opt::DriveConnect, 1), 1);
        assert_eq!(bridge.config().get_indexed(Opt::DriveConnect, 2), 0);
        assert_eq!(bridge.error_code(), ErrorCode::Ok);
        assert!(bridge.is_powered_off());
    }

    #[test]
    fn test_bad_settings_abort_construction() {
        let engine = engine();
        let mut settings = BridgeConfig::default();
        settings.audio.buffer_capacity = 1023;

        let err = AmigaBridge::new(Arc::clone(&engine), &settings).err().unwrap();
        assert!(matches!(err, BridgeError::Audio(AudioError::InvalidCapacity(1023))));
        assert!(!engine.is_launched());

        let mut settings = BridgeConfig::default();
        settings.memory.chip_ram = 3;
        assert!(AmigaBridge::new(Arc::clone(&engine), &settings).is_err());
        assert!(!engine.is_launched());
    }

    #[test]
    fn test_drop_stops_engine() {
        let engine = engine();
        let bridge = AmigaBridge::new(Arc::clone(&engine), &BridgeConfig::default()).unwrap();
        assert!(engine.is_launched());
        drop(bridge);
        assert!(!engine.is_launched());
    }

    #[test]
    fn test_power_on_without_rom() {
        let bridge = AmigaBridge::new(engine(), &BridgeConfig::default()).unwrap();
        assert!(bridge.power_on().is_err());
        assert_eq!(bridge.error_code(), ErrorCode::RomMissing);
        assert!(bridge.stop_and_go().is_err());
        assert!(!bridge.is_running());
    }
}
