//! Headless reference engine
//!
//! `HeadlessAmiga` owns a real engine thread, the option store, four drive
//! slots, the ROM slots, a sample muxer and a message bus. It does not
//! execute 68k code. While running it paces frames at the video rate and
//! feeds the muxer with silence.

use crate::bus::MessageBus;
use crate::engine::{Engine, ExecState, MessageListener, DRIVE_COUNT};
use crate::muxer::Muxer;
use crate::store::OptionStore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vb_core::{
    DriveError, EngineError, MemoryError, MessageEvent, MsgType, Opt, Result, VideoFormat,
};
use vb_media::{DiskInfo, ExtRomFile, FloppyDisk, RomFile};

/// Machine state guarded by one lock
struct Machine {
    options: OptionStore,
    drives: [Option<FloppyDisk>; DRIVE_COUNT],
    rom: Option<RomFile>,
    rom_crc: u32,
    ext: Option<ExtRomFile>,
    state: ExecState,
    warp: bool,
}

impl Machine {
    fn new() -> Self {
        Self {
            options: OptionStore::new(),
            drives: Default::default(),
            rom: None,
            rom_crc: 0,
            ext: None,
            state: ExecState::Off,
            warp: false,
        }
    }

    fn video_format(&self) -> VideoFormat {
        self.options
            .get(Opt::VideoFormat, 0)
            .and_then(VideoFormat::from_raw)
            .unwrap_or(VideoFormat::Pal)
    }

    fn fps(&self) -> u32 {
        self.video_format().fps()
    }

    /// CPU cycles per frame, scaled by the overclocking factor
    fn cycles_per_frame(&self) -> u64 {
        let format = self.video_format();
        let factor = self.options.get(Opt::CpuOverclocking, 0).unwrap_or(0).max(1) as u64;
        format.cpu_frequency() * factor / format.fps() as u64
    }

    /// Motors run while the machine runs with a disk in a connected drive
    fn is_spinning(&self) -> bool {
        self.state == ExecState::Running
            && (0..DRIVE_COUNT).any(|d| self.drives[d].is_some() && self.is_connected(d))
    }

    fn is_connected(&self, drive: usize) -> bool {
        self.options.get(Opt::DriveConnect, drive) == Some(1)
    }
}

/// State shared between the handle and the engine thread
struct Shared {
    machine: Mutex<Machine>,
    muxer: Mutex<Muxer>,
    bus: MessageBus,
    stop: AtomicBool,
    frames: AtomicU64,
    /// f64 bit pattern
    cpu_load: AtomicU64,
}

impl Shared {
    fn post(&self, kind: MsgType, data1: i32) {
        self.bus.post(kind, data1, 0, 0, 0);
    }

    /// Emulate one frame, returning the frame rate to pace the next one
    fn execute_frame(&self) -> (u32, bool) {
        let (running, warp, fps) = {
            let machine = self.machine.lock();
            (machine.state == ExecState::Running, machine.warp, machine.fps())
        };

        if !running {
            self.cpu_load.store(0f64.to_bits(), Ordering::Relaxed);
            return (fps, false);
        }

        let start = Instant::now();
        {
            let mut muxer = self.muxer.lock();
            let samples = (muxer.sample_rate() / fps) as usize;
            muxer.push_silence(samples);
        }
        self.frames.fetch_add(1, Ordering::Relaxed);

        let load = start.elapsed().as_secs_f64() * fps as f64;
        self.cpu_load.store(load.min(1.0).to_bits(), Ordering::Relaxed);
        (fps, warp)
    }

    fn run_loop(&self) {
        info!("Engine thread started");

        let mut deadline = Instant::now();
        while !self.stop.load(Ordering::Acquire) {
            self.bus.wait_until(deadline);
            self.bus.flush();

            let now = Instant::now();
            if now < deadline {
                continue;
            }

            let (fps, warp) = self.execute_frame();
            let period = Duration::from_secs(1) / fps;
            deadline = if warp { now } else { deadline + period };
            if deadline + period < now {
                // Fell behind, resynchronize instead of catching up
                deadline = now + period;
            }
        }

        self.bus.flush();
        info!("Engine thread stopped");
    }
}

/// Reference engine without CPU or chipset emulation
pub struct HeadlessAmiga {
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Default for HeadlessAmiga {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAmiga {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                machine: Mutex::new(Machine::new()),
                muxer: Mutex::new(Muxer::default()),
                bus: MessageBus::new(),
                stop: AtomicBool::new(false),
                frames: AtomicU64::new(0),
                cpu_load: AtomicU64::new(0f64.to_bits()),
            }),
            thread: Mutex::new(None),
        }
    }

    /// Push externally produced samples into the muxer
    pub fn feed_audio(&self, left: &[f32], right: &[f32]) {
        let mut muxer = self.shared.muxer.lock();
        for (&l, &r) in left.iter().zip(right) {
            muxer.push(l, r);
        }
    }

    /// Post an arbitrary message on the bus
    pub fn post_message(&self, event: MessageEvent) {
        self.shared.bus.post_event(event);
    }

    /// Messages waiting for the engine thread
    pub fn pending_messages(&self) -> usize {
        self.shared.bus.pending()
    }

    fn power_on_locked(&self, machine: &mut Machine) -> Result<()> {
        if machine.state != ExecState::Off {
            return Ok(());
        }
        if machine.rom.is_none() {
            return Err(MemoryError::RomMissing.into());
        }

        machine.state = ExecState::Paused;
        self.shared.frames.store(0, Ordering::Relaxed);
        self.shared.post(MsgType::PowerOn, 0);
        info!("Powered on");
        Ok(())
    }

    fn apply(&self, option: Opt, index: Option<i64>, value: i64) -> Result<()> {
        let mut machine = self.shared.machine.lock();
        let powered_on = machine.state != ExecState::Off;

        let targets = machine.options.check(option, index, value, powered_on)?;
        let changed = machine.options.commit(option, &targets, value);
        debug!("{} = {} on {:?}", option, value, targets);

        self.shared
            .bus
            .post_event(MessageEvent::config(option.raw() as i32, value));

        match option {
            Opt::Audvoll | Opt::Audvolr => {
                let left = machine.options.get(Opt::Audvoll, 0).unwrap_or(0);
                let right = machine.options.get(Opt::Audvolr, 0).unwrap_or(0);
                self.shared.muxer.lock().set_volume(left, right);
            }
            Opt::DriveConnect => {
                for drive in changed {
                    if value == 1 {
                        self.shared.post(MsgType::DriveConnect, drive as i32);
                    } else {
                        if machine.drives[drive].take().is_some() {
                            self.shared.post(MsgType::DiskEject, drive as i32);
                        }
                        self.shared.post(MsgType::DriveDisconnect, drive as i32);
                    }
                }
            }
            Opt::ChipRam | Opt::SlowRam | Opt::FastRam | Opt::ExtStart | Opt::Bankmap => {
                self.shared.post(MsgType::MemLayout, 0);
            }
            Opt::VideoFormat => {
                self.shared.post(MsgType::VideoFormat, value as i32);
                self.shared.bus.signal();
            }
            _ => {}
        }
        Ok(())
    }

    fn check_drive(drive: usize) -> Result<()> {
        if drive >= DRIVE_COUNT {
            return Err(DriveError::NoSuchDrive(drive).into());
        }
        Ok(())
    }
}

impl Engine for HeadlessAmiga {
    fn launch(&self) -> Result<()> {
        let mut thread = self.thread.lock();
        if thread.is_some() {
            return Err(EngineError::AlreadyLaunched.into());
        }

        self.shared.stop.store(false, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("amiga-engine".into())
            .spawn(move || shared.run_loop())
            .map_err(|e| EngineError::Spawn(e.to_string()))?;

        *thread = Some(handle);
        Ok(())
    }

    fn shutdown(&self) {
        let Some(handle) = self.thread.lock().take() else {
            return;
        };

        self.shared.stop.store(true, Ordering::Release);
        self.shared.bus.signal();
        if handle.join().is_err() {
            warn!("Engine thread panicked");
        }
    }

    fn is_launched(&self) -> bool {
        self.thread.lock().is_some()
    }

    fn power_on(&self) -> Result<()> {
        let mut machine = self.shared.machine.lock();
        self.power_on_locked(&mut machine)
    }

    fn power_off(&self) {
        let mut machine = self.shared.machine.lock();
        if machine.state == ExecState::Off {
            return;
        }
        if machine.state == ExecState::Running {
            self.shared.post(MsgType::Pause, 0);
        }
        machine.state = ExecState::Off;
        self.shared.muxer.lock().clear();
        self.shared.post(MsgType::PowerOff, 0);
        info!("Powered off");
    }

    fn run(&self) -> Result<()> {
        let mut machine = self.shared.machine.lock();
        self.power_on_locked(&mut machine)?;
        if machine.state != ExecState::Running {
            machine.state = ExecState::Running;
            self.shared.post(MsgType::Run, 0);
            self.shared.bus.signal();
        }
        Ok(())
    }

    fn pause(&self) {
        let mut machine = self.shared.machine.lock();
        if machine.state == ExecState::Running {
            machine.state = ExecState::Paused;
            self.shared.post(MsgType::Pause, 0);
        }
    }

    fn halt(&self) {
        self.power_off();
        self.shared.post(MsgType::Halt, 0);
        self.shutdown();
    }

    fn hard_reset(&self) {
        let _machine = self.shared.machine.lock();
        self.shared.frames.store(0, Ordering::Relaxed);
        self.shared.muxer.lock().clear();
        self.shared.post(MsgType::Reset, 0);
        info!("Hard reset");
    }

    fn soft_reset(&self) {
        let _machine = self.shared.machine.lock();
        self.shared.post(MsgType::Reset, 1);
    }

    fn warp_on(&self) {
        let mut machine = self.shared.machine.lock();
        if !machine.warp {
            machine.warp = true;
            self.shared.post(MsgType::WarpOn, 0);
            self.shared.bus.signal();
        }
    }

    fn warp_off(&self) {
        let mut machine = self.shared.machine.lock();
        if machine.warp {
            machine.warp = false;
            self.shared.post(MsgType::WarpOff, 0);
        }
    }

    fn state(&self) -> ExecState {
        self.shared.machine.lock().state
    }

    fn is_warping(&self) -> bool {
        self.shared.machine.lock().warp
    }

    fn cpu_load(&self) -> f64 {
        f64::from_bits(self.shared.cpu_load.load(Ordering::Relaxed))
    }

    fn frame_count(&self) -> u64 {
        self.shared.frames.load(Ordering::Relaxed)
    }

    fn cpu_clock(&self) -> u64 {
        let cycles = self.shared.machine.lock().cycles_per_frame();
        self.frame_count() * cycles
    }

    fn is_spinning(&self) -> bool {
        self.shared.machine.lock().is_spinning()
    }

    fn configure(&self, option: Opt, value: i64) -> Result<()> {
        self.apply(option, None, value)
    }

    fn configure_indexed(&self, option: Opt, index: i64, value: i64) -> Result<()> {
        self.apply(option, Some(index), value)
    }

    fn config_item(&self, option: Opt) -> i64 {
        self.shared.machine.lock().options.get(option, 0).unwrap_or(0)
    }

    fn config_item_indexed(&self, option: Opt, index: i64) -> i64 {
        let machine = self.shared.machine.lock();
        if !option.is_indexed() {
            return machine.options.get(option, 0).unwrap_or(0);
        }
        if !option.scope().contains(index) {
            return 0;
        }
        machine.options.get(option, index as usize).unwrap_or(0)
    }

    fn swap_disk(&self, drive: usize, disk: FloppyDisk) -> Result<()> {
        Self::check_drive(drive)?;

        let mut machine = self.shared.machine.lock();
        if !machine.is_connected(drive) {
            return Err(DriveError::NotConnected(drive).into());
        }

        let origin = disk.origin();
        let write_protected = disk.is_write_protected();
        if machine.drives[drive].replace(disk).is_some() {
            self.shared.post(MsgType::DiskEject, drive as i32);
        }
        self.shared.post(MsgType::DiskInsert, drive as i32);
        if write_protected {
            self.shared.post(MsgType::DiskProtect, drive as i32);
        }

        info!("Inserted {} disk into df{}", origin, drive);
        Ok(())
    }

    fn eject_disk(&self, drive: usize) -> Result<()> {
        Self::check_drive(drive)?;

        let mut machine = self.shared.machine.lock();
        if machine.drives[drive].take().is_some() {
            self.shared.post(MsgType::DiskEject, drive as i32);
            info!("Ejected disk from df{}", drive);
        }
        Ok(())
    }

    fn disk_info(&self, drive: usize) -> Option<DiskInfo> {
        let machine = self.shared.machine.lock();
        machine.drives.get(drive)?.as_ref().map(FloppyDisk::info)
    }

    fn load_rom(&self, rom: RomFile) -> Result<()> {
        let mut machine = self.shared.machine.lock();
        machine.rom_crc = rom.crc32();
        info!(
            "Installed {} KB ROM ({:08X})",
            rom.data().len() / 1024,
            machine.rom_crc
        );
        machine.rom = Some(rom);
        self.shared.post(MsgType::MemLayout, 0);
        Ok(())
    }

    fn load_ext(&self, ext: ExtRomFile) -> Result<()> {
        let mut machine = self.shared.machine.lock();
        info!("Installed extension ROM ({:08X})", ext.crc32());
        machine.ext = Some(ext);
        self.shared.post(MsgType::MemLayout, 0);
        Ok(())
    }

    fn has_rom(&self) -> bool {
        self.shared.machine.lock().rom.is_some()
    }

    fn has_ext(&self) -> bool {
        self.shared.machine.lock().ext.is_some()
    }

    fn rom_fingerprint(&self) -> u32 {
        self.shared.machine.lock().rom_crc
    }

    fn set_sample_rate(&self, rate: u32) {
        self.shared.muxer.lock().set_sample_rate(rate);
    }

    fn copy_samples(&self, left: &mut [f32], right: &mut [f32]) {
        self.shared.muxer.lock().copy(left, right);
    }

    fn mixer_fill_level(&self) -> f64 {
        self.shared.muxer.lock().fill_level()
    }

    fn set_listener(&self, listener: MessageListener) {
        self.shared.bus.set_listener(listener);
    }

    fn clear_listener(&self) {
        self.shared.bus.clear_listener();
    }
}

impl Drop for HeadlessAmiga {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vb_core::{BridgeError, OptionError};

    fn kickstart() -> RomFile {
        let mut blob = vec![0u8; 256 * 1024];
        blob[..4].copy_from_slice(&vb_media::rom::ROM_HEADER_1X);
        RomFile::from_bytes(&blob).unwrap()
    }

    #[test]
    fn test_power_on_requires_rom() {
        let amiga = HeadlessAmiga::new();
        assert!(matches!(
            amiga.power_on(),
            Err(BridgeError::Memory(MemoryError::RomMissing))
        ));
        assert_eq!(amiga.state(), ExecState::Off);

        amiga.load_rom(kickstart()).unwrap();
        assert!(amiga.has_rom());
        assert_ne!(amiga.rom_fingerprint(), 0);
        amiga.run().unwrap();
        assert!(amiga.is_running());
        amiga.power_off();
        assert!(!amiga.is_powered_on());
    }

    #[test]
    fn test_locked_while_powered_on() {
        let amiga = HeadlessAmiga::new();
        amiga.load_rom(kickstart()).unwrap();
        amiga.power_on().unwrap();

        let err = amiga.configure(Opt::ChipRam, 1024).unwrap_err();
        assert!(matches!(err, BridgeError::Option(OptionError::Locked(Opt::ChipRam))));
        assert_eq!(amiga.config_item(Opt::ChipRam), 512);

        amiga.power_off();
        amiga.configure(Opt::ChipRam, 1024).unwrap();
        assert_eq!(amiga.config_item(Opt::ChipRam), 1024);
    }

    #[test]
    fn test_cpu_clock_follows_frames() {
        let amiga = HeadlessAmiga::new();
        amiga.load_rom(kickstart()).unwrap();
        assert_eq!(amiga.cpu_clock(), 0);

        amiga.run().unwrap();
        for _ in 0..3 {
            amiga.shared.execute_frame();
        }
        assert_eq!(amiga.frame_count(), 3);
        assert_eq!(amiga.cpu_clock(), 3 * (7_093_790 / 50));

        amiga.pause();
        amiga.configure(Opt::CpuOverclocking, 2).unwrap();
        assert_eq!(amiga.cpu_clock(), 3 * (2 * 7_093_790 / 50));
    }

    #[test]
    fn test_spinning_needs_disk_and_run() {
        let amiga = HeadlessAmiga::new();
        amiga.load_rom(kickstart()).unwrap();
        let disk = FloppyDisk::from_adf(
            vb_media::DiskFormat::Adf,
            vb_media::AdfFile::blank(vb_media::Density::Dd),
        );

        amiga.run().unwrap();
        assert!(!amiga.is_spinning());
        amiga.swap_disk(0, disk).unwrap();
        assert!(amiga.is_spinning());

        amiga.pause();
        assert!(!amiga.is_spinning());
        amiga.run().unwrap();
        amiga.eject_disk(0).unwrap();
        assert!(!amiga.is_spinning());
    }

    #[test]
    fn test_indexed_reads() {
        let amiga = HeadlessAmiga::new();
        amiga.configure_indexed(Opt::Audvol, 2, 40).unwrap();
        assert_eq!(amiga.config_item_indexed(Opt::Audvol, 2), 40);
        assert_eq!(amiga.config_item_indexed(Opt::Audvol, 9), 0);
        assert_eq!(amiga.config_item_indexed(Opt::Audvol, -1), 0);
        assert_eq!(amiga.config_item(Opt::Audvol), 100);
    }

    #[test]
    fn test_drive_slots() {
        let amiga = HeadlessAmiga::new();
        let disk = FloppyDisk::from_adf(
            vb_media::DiskFormat::Adf,
            vb_media::AdfFile::blank(vb_media::Density::Dd),
        );

        assert!(matches!(
            amiga.swap_disk(1, disk.clone()),
            Err(BridgeError::Drive(DriveError::NotConnected(1)))
        ));
        assert!(matches!(
            amiga.swap_disk(4, disk.clone()),
            Err(BridgeError::Drive(DriveError::NoSuchDrive(4)))
        ));

        amiga.swap_disk(0, disk).unwrap();
        assert!(amiga.disk_info(0).is_some());
        amiga.eject_disk(0).unwrap();
        assert!(amiga.disk_info(0).is_none());
    }

    #[test]
    fn test_disconnect_ejects_disk() {
        let amiga = HeadlessAmiga::new();
        amiga.configure_indexed(Opt::DriveConnect, 1, 1).unwrap();
        let disk = FloppyDisk::from_adf(
            vb_media::DiskFormat::Adf,
            vb_media::AdfFile::blank(vb_media::Density::Dd),
        );
        amiga.swap_disk(1, disk).unwrap();
        amiga.configure_indexed(Opt::DriveConnect, 1, 0).unwrap();
        assert!(amiga.disk_info(1).is_none());
    }

    #[test]
    fn test_muxer_volume() {
        let amiga = HeadlessAmiga::new();
        amiga.configure(Opt::Audvoll, 100).unwrap();
        amiga.configure(Opt::Audvolr, 0).unwrap();
        amiga.feed_audio(&[0.5, 0.5], &[0.5, 0.5]);
        assert!(amiga.mixer_fill_level() > 0.0);

        let mut left = [0.0; 2];
        let mut right = [0.0; 2];
        amiga.copy_samples(&mut left, &mut right);
        assert_eq!(left, [0.5, 0.5]);
        assert_eq!(right, [0.0, 0.0]);
    }

    #[test]
    fn test_launch_twice() {
        let amiga = HeadlessAmiga::new();
        amiga.launch().unwrap();
        assert!(matches!(
            amiga.launch(),
            Err(BridgeError::Engine(EngineError::AlreadyLaunched))
        ));
        amiga.shutdown();
        assert!(!amiga.is_launched());
    }
}
