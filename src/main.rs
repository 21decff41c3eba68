//! vamiga-bridge - headless host for the Amiga bridge
//!
//! Loads the given firmware and disk images into a headless engine, runs it
//! for a number of frames and plays the host side of the bridge: relaying
//! engine events and pulling audio one half buffer at a time.

use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use vb_bridge::{msg_type_key, AmigaBridge};
use vb_core::{BridgeConfig, MessageEvent};
use vb_engine::HeadlessAmiga;

#[derive(Parser, Debug)]
#[command(name = "vamiga-bridge", version, about = "Run a headless Amiga through the host bridge")]
struct Args {
    /// Kickstart or boot ROM image
    #[arg(long)]
    rom: Option<PathBuf>,

    /// Extension ROM image
    #[arg(long)]
    ext: Option<PathBuf>,

    /// Disk image (ADF, EXE or DMS)
    #[arg(long)]
    disk: Option<PathBuf>,

    /// Drive receiving the disk (0-3)
    #[arg(long, default_value_t = 0)]
    drive: usize,

    /// Number of frames to emulate
    #[arg(long, default_value_t = 250)]
    frames: u64,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run without frame pacing
    #[arg(long)]
    warp: bool,
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<BridgeConfig> {
    match path {
        Some(path) => BridgeConfig::load_from(path)
            .map_err(|e| anyhow!("cannot read settings {}: {}", path.display(), e)),
        None => Ok(BridgeConfig::load().unwrap_or_else(|e| {
            eprintln!("Using default settings: {}", e);
            BridgeConfig::default()
        })),
    }
}

fn log_event(event: &MessageEvent) {
    match msg_type_key(event.id) {
        Some(key) => info!("MSG_{} {:?}", key, event.data()),
        None => warn!("Unknown message {} {:?}", event.id, event.data()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_ref())?;
    vb_core::logging::init(settings.debug.log_level);

    info!("Starting vamiga-bridge");

    let bridge = AmigaBridge::new(Arc::new(HeadlessAmiga::new()), &settings)
        .context("bridge setup failed")?;

    if let Some(path) = &args.rom {
        let blob = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        if let Some(rom) = bridge.analyze_rom(&blob)? {
            info!("ROM: {} {} ({:08X})", rom.title, rom.version, rom.crc32);
        }
        bridge.load_rom(&blob)?;
    }

    if let Some(path) = &args.ext {
        let blob = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        bridge.load_ext(&blob)?;
    }

    if let Some(path) = &args.disk {
        let blob = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        match bridge.insert_disk(&blob, args.drive)? {
            Some(format) => info!("Inserted {} into df{}", format, args.drive),
            None => warn!("{} is not a known disk image", path.display()),
        }
    }

    let left = bridge.left_channel_buffer();
    let right = bridge.right_channel_buffer();

    if args.warp {
        bridge.warp_on();
    }
    bridge.run()?;

    let start = Instant::now();
    let mut halves = 0u64;
    while bridge.frame_count() < args.frames {
        bridge.events().dispatch(|event| log_event(&event));

        if bridge.audio_fill_level() >= 10 {
            bridge.audio().fill_next_half()?;
            halves += 1;
        }
        thread::sleep(Duration::from_millis(5));
    }

    bridge.halt();
    bridge.events().dispatch(|event| log_event(&event));

    info!(
        "Emulated {} frames in {:.2?}, {} audio halves of {} samples (left {:p}, right {:p})",
        bridge.frame_count(),
        start.elapsed(),
        halves,
        left.half_len(),
        left.as_ptr(),
        right.as_ptr()
    );
    if bridge.rom_fingerprint() != 0 {
        info!("ROM fingerprint: {:08X}", bridge.rom_fingerprint());
    }
    Ok(())
}
