//! Disk and firmware image loader

use crate::capture::ErrorChannel;
use std::sync::Arc;
use tracing::{debug, info};
use vb_core::{BridgeError, MediaError, MemoryError, Result};
use vb_engine::Engine;
use vb_media::{DiskFormat, DiskImage, DiskInfo, ExtRomFile, RomDescriptor, RomFile};

/// Classifies raw blobs and installs them into the engine
pub struct ImageLoader {
    engine: Arc<dyn Engine>,
    errors: Arc<ErrorChannel>,
}

/// Firmware decode failures surface as memory errors, except encryption
fn rom_error(err: MediaError, ext: bool) -> BridgeError {
    match err {
        MediaError::EncryptedRom => err.into(),
        other if ext => MemoryError::InvalidExt(other.to_string()).into(),
        other => MemoryError::InvalidRom(other.to_string()).into(),
    }
}

impl ImageLoader {
    pub fn new(engine: Arc<dyn Engine>, errors: Arc<ErrorChannel>) -> Self {
        Self { engine, errors }
    }

    /// Insert a disk blob into `drive`
    ///
    /// Formats are tried in the order ADF, EXE, DMS. Returns `Ok(None)`
    /// without touching the drive when no format matches.
    pub fn insert_disk(&self, blob: &[u8], drive: usize) -> Result<Option<DiskFormat>> {
        self.errors.guard("insert_disk", || {
            let Some(image) = DiskImage::decode(blob)? else {
                debug!("Ignoring unrecognized {} byte disk blob", blob.len());
                return Ok(None);
            };

            let format = image.format();
            let disk = image.into_floppy()?;
            self.engine.swap_disk(drive, disk)?;
            Ok(Some(format))
        })
    }

    pub fn eject_disk(&self, drive: usize) -> Result<()> {
        self.errors.capture("eject_disk", self.engine.eject_disk(drive))
    }

    pub fn disk_info(&self, drive: usize) -> Option<DiskInfo> {
        self.engine.disk_info(drive)
    }

    /// Identify a ROM blob without installing it
    pub fn analyze_rom(&self, blob: &[u8]) -> Result<Option<RomDescriptor>> {
        if !RomFile::is_compatible(blob) {
            return Ok(None);
        }
        self.errors.guard("analyze_rom", || {
            let rom = RomFile::from_bytes(blob)?;
            Ok(Some(rom.descriptor()))
        })
    }

    /// Install a Kickstart or boot ROM, returning `has_rom()`
    pub fn load_rom(&self, blob: &[u8]) -> Result<bool> {
        self.errors.guard("load_rom", || {
            let rom = RomFile::from_bytes(blob).map_err(|e| rom_error(e, false))?;
            self.engine.load_rom(rom)?;
            Ok(self.engine.has_rom())
        })
    }

    /// Install an extension ROM, returning `has_ext()`
    pub fn load_ext(&self, blob: &[u8]) -> Result<bool> {
        self.errors.guard("load_ext", || {
            let ext = ExtRomFile::from_bytes(blob).map_err(|e| rom_error(e, true))?;
            self.engine.load_ext(ext)?;
            info!("Extension ROM loaded ({} KB)", blob.len() / 1024);
            Ok(self.engine.has_ext())
        })
    }

    pub fn has_rom(&self) -> bool {
        self.engine.has_rom()
    }

    pub fn has_ext(&self) -> bool {
        self.engine.has_ext()
    }

    pub fn rom_fingerprint(&self) -> u32 {
        self.engine.rom_fingerprint()
    }
}
