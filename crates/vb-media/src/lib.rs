//! Disk and firmware image decoders for vamiga-bridge
//!
//! Every decoder follows the same shape: a cheap `is_compatible` check on
//! the raw blob, then `from_bytes` which parses and validates it.

pub mod adf;
pub mod disk;
pub mod dms;
pub mod exe;
pub mod ofs;
pub mod rom;

pub use adf::{AdfFile, Density, DosType};
pub use disk::{DiskFormat, DiskImage, DiskInfo, FloppyDisk};
pub use dms::DmsFile;
pub use exe::ExeFile;
pub use rom::{ExtRomFile, RomDescriptor, RomFile, RomFlags};

/// Read a big-endian u16 at `offset`
pub(crate) fn be16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

/// Read a big-endian u32 at `offset`
pub(crate) fn be32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
