//! Amiga Disk File (ADF) support
//!
//! An ADF is a raw sector dump of a 3.5" floppy: 2 heads, 11 (DD) or 22
//! (HD) sectors of 512 bytes per track.

use crate::be32;
use tracing::debug;
use vb_core::MediaError;

/// Bytes per sector
pub const SECTOR_SIZE: usize = 512;

/// Sectors per DD track
pub const DD_SECTORS: usize = 11;

/// Sectors per HD track
pub const HD_SECTORS: usize = 22;

/// Bytes per DD cylinder (both heads)
pub const DD_CYLINDER_SIZE: usize = 2 * DD_SECTORS * SECTOR_SIZE;

/// Size of a standard 80 cylinder DD image
pub const DD_SIZE: usize = 80 * DD_CYLINDER_SIZE;

/// Size of a standard 80 cylinder HD image
pub const HD_SIZE: usize = 2 * DD_SIZE;

/// Number of extra cylinders some tools write beyond 80
pub const MAX_EXTRA_CYLINDERS: usize = 4;

/// Recording density of a 3.5" disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Density {
    /// Double density (880 KB)
    Dd,
    /// High density (1760 KB)
    Hd,
}

impl Density {
    /// Sectors per track
    pub fn sectors(self) -> usize {
        match self {
            Density::Dd => DD_SECTORS,
            Density::Hd => HD_SECTORS,
        }
    }

    /// Bytes per cylinder (both heads)
    pub fn cylinder_size(self) -> usize {
        2 * self.sectors() * SECTOR_SIZE
    }

    /// Number of 512 byte blocks on an 80 cylinder disk
    pub fn blocks(self) -> usize {
        80 * 2 * self.sectors()
    }
}

/// File system signature stored in the first boot block word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DosType {
    Ofs,
    Ffs,
    OfsIntl,
    FfsIntl,
    OfsDc,
    FfsDc,
    OfsLnfs,
    FfsLnfs,
}

impl DosType {
    /// Decode the `DOS\x` signature
    pub fn from_signature(sig: &[u8]) -> Option<Self> {
        if sig.len() < 4 || &sig[..3] != b"DOS" {
            return None;
        }
        Some(match sig[3] {
            0 => DosType::Ofs,
            1 => DosType::Ffs,
            2 => DosType::OfsIntl,
            3 => DosType::FfsIntl,
            4 => DosType::OfsDc,
            5 => DosType::FfsDc,
            6 => DosType::OfsLnfs,
            7 => DosType::FfsLnfs,
            _ => return None,
        })
    }

    /// Signature flavor byte (the `x` in `DOS\x`)
    pub fn flavor(self) -> u8 {
        self as u8
    }
}

/// A decoded ADF image
#[derive(Debug, Clone)]
pub struct AdfFile {
    data: Vec<u8>,
    density: Density,
    cylinders: usize,
}

impl AdfFile {
    /// Check whether the blob length matches a DD or HD image layout
    pub fn is_compatible(blob: &[u8]) -> bool {
        Self::geometry(blob.len()).is_some()
    }

    /// Density and cylinder count for an image of `len` bytes
    fn geometry(len: usize) -> Option<(Density, usize)> {
        if len == HD_SIZE {
            return Some((Density::Hd, 80));
        }
        (0..=MAX_EXTRA_CYLINDERS)
            .find(|extra| len == DD_SIZE + extra * DD_CYLINDER_SIZE)
            .map(|extra| (Density::Dd, 80 + extra))
    }

    /// Parse an ADF blob
    pub fn from_bytes(blob: &[u8]) -> Result<Self, MediaError> {
        Self::from_vec(blob.to_vec())
    }

    /// Take ownership of a raw sector dump
    pub fn from_vec(data: Vec<u8>) -> Result<Self, MediaError> {
        let (density, cylinders) =
            Self::geometry(data.len()).ok_or(MediaError::TypeMismatch("ADF"))?;

        debug!(
            "ADF image: {:?}, {} cylinders, {} bytes",
            density,
            cylinders,
            data.len()
        );

        Ok(Self {
            data,
            density,
            cylinders,
        })
    }

    /// Blank (unformatted) image
    pub fn blank(density: Density) -> Self {
        Self {
            data: vec![0; 80 * density.cylinder_size()],
            density,
            cylinders: 80,
        }
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn cylinders(&self) -> usize {
        self.cylinders
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// File system type, if the disk carries a DOS boot block
    pub fn dos_type(&self) -> Option<DosType> {
        DosType::from_signature(&self.data)
    }

    /// Whether the stored boot block checksum matches its contents
    pub fn has_valid_boot_block(&self) -> bool {
        self.dos_type().is_some()
            && be32(&self.data, 4) == boot_block_checksum(&self.data[..2 * SECTOR_SIZE])
    }
}

/// Compute the checksum of a 1024 byte boot block
///
/// Sum of all long words with carry wrap-around, skipping the checksum
/// word itself, then inverted.
pub fn boot_block_checksum(block: &[u8]) -> u32 {
    let mut sum: u32 = 0;
    for offset in (0..2 * SECTOR_SIZE).step_by(4) {
        if offset == 4 {
            continue;
        }
        let (next, carry) = sum.overflowing_add(be32(block, offset));
        sum = next.wrapping_add(carry as u32);
    }
    !sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adf_sizes() {
        assert!(AdfFile::is_compatible(&vec![0; DD_SIZE]));
        assert!(AdfFile::is_compatible(&vec![0; DD_SIZE + 4 * DD_CYLINDER_SIZE]));
        assert!(AdfFile::is_compatible(&vec![0; HD_SIZE]));
        assert!(!AdfFile::is_compatible(&vec![0; DD_SIZE + 5 * DD_CYLINDER_SIZE]));
        assert!(!AdfFile::is_compatible(&vec![0; DD_SIZE - 1]));
        assert!(!AdfFile::is_compatible(&[]));
    }

    #[test]
    fn test_adf_geometry() {
        let adf = AdfFile::from_bytes(&vec![0; DD_SIZE + DD_CYLINDER_SIZE]).unwrap();
        assert_eq!(adf.density(), Density::Dd);
        assert_eq!(adf.cylinders(), 81);

        let adf = AdfFile::from_bytes(&vec![0; HD_SIZE]).unwrap();
        assert_eq!(adf.density(), Density::Hd);
        assert_eq!(Density::Hd.blocks(), 3520);

        assert_eq!(
            AdfFile::from_bytes(&[0; 100]).unwrap_err(),
            MediaError::TypeMismatch("ADF")
        );
    }

    #[test]
    fn test_dos_type_and_checksum() {
        let mut data = vec![0; DD_SIZE];
        data[..4].copy_from_slice(b"DOS\x01");
        data[12] = 0x4E;
        let sum = boot_block_checksum(&data[..1024]);
        data[4..8].copy_from_slice(&sum.to_be_bytes());

        let adf = AdfFile::from_vec(data).unwrap();
        assert_eq!(adf.dos_type(), Some(DosType::Ffs));
        assert!(adf.has_valid_boot_block());

        let blank = AdfFile::blank(Density::Dd);
        assert_eq!(blank.dos_type(), None);
        assert!(!blank.has_valid_boot_block());
    }
}
