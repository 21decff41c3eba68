//! Kickstart, boot and extension ROM support

use bitflags::bitflags;
use flate2::Crc;
use tracing::{debug, info};
use vb_core::MediaError;

/// Kickstart 1.x and boot ROM header
pub const ROM_HEADER_1X: [u8; 4] = [0x11, 0x11, 0x4E, 0xF9];

/// Kickstart 2.x / 3.x header
pub const ROM_HEADER_2X: [u8; 4] = [0x11, 0x14, 0x4E, 0xF9];

/// Marker of Cloanto encrypted ROM images
pub const ENCRYPTED_MARKER: &[u8] = b"AMIROMTYPE1";

const KB: usize = 1024;

/// Accepted Kickstart / boot ROM sizes
pub const ROM_SIZES: [usize; 4] = [8 * KB, 16 * KB, 256 * KB, 512 * KB];

/// Accepted extension ROM size
pub const EXT_SIZE: usize = 512 * KB;

bitflags! {
    /// Classification of a ROM image
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RomFlags: u32 {
        /// AROS Kickstart replacement
        const AROS      = 0b0000_0001;
        /// DiagROM diagnostics
        const DIAG      = 0b0000_0010;
        /// Original Commodore release
        const COMMODORE = 0b0000_0100;
        /// Hyperion release (3.1.4 and later)
        const HYPERION  = 0b0000_1000;
        /// Modified Commodore release
        const PATCHED   = 0b0001_0000;
        /// Not identified
        const UNKNOWN   = 0b0010_0000;
        /// A1000 boot ROM
        const BOOT      = 0b0100_0000;
    }
}

/// Identification of a ROM image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomDescriptor {
    pub crc32: u32,
    pub title: String,
    pub version: String,
    pub released: String,
    pub model: String,
    pub flags: RomFlags,
}

/// Known Commodore releases: crc32, title, version, released, model
const KNOWN_ROMS: &[(u32, &str, &str, &str, &str)] = &[
    (0x62F1_1C04, "Amiga 1000 Boot Rom", "", "1985", "A1000"),
    (0x2997_90FF, "Kickstart 1.0", "Rev 30.1", "September 1985", "A1000"),
    (0xD060_572A, "Kickstart 1.1", "Rev 31.34 NTSC", "November 1985", "A1000"),
    (0xEC86_DAE2, "Kickstart 1.1", "Rev 32.34 PAL", "February 1986", "A1000"),
    (0x9ED7_83D0, "Kickstart 1.2", "Rev 33.166", "September 1986", "A500/A1000/A2000"),
    (0xA6CE_1636, "Kickstart 1.2", "Rev 33.180", "October 1986", "A500/A1000/A2000"),
    (0xC4F0_F55F, "Kickstart 1.3", "Rev 34.5", "December 1987", "A500/A1000/A2000"),
    (0xC3BD_B240, "Kickstart 2.04", "Rev 37.175", "May 1991", "A500+/A2000"),
    (0x43B0_DF7B, "Kickstart 2.05", "Rev 37.350", "March 1992", "A600"),
    (0xFC24_AE0D, "Kickstart 3.1", "Rev 40.63", "July 1994", "A500/A600/A2000"),
    (0x1483_A091, "Kickstart 3.1", "Rev 40.68", "December 1993", "A1200"),
];

/// CRC-32 (IEEE) of a blob
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(data);
    crc.sum()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn has_known_header(blob: &[u8]) -> bool {
    blob.starts_with(&ROM_HEADER_1X) || blob.starts_with(&ROM_HEADER_2X)
}

impl RomDescriptor {
    /// Identify a ROM image by checksum, falling back to marker strings
    pub fn identify(blob: &[u8]) -> Self {
        let crc = crc32(blob);

        if let Some(&(_, title, version, released, model)) =
            KNOWN_ROMS.iter().find(|entry| entry.0 == crc)
        {
            let mut flags = RomFlags::COMMODORE;
            if blob.len() <= 16 * KB {
                flags |= RomFlags::BOOT;
            }
            return Self::new(crc, title, version, released, model, flags);
        }

        let (title, flags) = if contains(blob, b"AROS") {
            ("AROS Kickstart replacement", RomFlags::AROS)
        } else if contains(blob, b"DiagROM") {
            ("DiagROM", RomFlags::DIAG)
        } else if contains(blob, b"Hyperion") {
            ("Kickstart 3.1.4+", RomFlags::HYPERION)
        } else if contains(blob, b"Commodore-Amiga") {
            ("Patched Kickstart", RomFlags::COMMODORE | RomFlags::PATCHED)
        } else {
            ("Unknown ROM", RomFlags::UNKNOWN)
        };

        Self::new(crc, title, "", "", "", flags)
    }

    fn new(
        crc32: u32,
        title: &str,
        version: &str,
        released: &str,
        model: &str,
        flags: RomFlags,
    ) -> Self {
        Self {
            crc32,
            title: title.to_string(),
            version: version.to_string(),
            released: released.to_string(),
            model: model.to_string(),
            flags,
        }
    }
}

/// A validated Kickstart or boot ROM image
#[derive(Debug, Clone)]
pub struct RomFile {
    data: Vec<u8>,
}

impl RomFile {
    /// Check whether the blob is a Kickstart or boot ROM (possibly encrypted)
    pub fn is_compatible(blob: &[u8]) -> bool {
        if blob.starts_with(ENCRYPTED_MARKER) {
            return true;
        }
        ROM_SIZES.contains(&blob.len()) && has_known_header(blob)
    }

    /// Check for the Cloanto encryption marker
    pub fn is_encrypted(blob: &[u8]) -> bool {
        blob.starts_with(ENCRYPTED_MARKER)
    }

    /// Validate a ROM blob
    pub fn from_bytes(blob: &[u8]) -> Result<Self, MediaError> {
        if !Self::is_compatible(blob) {
            return Err(MediaError::TypeMismatch("ROM"));
        }
        if Self::is_encrypted(blob) {
            return Err(MediaError::EncryptedRom);
        }

        debug!("ROM image: {} KB", blob.len() / KB);
        Ok(Self {
            data: blob.to_vec(),
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn crc32(&self) -> u32 {
        crc32(&self.data)
    }

    /// Whether this is an 8 or 16 KB A1000 boot ROM
    pub fn is_boot_rom(&self) -> bool {
        self.data.len() <= 16 * KB
    }

    pub fn descriptor(&self) -> RomDescriptor {
        let descriptor = RomDescriptor::identify(&self.data);
        info!(
            "Identified ROM {:08X}: {} {}",
            descriptor.crc32, descriptor.title, descriptor.version
        );
        descriptor
    }
}

/// A validated extension ROM image
#[derive(Debug, Clone)]
pub struct ExtRomFile {
    data: Vec<u8>,
}

impl ExtRomFile {
    pub fn is_compatible(blob: &[u8]) -> bool {
        blob.len() == EXT_SIZE && has_known_header(blob)
    }

    pub fn from_bytes(blob: &[u8]) -> Result<Self, MediaError> {
        if !Self::is_compatible(blob) {
            return Err(MediaError::TypeMismatch("extension ROM"));
        }
        Ok(Self {
            data: blob.to_vec(),
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn crc32(&self) -> u32 {
        crc32(&self.data)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 256 KB image with a 1.x header and an optional marker string
    pub(crate) fn sample_rom(marker: &[u8]) -> Vec<u8> {
        let mut rom = vec![0u8; 256 * KB];
        rom[..4].copy_from_slice(&ROM_HEADER_1X);
        rom[0x100..0x100 + marker.len()].copy_from_slice(marker);
        rom
    }

    #[test]
    fn test_rom_detection() {
        assert!(RomFile::is_compatible(&sample_rom(b"")));
        assert!(!RomFile::is_compatible(&vec![0u8; 256 * KB]));
        assert!(!RomFile::is_compatible(&sample_rom(b"")[..100 * KB]));

        let mut boot = vec![0u8; 16 * KB];
        boot[..4].copy_from_slice(&ROM_HEADER_1X);
        let boot = RomFile::from_bytes(&boot).unwrap();
        assert!(boot.is_boot_rom());
    }

    #[test]
    fn test_encrypted_rom() {
        let mut blob = b"AMIROMTYPE1".to_vec();
        blob.extend(vec![0u8; 256 * KB]);
        assert!(RomFile::is_compatible(&blob));
        assert_eq!(RomFile::from_bytes(&blob).unwrap_err(), MediaError::EncryptedRom);
    }

    #[test]
    fn test_rom_heuristics() {
        let aros = RomDescriptor::identify(&sample_rom(b"AROS"));
        assert_eq!(aros.flags, RomFlags::AROS);

        let diag = RomDescriptor::identify(&sample_rom(b"DiagROM"));
        assert_eq!(diag.flags, RomFlags::DIAG);

        let patched = RomDescriptor::identify(&sample_rom(b"Commodore-Amiga"));
        assert!(patched.flags.contains(RomFlags::PATCHED | RomFlags::COMMODORE));

        let unknown = RomDescriptor::identify(&sample_rom(b""));
        assert_eq!(unknown.flags, RomFlags::UNKNOWN);
        assert_eq!(unknown.crc32, crc32(&sample_rom(b"")));
    }

    #[test]
    fn test_crc32() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_ext_rom() {
        let mut ext = vec![0u8; EXT_SIZE];
        ext[..4].copy_from_slice(&ROM_HEADER_2X);
        assert!(ExtRomFile::from_bytes(&ext).is_ok());
        assert!(ExtRomFile::from_bytes(&sample_rom(b"")).is_err());
    }
}
