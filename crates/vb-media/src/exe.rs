//! AmigaDOS hunk executable support
//!
//! Executables are not disk images on their own. They are wrapped into a
//! bootable OFS floppy whose startup-sequence runs the program.

use crate::adf::{AdfFile, Density};
use crate::be32;
use crate::ofs::OfsBuilder;
use tracing::{debug, info};
use vb_core::MediaError;

/// Magic long word opening every load file
pub const HUNK_HEADER: u32 = 0x0000_03F3;

/// Memory requirement flags stored in the top two bits of a hunk size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkMemory {
    Any,
    Chip,
    Fast,
    /// Explicit attribute long word follows the size
    Custom(u32),
}

/// One entry of the hunk size table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkInfo {
    /// Size in bytes
    pub size: usize,
    pub memory: HunkMemory,
}

/// A parsed hunk executable
#[derive(Debug, Clone)]
pub struct ExeFile {
    data: Vec<u8>,
    libraries: Vec<String>,
    hunks: Vec<HunkInfo>,
}

/// Bounds-checked long word cursor over the executable header
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn long(&mut self) -> Result<u32, MediaError> {
        if self.pos + 4 > self.data.len() {
            return Err(MediaError::Corrupted("truncated hunk header".to_string()));
        }
        let value = be32(self.data, self.pos);
        self.pos += 4;
        Ok(value)
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], MediaError> {
        if self.pos + len > self.data.len() {
            return Err(MediaError::Corrupted("truncated hunk header".to_string()));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

impl ExeFile {
    /// Check for the hunk header magic
    pub fn is_compatible(blob: &[u8]) -> bool {
        blob.len() >= 4 && be32(blob, 0) == HUNK_HEADER
    }

    /// Parse the header of a hunk executable
    pub fn from_bytes(blob: &[u8]) -> Result<Self, MediaError> {
        if !Self::is_compatible(blob) {
            return Err(MediaError::TypeMismatch("EXE"));
        }

        let mut cursor = Cursor { data: blob, pos: 4 };

        // Resident library names, terminated by a zero length
        let mut libraries = Vec::new();
        loop {
            let longs = cursor.long()? as usize;
            if longs == 0 {
                break;
            }
            let name = cursor.bytes(longs * 4)?;
            let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
            libraries.push(String::from_utf8_lossy(&name[..end]).into_owned());
        }

        let table_size = cursor.long()? as usize;
        let first = cursor.long()? as usize;
        let last = cursor.long()? as usize;
        if last < first || last >= table_size {
            return Err(MediaError::Corrupted(format!(
                "invalid hunk range {}..={} (table size {})",
                first, last, table_size
            )));
        }

        let count = last - first + 1;
        if count.saturating_mul(4) > cursor.remaining() {
            return Err(MediaError::Corrupted(format!(
                "hunk table of {} entries exceeds the file",
                count
            )));
        }

        let mut hunks = Vec::with_capacity(count);
        for _ in first..=last {
            let raw = cursor.long()?;
            let memory = match raw >> 30 {
                0 => HunkMemory::Any,
                1 => HunkMemory::Chip,
                2 => HunkMemory::Fast,
                _ => HunkMemory::Custom(cursor.long()?),
            };
            hunks.push(HunkInfo {
                size: ((raw & 0x3FFF_FFFF) as usize) * 4,
                memory,
            });
        }

        debug!(
            "Hunk executable: {} bytes, {} hunks, {} resident libraries",
            blob.len(),
            hunks.len(),
            libraries.len()
        );

        Ok(Self {
            data: blob.to_vec(),
            libraries,
            hunks,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    pub fn hunks(&self) -> &[HunkInfo] {
        &self.hunks
    }

    /// Wrap the executable into a bootable OFS disk
    ///
    /// The program is stored as `file` and started from
    /// `s/startup-sequence`. A DD disk is used when everything fits,
    /// otherwise an HD disk.
    pub fn to_adf(&self) -> Result<AdfFile, MediaError> {
        let density = if OfsBuilder::fits(Density::Dd, self.data.len()) {
            Density::Dd
        } else {
            Density::Hd
        };

        let mut builder = OfsBuilder::new(density, "Disk");
        let s = builder.create_dir(None, "s")?;
        builder.create_file(Some(s), "startup-sequence", b"file\n")?;
        builder.create_file(None, "file", &self.data)?;
        let adf = builder.finish()?;

        info!(
            "Converted executable ({} bytes) to a bootable {:?} disk",
            self.data.len(),
            density
        );
        Ok(adf)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal executable: one code hunk of `code_longs` long words
    pub(crate) fn sample_exe(code_longs: usize) -> Vec<u8> {
        let mut longs = vec![HUNK_HEADER, 0, 1, 0, 0, code_longs as u32];
        longs.push(0x3E9); // HUNK_CODE
        longs.push(code_longs as u32);
        longs.extend(std::iter::repeat(0x4E75_4E75).take(code_longs));
        longs.push(0x3F2); // HUNK_END
        longs.iter().flat_map(|l| l.to_be_bytes()).collect()
    }

    #[test]
    fn test_exe_detection() {
        assert!(ExeFile::is_compatible(&sample_exe(4)));
        assert!(!ExeFile::is_compatible(&[0, 0, 3]));
        assert!(!ExeFile::is_compatible(b"DMS!"));
    }

    #[test]
    fn test_exe_header() {
        let exe = ExeFile::from_bytes(&sample_exe(4)).unwrap();
        assert!(exe.libraries().is_empty());
        assert_eq!(exe.hunks().len(), 1);
        assert_eq!(exe.hunks()[0].size, 16);
        assert_eq!(exe.hunks()[0].memory, HunkMemory::Any);
    }

    #[test]
    fn test_exe_truncated() {
        let blob = &sample_exe(4)[..12];
        assert!(matches!(
            ExeFile::from_bytes(blob),
            Err(MediaError::Corrupted(_))
        ));
    }

    #[test]
    fn test_oversized_hunk_table() {
        let longs = [HUNK_HEADER, 0, 0xFFFF_FFFF, 0, 0xFFFF_FFFE];
        let blob: Vec<u8> = longs.iter().flat_map(|l| l.to_be_bytes()).collect();
        assert!(matches!(
            ExeFile::from_bytes(&blob),
            Err(MediaError::Corrupted(_))
        ));
    }

    #[test]
    fn test_exe_to_adf() {
        let adf = ExeFile::from_bytes(&sample_exe(64)).unwrap().to_adf().unwrap();
        assert_eq!(adf.density(), Density::Dd);
        assert!(adf.has_valid_boot_block());
    }

    #[test]
    fn test_large_exe_uses_hd() {
        let exe = ExeFile::from_bytes(&sample_exe(250_000)).unwrap();
        let adf = exe.to_adf().unwrap();
        assert_eq!(adf.density(), Density::Hd);

        let huge = ExeFile::from_bytes(&sample_exe(500_000)).unwrap();
        assert!(matches!(huge.to_adf(), Err(MediaError::DiskFull { .. })));
    }
}
