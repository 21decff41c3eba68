//! Floppy disk container and format sniffing

use crate::adf::{AdfFile, Density, DosType};
use crate::dms::DmsFile;
use crate::exe::ExeFile;
use tracing::debug;
use vb_core::MediaError;

/// Container format a disk was created from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiskFormat {
    Adf,
    Exe,
    Dms,
}

impl DiskFormat {
    /// Sniffing priority
    pub const PRIORITY: [DiskFormat; 3] = [DiskFormat::Adf, DiskFormat::Exe, DiskFormat::Dms];

    pub fn name(self) -> &'static str {
        match self {
            DiskFormat::Adf => "ADF",
            DiskFormat::Exe => "EXE",
            DiskFormat::Dms => "DMS",
        }
    }

    /// Cheap signature / size check for this format
    pub fn matches(self, blob: &[u8]) -> bool {
        match self {
            DiskFormat::Adf => AdfFile::is_compatible(blob),
            DiskFormat::Exe => ExeFile::is_compatible(blob),
            DiskFormat::Dms => DmsFile::is_compatible(blob),
        }
    }
}

impl std::fmt::Display for DiskFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded disk image candidate
#[derive(Debug, Clone)]
pub enum DiskImage {
    Adf(AdfFile),
    Exe(ExeFile),
    Dms(DmsFile),
}

impl DiskImage {
    /// First format in priority order whose check accepts the blob
    pub fn sniff(blob: &[u8]) -> Option<DiskFormat> {
        DiskFormat::PRIORITY
            .into_iter()
            .find(|format| format.matches(blob))
    }

    /// Sniff and decode a blob
    ///
    /// Returns `Ok(None)` when no known format matches.
    pub fn decode(blob: &[u8]) -> Result<Option<Self>, MediaError> {
        let Some(format) = Self::sniff(blob) else {
            debug!("No disk format matches a {} byte blob", blob.len());
            return Ok(None);
        };

        let image = match format {
            DiskFormat::Adf => DiskImage::Adf(AdfFile::from_bytes(blob)?),
            DiskFormat::Exe => DiskImage::Exe(ExeFile::from_bytes(blob)?),
            DiskFormat::Dms => DiskImage::Dms(DmsFile::from_bytes(blob)?),
        };
        Ok(Some(image))
    }

    pub fn format(&self) -> DiskFormat {
        match self {
            DiskImage::Adf(_) => DiskFormat::Adf,
            DiskImage::Exe(_) => DiskFormat::Exe,
            DiskImage::Dms(_) => DiskFormat::Dms,
        }
    }

    /// Build the in-memory floppy for this image
    pub fn into_floppy(self) -> Result<FloppyDisk, MediaError> {
        let format = self.format();
        let adf = match self {
            DiskImage::Adf(adf) => adf,
            DiskImage::Exe(exe) => exe.to_adf()?,
            DiskImage::Dms(dms) => dms.into_adf(),
        };
        Ok(FloppyDisk::from_adf(format, adf))
    }
}

/// Summary of an inserted disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskInfo {
    pub origin: DiskFormat,
    pub density: Density,
    pub cylinders: usize,
    pub bytes: usize,
    pub dos_type: Option<DosType>,
    pub write_protected: bool,
}

/// A floppy disk as held by a drive slot
#[derive(Debug, Clone)]
pub struct FloppyDisk {
    origin: DiskFormat,
    adf: AdfFile,
    write_protected: bool,
}

impl FloppyDisk {
    pub fn from_adf(origin: DiskFormat, adf: AdfFile) -> Self {
        Self {
            origin,
            adf,
            write_protected: false,
        }
    }

    pub fn origin(&self) -> DiskFormat {
        self.origin
    }

    pub fn density(&self) -> Density {
        self.adf.density()
    }

    pub fn data(&self) -> &[u8] {
        self.adf.data()
    }

    pub fn is_write_protected(&self) -> bool {
        self.write_protected
    }

    pub fn set_write_protection(&mut self, value: bool) {
        self.write_protected = value;
    }

    pub fn info(&self) -> DiskInfo {
        DiskInfo {
            origin: self.origin,
            density: self.adf.density(),
            cylinders: self.adf.cylinders(),
            bytes: self.adf.data().len(),
            dos_type: self.adf.dos_type(),
            write_protected: self.write_protected,
        }
    }
}
