//! DiskMasher (DMS) archive support
//!
//! A DMS archive is a 56 byte file header followed by one record per
//! track. Each record has a 20 byte `TR` header and packed track data.
//! Only the stored and run-length modes are decoded.

use crate::adf::{AdfFile, Density, DD_CYLINDER_SIZE};
use crate::be16;
use tracing::{debug, trace, warn};
use vb_core::MediaError;

/// Archive signature
pub const DMS_MAGIC: &[u8; 4] = b"DMS!";

/// Size of the file header
pub const FILE_HEADER_SIZE: usize = 56;

/// Size of a track header
pub const TRACK_HEADER_SIZE: usize = 20;

/// Run-length escape byte
const RLE_MARKER: u8 = 0x90;

/// Tracks at or beyond this number carry banners, not disk data
const MAX_TRACK: usize = 80;

/// General info flag marking an encrypted archive
const INFO_ENCRYPTED: u16 = 0x0002;

/// Track compression mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmsMode {
    None,
    Simple,
    Quick,
    Medium,
    Deep,
    Heavy1,
    Heavy2,
}

impl DmsMode {
    fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => DmsMode::None,
            1 => DmsMode::Simple,
            2 => DmsMode::Quick,
            3 => DmsMode::Medium,
            4 => DmsMode::Deep,
            5 => DmsMode::Heavy1,
            6 => DmsMode::Heavy2,
            _ => return None,
        })
    }
}

/// CRC-16 as used by DMS (reflected polynomial 0xA001, zero init)
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xA001 } else { crc >> 1 };
        }
    }
    crc
}

/// Expand run-length encoded track data into `out`
fn unpack_rle(input: &[u8], out: &mut Vec<u8>, expected: usize) -> Result<(), MediaError> {
    let corrupted = || MediaError::Corrupted("RLE stream ends prematurely".to_string());
    let mut iter = input.iter().copied();

    while out.len() < expected {
        let a = iter.next().ok_or_else(corrupted)?;
        if a != RLE_MARKER {
            out.push(a);
            continue;
        }
        let b = iter.next().ok_or_else(corrupted)?;
        if b == 0 {
            out.push(RLE_MARKER);
            continue;
        }
        let value = iter.next().ok_or_else(corrupted)?;
        let count = if b == 0xFF {
            let hi = iter.next().ok_or_else(corrupted)?;
            let lo = iter.next().ok_or_else(corrupted)?;
            u16::from_be_bytes([hi, lo]) as usize
        } else {
            b as usize
        };
        if out.len() + count > expected {
            return Err(MediaError::Corrupted("RLE run exceeds track size".to_string()));
        }
        out.extend(std::iter::repeat(value).take(count));
    }
    Ok(())
}

/// Copy a DD image into an HD sized one, moving every written track to its
/// HD offset
fn relocate_to_hd(data: &[u8], written: &[usize]) -> Vec<u8> {
    let hd_size = Density::Hd.cylinder_size();
    let mut hd = vec![0u8; 80 * hd_size];
    for &number in written {
        let src = number * DD_CYLINDER_SIZE;
        let dst = number * hd_size;
        hd[dst..dst + DD_CYLINDER_SIZE].copy_from_slice(&data[src..src + DD_CYLINDER_SIZE]);
    }
    trace!("DMS: moved {} tracks into an HD image", written.len());
    hd
}

/// A decoded DMS archive
#[derive(Debug, Clone)]
pub struct DmsFile {
    adf: AdfFile,
    tracks: usize,
}

impl DmsFile {
    /// Check for the archive signature
    pub fn is_compatible(blob: &[u8]) -> bool {
        blob.len() >= FILE_HEADER_SIZE && blob.starts_with(DMS_MAGIC)
    }

    /// Verify and unpack every track of the archive
    pub fn from_bytes(blob: &[u8]) -> Result<Self, MediaError> {
        if !Self::is_compatible(blob) {
            return Err(MediaError::TypeMismatch("DMS"));
        }

        if crc16(&blob[4..54]) != be16(blob, 54) {
            return Err(MediaError::Corrupted("DMS header checksum mismatch".to_string()));
        }
        if be16(blob, 10) & INFO_ENCRYPTED != 0 {
            return Err(MediaError::Unsupported("encrypted DMS archive".to_string()));
        }

        debug!(
            "DMS archive: tracks {}..={}",
            be16(blob, 16),
            be16(blob, 18)
        );

        let mut density = Density::Dd;
        let mut data = vec![0u8; 80 * DD_CYLINDER_SIZE];
        let mut written = Vec::new();
        let mut pos = FILE_HEADER_SIZE;

        while pos + TRACK_HEADER_SIZE <= blob.len() {
            let header = &blob[pos..pos + TRACK_HEADER_SIZE];
            if &header[..2] != b"TR" {
                break;
            }
            if crc16(&header[..18]) != be16(header, 18) {
                return Err(MediaError::Corrupted(format!(
                    "track header checksum mismatch at offset {}",
                    pos
                )));
            }

            let number = be16(header, 2) as usize;
            let packed_len = be16(header, 6) as usize;
            let unpacked_len = be16(header, 10) as usize;
            let mode = header[13];
            let sum = be16(header, 14);
            let data_crc = be16(header, 16);

            let start = pos + TRACK_HEADER_SIZE;
            let end = start + packed_len;
            if end > blob.len() {
                return Err(MediaError::Corrupted(format!("track {} is truncated", number)));
            }
            let packed = &blob[start..end];
            pos = end;

            if number >= MAX_TRACK {
                trace!("DMS: skipping banner track {}", number);
                continue;
            }
            if crc16(packed) != data_crc {
                return Err(MediaError::Corrupted(format!(
                    "track {} data checksum mismatch",
                    number
                )));
            }

            let mut track = Vec::with_capacity(unpacked_len);
            match DmsMode::from_raw(mode) {
                Some(DmsMode::None) => {
                    if packed.len() < unpacked_len {
                        return Err(MediaError::Corrupted(format!(
                            "track {} is shorter than its unpacked size",
                            number
                        )));
                    }
                    track.extend_from_slice(&packed[..unpacked_len]);
                }
                Some(DmsMode::Simple) => unpack_rle(packed, &mut track, unpacked_len)?,
                Some(other) => {
                    return Err(MediaError::Unsupported(format!(
                        "DMS compression mode {:?}",
                        other
                    )))
                }
                None => {
                    return Err(MediaError::Unsupported(format!(
                        "unknown DMS compression mode {}",
                        mode
                    )))
                }
            }

            let actual = track.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
            if actual != sum {
                return Err(MediaError::Corrupted(format!(
                    "track {} byte sum mismatch",
                    number
                )));
            }

            if unpacked_len == Density::Hd.cylinder_size() && density == Density::Dd {
                density = Density::Hd;
                data = relocate_to_hd(&data, &written);
            }
            let track_size = density.cylinder_size();
            if unpacked_len != track_size {
                warn!(
                    "DMS: track {} has unexpected size {} (expected {})",
                    number, unpacked_len, track_size
                );
            }

            let offset = number * track_size;
            let len = track.len().min(track_size);
            data[offset..offset + len].copy_from_slice(&track[..len]);
            written.push(number);
        }

        let tracks = written.len();
        if tracks == 0 {
            return Err(MediaError::Corrupted("DMS archive contains no tracks".to_string()));
        }

        debug!("DMS archive: {} tracks unpacked ({:?})", tracks, density);

        Ok(Self {
            adf: AdfFile::from_vec(data)?,
            tracks,
        })
    }

    /// Number of disk tracks contained in the archive
    pub fn tracks(&self) -> usize {
        self.tracks
    }

    pub fn adf(&self) -> &AdfFile {
        &self.adf
    }

    pub fn into_adf(self) -> AdfFile {
        self.adf
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn file_header() -> Vec<u8> {
        let mut header = vec![0u8; FILE_HEADER_SIZE];
        header[..4].copy_from_slice(DMS_MAGIC);
        header[18..20].copy_from_slice(&79u16.to_be_bytes());
        let crc = crc16(&header[4..54]);
        header[54..56].copy_from_slice(&crc.to_be_bytes());
        header
    }

    fn track(number: u16, mode: u8, packed: &[u8], unpacked: &[u8]) -> Vec<u8> {
        let mut header = vec![0u8; TRACK_HEADER_SIZE];
        header[..2].copy_from_slice(b"TR");
        header[2..4].copy_from_slice(&number.to_be_bytes());
        header[6..8].copy_from_slice(&(packed.len() as u16).to_be_bytes());
        header[8..10].copy_from_slice(&(packed.len() as u16).to_be_bytes());
        header[10..12].copy_from_slice(&(unpacked.len() as u16).to_be_bytes());
        header[13] = mode;
        let sum = unpacked.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
        header[14..16].copy_from_slice(&sum.to_be_bytes());
        header[16..18].copy_from_slice(&crc16(packed).to_be_bytes());
        let crc = crc16(&header[..18]);
        header[18..20].copy_from_slice(&crc.to_be_bytes());
        header.extend_from_slice(packed);
        header
    }

    /// Archive with a stored track 0 and an RLE packed track 1
    pub(crate) fn sample_dms() -> Vec<u8> {
        let track0: Vec<u8> = (0..DD_CYLINDER_SIZE).map(|i| (i % 7) as u8).collect();

        // 0x90 literal, then a long run of 0xAA
        let mut track1 = vec![RLE_MARKER];
        track1.extend(std::iter::repeat(0xAA).take(DD_CYLINDER_SIZE - 1));
        let mut packed1 = vec![RLE_MARKER, 0x00, RLE_MARKER, 0xFF, 0xAA];
        packed1.extend_from_slice(&((DD_CYLINDER_SIZE - 1) as u16).to_be_bytes());

        let mut blob = file_header();
        blob.extend(track(0, 0, &track0, &track0));
        blob.extend(track(1, 1, &packed1, &track1));
        blob.extend(track(0xFFFF, 0, b"banner", b"banner"));
        blob
    }

    #[test]
    fn test_crc16() {
        assert_eq!(crc16(b""), 0);
        // CRC-16/ARC check value
        assert_eq!(crc16(b"123456789"), 0xBB3D);
    }

    #[test]
    fn test_rle() {
        let mut out = Vec::new();
        unpack_rle(&[1, RLE_MARKER, 0, RLE_MARKER, 3, 7, 2], &mut out, 6).unwrap();
        assert_eq!(out, vec![1, RLE_MARKER, 7, 7, 7, 2]);

        let mut out = Vec::new();
        assert!(unpack_rle(&[RLE_MARKER, 3], &mut out, 3).is_err());
    }

    #[test]
    fn test_dms_decode() {
        let blob = sample_dms();
        assert!(DmsFile::is_compatible(&blob));

        let dms = DmsFile::from_bytes(&blob).unwrap();
        assert_eq!(dms.tracks(), 2);
        let data = dms.adf().data();
        assert_eq!(data[1], 1);
        assert_eq!(data[DD_CYLINDER_SIZE], RLE_MARKER);
        assert_eq!(data[2 * DD_CYLINDER_SIZE - 1], 0xAA);
        assert_eq!(data[2 * DD_CYLINDER_SIZE], 0);
    }

    #[test]
    fn test_hd_track_after_dd_tracks() {
        let hd_size = Density::Hd.cylinder_size();
        let dd_track = vec![0x11u8; DD_CYLINDER_SIZE];
        let hd_track = vec![0x22u8; hd_size];

        let mut blob = file_header();
        blob.extend(track(1, 0, &dd_track, &dd_track));
        blob.extend(track(2, 0, &hd_track, &hd_track));

        let dms = DmsFile::from_bytes(&blob).unwrap();
        assert_eq!(dms.tracks(), 2);
        assert_eq!(dms.adf().density(), Density::Hd);

        let data = dms.adf().data();
        assert_eq!(data[DD_CYLINDER_SIZE], 0);
        assert_eq!(data[hd_size], 0x11);
        assert_eq!(data[hd_size + DD_CYLINDER_SIZE - 1], 0x11);
        assert_eq!(data[hd_size + DD_CYLINDER_SIZE], 0);
        assert_eq!(data[2 * hd_size], 0x22);
        assert_eq!(data[3 * hd_size - 1], 0x22);
    }

    #[test]
    fn test_dms_corruption() {
        let mut blob = sample_dms();
        blob[FILE_HEADER_SIZE + TRACK_HEADER_SIZE + 5] ^= 0xFF;
        assert!(matches!(
            DmsFile::from_bytes(&blob),
            Err(MediaError::Corrupted(_))
        ));

        let mut blob = sample_dms();
        blob[20] = 1;
        assert!(matches!(
            DmsFile::from_bytes(&blob),
            Err(MediaError::Corrupted(_))
        ));
    }

    #[test]
    fn test_dms_unsupported() {
        let mut blob = file_header();
        blob[11] = INFO_ENCRYPTED as u8;
        let crc = crc16(&blob[4..54]);
        blob[54..56].copy_from_slice(&crc.to_be_bytes());
        assert!(matches!(
            DmsFile::from_bytes(&blob),
            Err(MediaError::Unsupported(_))
        ));

        let mut blob = file_header();
        blob.extend(track(0, 4, b"packed", b"packed"));
        assert!(matches!(
            DmsFile::from_bytes(&blob),
            Err(MediaError::Unsupported(_))
        ));
    }
}
