//! Decoding pipeline tests through the public API

use vb_media::adf::{boot_block_checksum, DD_SIZE, HD_SIZE, SECTOR_SIZE};
use vb_media::ofs::name_hash;
use vb_media::rom::{ROM_HEADER_1X, ROM_HEADER_2X};
use vb_media::{DiskFormat, DiskImage, DosType, RomDescriptor, RomFile, RomFlags};

fn long(data: &[u8], block: usize, offset: usize) -> u32 {
    let at = block * SECTOR_SIZE + offset;
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn hunk_exe(code_longs: u32) -> Vec<u8> {
    let mut longs = vec![0x3F3, 0, 1, 0, 0, code_longs, 0x3E9, code_longs];
    longs.extend((0..code_longs).map(|i| 0x7000_0000 | i));
    longs.push(0x3F2);
    longs.iter().flat_map(|l: &u32| l.to_be_bytes()).collect()
}

/// Find `name` in directory block `dir` by following its hash chain
fn lookup(data: &[u8], dir: usize, name: &str) -> Option<usize> {
    let mut block = long(data, dir, 24 + 4 * name_hash(name)) as usize;
    while block != 0 {
        let start = block * SECTOR_SIZE + SECTOR_SIZE - 80;
        let len = data[start] as usize;
        if &data[start + 1..start + 1 + len] == name.as_bytes() {
            return Some(block);
        }
        block = long(data, block, SECTOR_SIZE - 16) as usize;
    }
    None
}

fn read_file(data: &[u8], header: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut block = long(data, header, 16) as usize;
    while block != 0 {
        let size = long(data, block, 12) as usize;
        let start = block * SECTOR_SIZE + 24;
        out.extend_from_slice(&data[start..start + size]);
        block = long(data, block, 16) as usize;
    }
    out
}

#[test]
fn test_exe_boots_from_ofs() {
    let exe = hunk_exe(300);
    let image = DiskImage::decode(&exe).unwrap().unwrap();
    assert_eq!(image.format(), DiskFormat::Exe);

    let floppy = image.into_floppy().unwrap();
    let data = floppy.data();
    assert_eq!(data.len(), DD_SIZE);
    assert_eq!(floppy.info().dos_type, Some(DosType::Ofs));
    assert_eq!(long(data, 0, 4), boot_block_checksum(&data[..2 * SECTOR_SIZE]));

    let root = 880;
    let sum = (0..SECTOR_SIZE)
        .step_by(4)
        .fold(0u32, |acc, offset| acc.wrapping_add(long(data, root, offset)));
    assert_eq!(sum, 0);

    let dir = lookup(data, root, "s").unwrap();
    let startup = lookup(data, dir, "startup-sequence").unwrap();
    assert_eq!(read_file(data, startup), b"file\n");

    let file = lookup(data, root, "file").unwrap();
    assert_eq!(long(data, file, SECTOR_SIZE - 188) as usize, exe.len());
    assert_eq!(read_file(data, file), exe);
}

#[test]
fn test_large_exe_needs_hd() {
    let exe = hunk_exe(260_000);
    let floppy = DiskImage::decode(&exe).unwrap().unwrap().into_floppy().unwrap();
    assert_eq!(floppy.data().len(), HD_SIZE);
}

#[test]
fn test_unknown_blobs_are_not_errors() {
    assert!(DiskImage::decode(&[]).unwrap().is_none());
    assert!(DiskImage::decode(&vec![0u8; DD_SIZE - 1]).unwrap().is_none());
    assert!(DiskImage::decode(b"DMS").unwrap().is_none());
}

#[test]
fn test_rom_identification() {
    let mut aros = vec![0u8; 512 * 1024];
    aros[..4].copy_from_slice(&ROM_HEADER_2X);
    aros[0x100..0x104].copy_from_slice(b"AROS");
    let rom = RomFile::from_bytes(&aros).unwrap();
    assert!(!rom.is_boot_rom());
    assert_eq!(rom.descriptor().flags, RomFlags::AROS);

    let mut boot = vec![0u8; 8 * 1024];
    boot[..4].copy_from_slice(&ROM_HEADER_1X);
    assert!(RomFile::from_bytes(&boot).unwrap().is_boot_rom());

    let descriptor = RomDescriptor::identify(&boot);
    assert_eq!(descriptor.flags, RomFlags::UNKNOWN);
    assert_eq!(descriptor.crc32, vb_media::rom::crc32(&boot));
}
