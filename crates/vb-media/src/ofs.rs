//! Old File System (OFS) volume builder
//!
//! Produces a freshly formatted OFS volume and populates it with
//! directories and files. Used to turn executables into bootable disks.

use crate::adf::{boot_block_checksum, AdfFile, Density, SECTOR_SIZE};
use crate::be32;
use tracing::trace;
use vb_core::MediaError;

const BSIZE: usize = SECTOR_SIZE;

/// Number of hash table entries (and data block pointers) per block
pub const HASH_TABLE_SIZE: usize = 72;

/// Payload bytes in an OFS data block
pub const DATA_BLOCK_PAYLOAD: usize = BSIZE - 24;

// Primary block types
const T_HEADER: u32 = 2;
const T_DATA: u32 = 8;
const T_LIST: u32 = 16;

// Secondary block types
const ST_ROOT: u32 = 1;
const ST_USERDIR: u32 = 2;
const ST_FILE: u32 = (-3i32) as u32;

// Byte offsets inside header blocks
const OFF_HEADER_KEY: usize = 4;
const OFF_HIGH_SEQ: usize = 8;
const OFF_HT_SIZE: usize = 12;
const OFF_FIRST_DATA: usize = 16;
const OFF_CHECKSUM: usize = 20;
const OFF_TABLE: usize = 24;
const OFF_BM_FLAG: usize = BSIZE - 200;
const OFF_BM_PAGES: usize = BSIZE - 196;
const OFF_BYTE_SIZE: usize = BSIZE - 188;
const OFF_NAME: usize = BSIZE - 80;
const OFF_NEXT_HASH: usize = BSIZE - 16;
const OFF_PARENT: usize = BSIZE - 12;
const OFF_EXTENSION: usize = BSIZE - 8;
const OFF_SEC_TYPE: usize = BSIZE - 4;

const MAX_NAME_LEN: usize = 30;

/// Kickstart 1.x boot code: open dos.library and return its init vector
const BOOT_CODE: [u8; 38] = [
    0x43, 0xFA, 0x00, 0x18, 0x4E, 0xAE, 0xFF, 0xA0, 0x4A, 0x80, 0x67, 0x0A, 0x20, 0x40, 0x20,
    0x68, 0x00, 0x16, 0x70, 0x00, 0x4E, 0x75, 0x70, 0xFF, 0x60, 0xFA, b'd', b'o', b's', b'.',
    b'l', b'i', b'b', b'r', b'a', b'r', b'y', 0x00,
];

/// Hash of a file name (non-international mode)
pub fn name_hash(name: &str) -> usize {
    let mut hash = name.len() as u32;
    for c in name.bytes() {
        hash = (hash.wrapping_mul(13) + c.to_ascii_uppercase() as u32) & 0x7FF;
    }
    hash as usize % HASH_TABLE_SIZE
}

/// Blocks occupied by a file of `len` bytes (header, extensions, data)
pub fn file_blocks(len: usize) -> usize {
    let data = len.div_ceil(DATA_BLOCK_PAYLOAD);
    let extensions = data.saturating_sub(HASH_TABLE_SIZE).div_ceil(HASH_TABLE_SIZE);
    1 + data + extensions
}

/// Builds an OFS volume block by block
pub struct OfsBuilder {
    density: Density,
    data: Vec<u8>,
    used: Vec<bool>,
    root: usize,
    bitmap: usize,
}

impl OfsBuilder {
    /// Format an empty volume
    pub fn new(density: Density, volume_name: &str) -> Self {
        let blocks = density.blocks();
        let root = blocks / 2;
        let bitmap = root + 1;

        let mut builder = Self {
            density,
            data: vec![0; blocks * BSIZE],
            used: vec![false; blocks],
            root,
            bitmap,
        };
        for block in [0, 1, root, bitmap] {
            builder.used[block] = true;
        }

        // Boot block
        builder.data[..4].copy_from_slice(b"DOS\0");
        builder.put(0, 8, root as u32);
        builder.data[12..12 + BOOT_CODE.len()].copy_from_slice(&BOOT_CODE);

        // Root block
        builder.put(root, 0, T_HEADER);
        builder.put(root, OFF_HT_SIZE, HASH_TABLE_SIZE as u32);
        builder.put(root, OFF_BM_FLAG, 0xFFFF_FFFF);
        builder.put(root, OFF_BM_PAGES, bitmap as u32);
        builder.put_name(root, volume_name);
        builder.put(root, OFF_SEC_TYPE, ST_ROOT);

        builder
    }

    /// Whether an executable of `len` bytes plus its startup-sequence fits
    pub fn fits(density: Density, len: usize) -> bool {
        let needed = 1 + file_blocks(5) + file_blocks(len);
        needed <= density.blocks() - 4
    }

    /// Number of unallocated blocks
    pub fn free_blocks(&self) -> usize {
        self.used.iter().filter(|used| !**used).count()
    }

    /// Create a directory below `parent` (the root when `None`)
    pub fn create_dir(&mut self, parent: Option<usize>, name: &str) -> Result<usize, MediaError> {
        let parent = parent.unwrap_or(self.root);
        let block = self.allocate().ok_or(MediaError::DiskFull {
            needed: 1,
            available: 0,
        })?;

        self.put(block, 0, T_HEADER);
        self.put(block, OFF_HEADER_KEY, block as u32);
        self.put_name(block, name);
        self.put(block, OFF_PARENT, parent as u32);
        self.put(block, OFF_SEC_TYPE, ST_USERDIR);
        self.link(parent, block, name);

        trace!("OFS: directory '{}' at block {}", name, block);
        Ok(block)
    }

    /// Create a file below `parent` (the root when `None`)
    pub fn create_file(
        &mut self,
        parent: Option<usize>,
        name: &str,
        contents: &[u8],
    ) -> Result<usize, MediaError> {
        let parent = parent.unwrap_or(self.root);
        let needed = file_blocks(contents.len());
        let available = self.free_blocks();
        if needed > available {
            return Err(MediaError::DiskFull { needed, available });
        }

        let header = self.claim()?;
        self.put(header, 0, T_HEADER);
        self.put(header, OFF_HEADER_KEY, header as u32);
        self.put(header, OFF_BYTE_SIZE, contents.len() as u32);
        self.put_name(header, name);
        self.put(header, OFF_PARENT, parent as u32);
        self.put(header, OFF_SEC_TYPE, ST_FILE);

        // Data blocks, chained through next_data
        let chunks: Vec<&[u8]> = contents.chunks(DATA_BLOCK_PAYLOAD).collect();
        let mut data_blocks = Vec::with_capacity(chunks.len());
        let mut list_block = header;
        let mut list_fill = 0;

        for (seq, chunk) in chunks.iter().enumerate() {
            if list_fill == HASH_TABLE_SIZE {
                let ext = self.claim()?;
                self.put(ext, 0, T_LIST);
                self.put(ext, OFF_HEADER_KEY, ext as u32);
                self.put(ext, OFF_PARENT, header as u32);
                self.put(ext, OFF_SEC_TYPE, ST_FILE);
                self.put(list_block, OFF_EXTENSION, ext as u32);
                list_block = ext;
                list_fill = 0;
            }

            let block = self.claim()?;
            self.put(block, 0, T_DATA);
            self.put(block, OFF_HEADER_KEY, header as u32);
            self.put(block, OFF_HIGH_SEQ, seq as u32 + 1);
            self.put(block, OFF_HT_SIZE, chunk.len() as u32);
            let start = block * BSIZE + OFF_TABLE;
            self.data[start..start + chunk.len()].copy_from_slice(chunk);

            // Block lists are filled from the end
            self.put(list_block, OFF_TABLE + 4 * (HASH_TABLE_SIZE - 1 - list_fill), block as u32);
            list_fill += 1;
            self.put(list_block, OFF_HIGH_SEQ, list_fill as u32);

            if let Some(&prev) = data_blocks.last() {
                self.put(prev, OFF_FIRST_DATA, block as u32);
            }
            data_blocks.push(block);
        }

        if let Some(&first) = data_blocks.first() {
            self.put(header, OFF_FIRST_DATA, first as u32);
        }
        self.link(parent, header, name);

        trace!(
            "OFS: file '{}' ({} bytes) at block {}",
            name,
            contents.len(),
            header
        );
        Ok(header)
    }

    /// Write the bitmap, compute all checksums and return the image
    pub fn finish(mut self) -> Result<AdfFile, MediaError> {
        let blocks = self.used.len();

        for block in 2..blocks {
            if self.used[block] && block != self.bitmap {
                self.put(block, OFF_CHECKSUM, 0);
                let sum = self.block_sum(block);
                self.put(block, OFF_CHECKSUM, sum.wrapping_neg());
            }
        }

        for block in 2..blocks {
            if !self.used[block] {
                let bit = block - 2;
                let offset = 4 + 4 * (bit / 32);
                let word = self.get(self.bitmap, offset) | (1 << (bit % 32));
                self.put(self.bitmap, offset, word);
            }
        }
        let sum = self.block_sum(self.bitmap);
        self.put(self.bitmap, 0, sum.wrapping_neg());

        let boot = boot_block_checksum(&self.data[..2 * BSIZE]);
        self.put(0, 4, boot);

        debug_assert_eq!(self.data.len(), self.density.blocks() * BSIZE);
        AdfFile::from_vec(self.data)
    }

    fn allocate(&mut self) -> Option<usize> {
        let blocks = self.used.len();
        let block = (self.root..blocks)
            .chain(2..self.root)
            .find(|&b| !self.used[b])?;
        self.used[block] = true;
        Some(block)
    }

    fn claim(&mut self) -> Result<usize, MediaError> {
        self.allocate().ok_or(MediaError::DiskFull {
            needed: 1,
            available: 0,
        })
    }

    /// Insert `block` into the hash table of directory `dir`
    fn link(&mut self, dir: usize, block: usize, name: &str) {
        let slot = OFF_TABLE + 4 * name_hash(name);
        let mut current = self.get(dir, slot) as usize;
        if current == 0 {
            self.put(dir, slot, block as u32);
            return;
        }
        loop {
            let next = self.get(current, OFF_NEXT_HASH) as usize;
            if next == 0 {
                self.put(current, OFF_NEXT_HASH, block as u32);
                return;
            }
            current = next;
        }
    }

    fn put_name(&mut self, block: usize, name: &str) {
        let bytes = &name.as_bytes()[..name.len().min(MAX_NAME_LEN)];
        let start = block * BSIZE + OFF_NAME;
        self.data[start] = bytes.len() as u8;
        self.data[start + 1..start + 1 + bytes.len()].copy_from_slice(bytes);
    }

    fn block_sum(&self, block: usize) -> u32 {
        (0..BSIZE)
            .step_by(4)
            .fold(0u32, |sum, offset| sum.wrapping_add(self.get(block, offset)))
    }

    fn get(&self, block: usize, offset: usize) -> u32 {
        be32(&self.data, block * BSIZE + offset)
    }

    fn put(&mut self, block: usize, offset: usize, value: u32) {
        let start = block * BSIZE + offset;
        self.data[start..start + 4].copy_from_slice(&value.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(data: &[u8], block: usize, offset: usize) -> u32 {
        be32(data, block * BSIZE + offset)
    }

    fn lookup(data: &[u8], dir: usize, name: &str) -> Option<usize> {
        let mut block = long(data, dir, OFF_TABLE + 4 * name_hash(name)) as usize;
        while block != 0 {
            let start = block * BSIZE + OFF_NAME;
            let len = data[start] as usize;
            if data[start + 1..start + 1 + len].eq_ignore_ascii_case(name.as_bytes()) {
                return Some(block);
            }
            block = long(data, block, OFF_NEXT_HASH) as usize;
        }
        None
    }

    fn read_file(data: &[u8], header: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut block = long(data, header, OFF_FIRST_DATA) as usize;
        while block != 0 {
            let size = long(data, block, OFF_HT_SIZE) as usize;
            let start = block * BSIZE + OFF_TABLE;
            out.extend_from_slice(&data[start..start + size]);
            block = long(data, block, OFF_FIRST_DATA) as usize;
        }
        out
    }

    fn block_sum(data: &[u8], block: usize) -> u32 {
        (0..BSIZE)
            .step_by(4)
            .fold(0u32, |sum, offset| sum.wrapping_add(long(data, block, offset)))
    }

    #[test]
    fn test_name_hash() {
        assert_eq!(name_hash("s"), name_hash("S"));
        assert!(name_hash("startup-sequence") < HASH_TABLE_SIZE);
    }

    #[test]
    fn test_file_blocks() {
        assert_eq!(file_blocks(0), 1);
        assert_eq!(file_blocks(488), 2);
        assert_eq!(file_blocks(489), 3);
        assert_eq!(file_blocks(72 * 488), 73);
        assert_eq!(file_blocks(73 * 488), 75);
    }

    #[test]
    fn test_empty_volume() {
        let adf = OfsBuilder::new(Density::Dd, "Empty").finish().unwrap();
        let data = adf.data();
        assert!(adf.has_valid_boot_block());
        assert_eq!(long(data, 880, 0), T_HEADER);
        assert_eq!(long(data, 880, OFF_SEC_TYPE), ST_ROOT);
        assert_eq!(block_sum(data, 880), 0);
        assert_eq!(block_sum(data, 881), 0);
        // Block 882 is free
        assert_eq!(long(data, 881, 4 + 4 * (880 / 32)) >> (880 % 32) & 1, 1);
    }

    #[test]
    fn test_files_and_directories() {
        let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();

        let mut builder = OfsBuilder::new(Density::Dd, "Disk");
        let s = builder.create_dir(None, "s").unwrap();
        builder.create_file(Some(s), "startup-sequence", b"file\n").unwrap();
        builder.create_file(None, "file", &payload).unwrap();
        let adf = builder.finish().unwrap();
        let data = adf.data();

        let s = lookup(data, 880, "s").unwrap();
        assert_eq!(long(data, s, OFF_SEC_TYPE), ST_USERDIR);
        let startup = lookup(data, s, "startup-sequence").unwrap();
        assert_eq!(read_file(data, startup), b"file\n");

        let file = lookup(data, 880, "file").unwrap();
        assert_eq!(long(data, file, OFF_BYTE_SIZE), payload.len() as u32);
        assert_eq!(long(data, file, OFF_HIGH_SEQ), HASH_TABLE_SIZE as u32);
        assert_ne!(long(data, file, OFF_EXTENSION), 0);
        assert_eq!(read_file(data, file), payload);

        for block in [880, s, startup, file] {
            assert_eq!(block_sum(data, block), 0);
        }
    }

    #[test]
    fn test_disk_full() {
        let mut builder = OfsBuilder::new(Density::Dd, "Disk");
        let err = builder.create_file(None, "big", &vec![0; 1_000_000]).unwrap_err();
        assert!(matches!(err, MediaError::DiskFull { available: 1756, .. }));
    }
}
