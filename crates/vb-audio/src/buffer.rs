//! Fixed-capacity channel buffers

use crate::Sample;
use parking_lot::RwLock;
use std::sync::Arc;
use vb_core::AudioError;

/// One half of a channel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Half {
    /// Samples `0..capacity/2`
    Front,
    /// Samples `capacity/2..capacity`
    Back,
}

impl Half {
    /// Resolve a sample offset into a half
    ///
    /// Only the two half boundaries are valid offsets.
    pub fn from_offset(offset: usize, capacity: usize) -> Result<Self, AudioError> {
        let half = capacity / 2;
        match offset {
            0 => Ok(Half::Front),
            o if o == half => Ok(Half::Back),
            _ => Err(AudioError::InvalidOffset { offset, half }),
        }
    }

    /// First sample of this half
    pub fn offset(self, capacity: usize) -> usize {
        match self {
            Half::Front => 0,
            Half::Back => capacity / 2,
        }
    }

    /// The other half
    pub fn next(self) -> Self {
        match self {
            Half::Front => Half::Back,
            Half::Back => Half::Front,
        }
    }
}

/// Handle to one channel's sample storage
///
/// Clones share the same storage. The storage never moves or changes
/// size once allocated.
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    storage: Arc<RwLock<Box<[Sample]>>>,
    capacity: usize,
}

impl ChannelBuffer {
    /// Allocate a zeroed buffer
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            storage: Arc::new(RwLock::new(vec![0.0; capacity].into_boxed_slice())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples per half
    pub fn half_len(&self) -> usize {
        self.capacity / 2
    }

    /// Address of the first sample
    pub fn as_ptr(&self) -> *const Sample {
        self.storage.read().as_ptr()
    }

    /// Whether both handles refer to the same storage
    pub fn same_storage(&self, other: &ChannelBuffer) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Copy of the whole buffer
    pub fn snapshot(&self) -> Vec<Sample> {
        self.storage.read().to_vec()
    }

    /// Copy of one half
    pub fn read_half(&self, half: Half) -> Vec<Sample> {
        let start = half.offset(self.capacity);
        self.storage.read()[start..start + self.half_len()].to_vec()
    }

    /// Copy one half into `dst` (truncated to the shorter of both)
    pub fn copy_half_into(&self, half: Half, dst: &mut [Sample]) -> usize {
        let start = half.offset(self.capacity);
        let len = dst.len().min(self.half_len());
        dst[..len].copy_from_slice(&self.storage.read()[start..start + len]);
        len
    }

    /// Run `f` with write access to one half
    pub(crate) fn write_half<R>(&self, half: Half, f: impl FnOnce(&mut [Sample]) -> R) -> R {
        let start = half.offset(self.capacity);
        let mut storage = self.storage.write();
        f(&mut storage[start..start + self.capacity / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_offsets() {
        assert_eq!(Half::from_offset(0, 2048), Ok(Half::Front));
        assert_eq!(Half::from_offset(1024, 2048), Ok(Half::Back));
        assert_eq!(
            Half::from_offset(512, 2048),
            Err(AudioError::InvalidOffset { offset: 512, half: 1024 })
        );
        assert_eq!(Half::Back.offset(2048), 1024);
        assert_eq!(Half::Front.next(), Half::Back);
        assert_eq!(Half::Back.next(), Half::Front);
    }

    #[test]
    fn test_write_half() {
        let buffer = ChannelBuffer::new(8);
        buffer.write_half(Half::Back, |samples| samples.fill(1.0));
        assert_eq!(buffer.snapshot(), vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(buffer.read_half(Half::Front), vec![0.0; 4]);

        let mut dst = [0.0; 2];
        assert_eq!(buffer.copy_half_into(Half::Back, &mut dst), 2);
        assert_eq!(dst, [1.0, 1.0]);
    }

    #[test]
    fn test_shared_storage() {
        let buffer = ChannelBuffer::new(16);
        let clone = buffer.clone();
        assert!(buffer.same_storage(&clone));
        assert_eq!(buffer.as_ptr(), clone.as_ptr());
        assert!(!buffer.same_storage(&ChannelBuffer::new(16)));
    }
}
