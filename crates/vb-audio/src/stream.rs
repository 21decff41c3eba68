//! Stereo stream with lazily allocated channel buffers

use crate::buffer::{ChannelBuffer, Half};
use crate::Sample;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, trace};
use vb_core::AudioError;

/// Non-interleaved stereo buffer pair
///
/// Each channel buffer is allocated on the first request for its handle.
/// Filling alternates between the two halves, front first.
pub struct StereoStream {
    capacity: usize,
    left: OnceCell<ChannelBuffer>,
    right: OnceCell<ChannelBuffer>,
    next: Mutex<Half>,
}

impl StereoStream {
    /// Create a stream with `capacity` samples per channel
    pub fn new(capacity: usize) -> Result<Self, AudioError> {
        if capacity == 0 || capacity % 2 != 0 {
            return Err(AudioError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            left: OnceCell::new(),
            right: OnceCell::new(),
            next: Mutex::new(Half::Front),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Left channel handle, allocating it on first use
    pub fn left_channel_buffer(&self) -> ChannelBuffer {
        self.left
            .get_or_init(|| {
                debug!("Allocating left channel buffer ({} samples)", self.capacity);
                ChannelBuffer::new(self.capacity)
            })
            .clone()
    }

    /// Right channel handle, allocating it on first use
    pub fn right_channel_buffer(&self) -> ChannelBuffer {
        self.right
            .get_or_init(|| {
                debug!("Allocating right channel buffer ({} samples)", self.capacity);
                ChannelBuffer::new(self.capacity)
            })
            .clone()
    }

    /// Whether both channel buffers exist
    pub fn is_allocated(&self) -> bool {
        self.left.get().is_some() && self.right.get().is_some()
    }

    /// Fill one half of both channels
    ///
    /// `source` receives the left and right half slices, each
    /// `capacity / 2` samples long.
    pub fn fill_half<F>(&self, half: Half, source: F) -> Result<(), AudioError>
    where
        F: FnOnce(&mut [Sample], &mut [Sample]),
    {
        let (Some(left), Some(right)) = (self.left.get(), self.right.get()) else {
            return Err(AudioError::NotAllocated);
        };

        left.write_half(half, |l| right.write_half(half, |r| source(l, r)));
        *self.next.lock() = half.next();
        trace!("Filled {:?} audio half", half);
        Ok(())
    }

    /// Fill the half starting at sample `offset` (0 or `capacity / 2`)
    pub fn fill_offset<F>(&self, offset: usize, source: F) -> Result<Half, AudioError>
    where
        F: FnOnce(&mut [Sample], &mut [Sample]),
    {
        let half = Half::from_offset(offset, self.capacity)?;
        self.fill_half(half, source)?;
        Ok(half)
    }

    /// Fill the half after the one filled last
    pub fn fill_next_half<F>(&self, source: F) -> Result<Half, AudioError>
    where
        F: FnOnce(&mut [Sample], &mut [Sample]),
    {
        let half = *self.next.lock();
        self.fill_half(half, source)?;
        Ok(half)
    }
}
