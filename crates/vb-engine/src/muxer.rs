//! Stereo sample muxer
//!
//! Collects samples produced by the engine thread and hands them out to the
//! host at the host's pace.

use std::collections::VecDeque;
use tracing::{debug, trace};

/// Stereo samples the muxer can hold
pub const MUXER_CAPACITY: usize = 16384;

/// Default output sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Sample FIFO with master volume
pub struct Muxer {
    buffer: VecDeque<(f32, f32)>,
    capacity: usize,
    sample_rate: u32,
    volume_left: f32,
    volume_right: f32,
    underflows: u64,
    overflows: u64,
}

impl Default for Muxer {
    fn default() -> Self {
        Self::new(MUXER_CAPACITY)
    }
}

impl Muxer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            sample_rate: DEFAULT_SAMPLE_RATE,
            volume_left: 1.0,
            volume_right: 1.0,
            underflows: 0,
            overflows: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, rate: u32) {
        if rate != self.sample_rate {
            debug!("Muxer sample rate: {} Hz", rate);
            self.sample_rate = rate;
            self.buffer.clear();
        }
    }

    /// Set master volume from option values (0-100)
    pub fn set_volume(&mut self, left: i64, right: i64) {
        self.volume_left = left.clamp(0, 100) as f32 / 100.0;
        self.volume_right = right.clamp(0, 100) as f32 / 100.0;
    }

    /// Append one stereo sample, dropping the oldest one when full
    pub fn push(&mut self, left: f32, right: f32) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
            self.overflows += 1;
        }
        self.buffer.push_back((left, right));
    }

    /// Append `count` silent samples
    pub fn push_silence(&mut self, count: usize) {
        for _ in 0..count {
            self.push(0.0, 0.0);
        }
    }

    /// Move samples into `left` and `right`, padding with silence on underflow
    pub fn copy(&mut self, left: &mut [f32], right: &mut [f32]) {
        let count = left.len().min(right.len());
        let mut starved = false;

        for i in 0..count {
            match self.buffer.pop_front() {
                Some((l, r)) => {
                    left[i] = l * self.volume_left;
                    right[i] = r * self.volume_right;
                }
                None => {
                    left[i] = 0.0;
                    right[i] = 0.0;
                    starved = true;
                }
            }
        }

        if starved {
            self.underflows += 1;
            trace!("Muxer underflow ({} total)", self.underflows);
        }
    }

    /// Fill ratio (0.0 - 1.0)
    pub fn fill_level(&self) -> f64 {
        self.buffer.len() as f64 / self.capacity as f64
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn underflows(&self) -> u64 {
        self.underflows
    }

    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
