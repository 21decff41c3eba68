//! Audio stream bridge

use crate::capture::ErrorChannel;
use std::sync::Arc;
use tracing::debug;
use vb_audio::{ChannelBuffer, Half, StereoStream};
use vb_core::Result;
use vb_engine::Engine;

/// Moves muxer output into the host's stereo buffers, one half at a time
pub struct AudioBridge {
    engine: Arc<dyn Engine>,
    errors: Arc<ErrorChannel>,
    stream: StereoStream,
}

impl AudioBridge {
    pub fn new(engine: Arc<dyn Engine>, errors: Arc<ErrorChannel>, capacity: usize) -> Result<Self> {
        let stream = errors.capture("audio", StereoStream::new(capacity).map_err(Into::into))?;
        debug!("Audio bridge: {} samples per channel", capacity);
        Ok(Self {
            engine,
            errors,
            stream,
        })
    }

    pub fn capacity(&self) -> usize {
        self.stream.capacity()
    }

    pub fn left_channel_buffer(&self) -> ChannelBuffer {
        self.stream.left_channel_buffer()
    }

    pub fn right_channel_buffer(&self) -> ChannelBuffer {
        self.stream.right_channel_buffer()
    }

    /// Pull `capacity / 2` samples per channel into the half at `offset`
    pub fn update_audio(&self, offset: usize) -> Result<Half> {
        let engine = &self.engine;
        let result = self
            .stream
            .fill_offset(offset, |left, right| engine.copy_samples(left, right));
        self.errors.capture("update_audio", result.map_err(Into::into))
    }

    /// Fill the half after the one filled last, front first
    pub fn fill_next_half(&self) -> Result<Half> {
        let engine = &self.engine;
        let result = self
            .stream
            .fill_next_half(|left, right| engine.copy_samples(left, right));
        self.errors.capture("update_audio", result.map_err(Into::into))
    }

    /// Muxer fill level in percent (0 - 100)
    pub fn audio_fill_level(&self) -> i32 {
        let level = (self.engine.mixer_fill_level() * 100.0).floor();
        if level.is_nan() {
            return 0;
        }
        level.clamp(0.0, 100.0) as i32
    }

    pub fn set_sample_rate(&self, rate: u32) {
        debug!("Host sample rate: {} Hz", rate);
        self.engine.set_sample_rate(rate);
    }
}
