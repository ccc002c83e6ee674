//! In-memory audio buffer, the unit of data exchanged between pipeline stages.
//!
//! Samples are stored planar (one `Vec<f32>` per channel) and normalized to
//! [-1.0, 1.0]. Every pipeline stage consumes a buffer by reference and
//! produces a new one; nothing mutates a buffer across stage boundaries.

use crate::error::{CodecError, Result};

/// A normalized floating-point audio buffer with 1 (mono) or 2 (stereo) channels.
///
/// All channels hold the same number of frames. Samples are expected to lie
/// in [-1.0, 1.0]; out-of-range values survive intermediate processing and
/// are clamped (not wrapped) when quantized back to integer PCM.
///
/// # Example
///
/// ```
/// use aural_codec::AudioBuffer;
///
/// let buffer = AudioBuffer::mono(vec![0.0, 0.5, -0.5], 48_000).unwrap();
/// assert_eq!(buffer.channel_count(), 1);
/// assert_eq!(buffer.frame_count(), 3);
///
/// let stereo = buffer.expand_to_stereo();
/// assert_eq!(stereo.channel_count(), 2);
/// assert_eq!(stereo.channel(0), stereo.channel(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Planar sample data, one vector per channel.
    channels: Vec<Vec<f32>>,
    /// Sample rate in Hz.
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from planar channel data.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidChannelCount`] unless there are 1 or 2
    /// channels, [`CodecError::ChannelLengthMismatch`] if the channels differ
    /// in length, and [`CodecError::InvalidSampleRate`] for a zero rate.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CodecError::InvalidSampleRate(0));
        }
        if channels.is_empty() || channels.len() > 2 {
            return Err(CodecError::InvalidChannelCount(channels.len() as u16));
        }
        let frame_count = channels[0].len();
        if channels.iter().any(|c| c.len() != frame_count) {
            return Err(CodecError::ChannelLengthMismatch);
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Create a mono buffer from a single channel of samples.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// Create a stereo buffer from left and right channels.
    pub fn stereo(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![left, right], sample_rate)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (1 or 2).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames per channel.
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    /// `true` if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Duration of the buffer in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// The samples of one channel (0 = left/mono, 1 = right).
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels as planar slices.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Duplicate a mono buffer's channel to produce stereo. Stereo buffers
    /// are returned as a plain clone.
    ///
    /// The two-channel effects require stereo input; callers expand mono
    /// sources with this before applying them.
    pub fn expand_to_stereo(&self) -> Self {
        if self.channels.len() == 2 {
            return self.clone();
        }
        Self {
            channels: vec![self.channels[0].clone(), self.channels[0].clone()],
            sample_rate: self.sample_rate,
        }
    }

    /// Interleave the channels into a single frame-major vector
    /// (L R L R ... for stereo).
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frame_count();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for frame in 0..frames {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid_stereo() {
        let buffer = AudioBuffer::stereo(vec![0.1, 0.2], vec![0.3, 0.4], 44100).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.channel(1), &[0.3, 0.4]);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let result = AudioBuffer::mono(vec![0.0], 0);
        assert!(matches!(result, Err(CodecError::InvalidSampleRate(0))));
    }

    #[test]
    fn test_too_many_channels_rejected() {
        let result = AudioBuffer::new(vec![vec![0.0], vec![0.0], vec![0.0]], 44100);
        assert!(matches!(result, Err(CodecError::InvalidChannelCount(3))));
    }

    #[test]
    fn test_no_channels_rejected() {
        let result = AudioBuffer::new(vec![], 44100);
        assert!(matches!(result, Err(CodecError::InvalidChannelCount(0))));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = AudioBuffer::stereo(vec![0.0, 0.0], vec![0.0], 44100);
        assert!(matches!(result, Err(CodecError::ChannelLengthMismatch)));
    }

    #[test]
    fn test_expand_mono_to_stereo() {
        let mono = AudioBuffer::mono(vec![0.5, -0.5], 96000).unwrap();
        let stereo = mono.expand_to_stereo();
        assert_eq!(stereo.channel_count(), 2);
        assert_eq!(stereo.channel(0), stereo.channel(1));
        assert_eq!(stereo.sample_rate(), 96000);
        // The source buffer is untouched.
        assert_eq!(mono.channel_count(), 1);
    }

    #[test]
    fn test_expand_stereo_is_identity() {
        let stereo = AudioBuffer::stereo(vec![0.1], vec![0.2], 44100).unwrap();
        assert_eq!(stereo.expand_to_stereo(), stereo);
    }

    #[test]
    fn test_interleaved_order() {
        let buffer = AudioBuffer::stereo(vec![1.0, 3.0], vec![2.0, 4.0], 44100).unwrap();
        assert_eq!(buffer.interleaved(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = AudioBuffer::mono(vec![], 44100).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.frame_count(), 0);
    }

    #[test]
    fn test_duration() {
        let buffer = AudioBuffer::mono(vec![0.0; 48000], 96000).unwrap();
        assert!((buffer.duration_secs() - 0.5).abs() < 1e-12);
    }
}
