//! Single-ear directional-cue effects on stereo buffers.
//!
//! Each effect is a pure function: it takes a 2-channel buffer by
//! reference, touches exactly one channel, and returns a new buffer at the
//! original length and sample rate. The calling layer can therefore treat
//! repeated parameter changes as idempotent recomputation instead of
//! incremental state mutation.

use std::str::FromStr;

use aural_codec::AudioBuffer;

use crate::error::{DspError, Result};
use crate::filter::FilterCoefficients;

/// Which ear (channel) an effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ear {
    Left,
    Right,
}

impl Ear {
    /// The channel index this ear maps to (left = 0, right = 1).
    pub fn channel_index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

impl FromStr for Ear {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            other => Err(format!("invalid ear '{other}': use 'left' or 'right'")),
        }
    }
}

impl std::fmt::Display for Ear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Every effect requires a stereo buffer; mono sources must be expanded by
/// the caller first (see [`AudioBuffer::expand_to_stereo`]).
fn require_stereo(buffer: &AudioBuffer) -> Result<()> {
    if buffer.channel_count() != 2 {
        return Err(DspError::ChannelMismatch {
            expected: 2,
            got: buffer.channel_count(),
        });
    }
    Ok(())
}

/// Rebuild a buffer with one channel replaced.
fn with_channel(buffer: &AudioBuffer, index: usize, samples: Vec<f32>) -> Result<AudioBuffer> {
    let mut channels = buffer.channels().to_vec();
    channels[index] = samples;
    Ok(AudioBuffer::new(channels, buffer.sample_rate())?)
}

/// Delay one ear by `delay_secs`, shifting its channel later in time.
///
/// The delay is converted to a whole sample count `d`; the selected channel
/// becomes `d` zeros followed by its first `len - d` samples, so the total
/// length is preserved and the other channel is untouched. A delay that
/// rounds to zero samples returns the input unchanged, a degenerate shift
/// that must not reslice the channel.
///
/// # Errors
///
/// [`DspError::ChannelMismatch`] for non-stereo input,
/// [`DspError::InvalidDelay`] for a negative or non-finite delay.
pub fn delay(buffer: &AudioBuffer, ear: Ear, delay_secs: f64) -> Result<AudioBuffer> {
    require_stereo(buffer)?;
    if !delay_secs.is_finite() || delay_secs < 0.0 {
        return Err(DspError::InvalidDelay(delay_secs));
    }

    let d = (delay_secs * buffer.sample_rate() as f64) as usize;
    if d == 0 {
        return Ok(buffer.clone());
    }

    let len = buffer.frame_count();
    let source = buffer.channel(ear.channel_index());
    let mut shifted = vec![0.0f32; len];
    if d < len {
        shifted[d..].copy_from_slice(&source[..len - d]);
    }
    tracing::debug!(%ear, delay_secs, samples = d, "Applied inter-aural delay");
    with_channel(buffer, ear.channel_index(), shifted)
}

/// Scale one ear's channel by `factor`.
///
/// The factor is an unbounded non-negative multiplier; values above 1.0
/// intentionally overdrive and are only clamped when the buffer is
/// quantized at encode time.
///
/// # Errors
///
/// [`DspError::ChannelMismatch`] for non-stereo input,
/// [`DspError::InvalidGain`] for a negative or non-finite factor.
pub fn gain(buffer: &AudioBuffer, ear: Ear, factor: f64) -> Result<AudioBuffer> {
    require_stereo(buffer)?;
    if !factor.is_finite() || factor < 0.0 {
        return Err(DspError::InvalidGain(factor));
    }

    let scaled = buffer
        .channel(ear.channel_index())
        .iter()
        .map(|&s| (s as f64 * factor) as f32)
        .collect();
    tracing::debug!(%ear, factor, "Applied inter-aural gain");
    with_channel(buffer, ear.channel_index(), scaled)
}

/// Low-pass filter one ear's channel with a Butterworth design.
///
/// The other channel passes through unmodified.
///
/// # Errors
///
/// [`DspError::ChannelMismatch`] for non-stereo input,
/// [`DspError::InvalidCutoff`] unless `0 < cutoff_hz < sample_rate / 2`,
/// [`DspError::InvalidOrder`] for a zero order.
pub fn lowpass(buffer: &AudioBuffer, ear: Ear, cutoff_hz: f64, order: usize) -> Result<AudioBuffer> {
    require_stereo(buffer)?;
    let coefficients =
        FilterCoefficients::butterworth_lowpass(order, cutoff_hz, buffer.sample_rate())?;
    let filtered = coefficients.apply(buffer.channel(ear.channel_index()));
    tracing::debug!(%ear, cutoff_hz, order, "Applied low-pass filter");
    with_channel(buffer, ear.channel_index(), filtered)
}
