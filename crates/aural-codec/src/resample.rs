//! Linear-interpolation resampling to a target sample rate.
//!
//! The surrounding tooling normalizes all source material to the HRIR
//! dataset's native rate (96 kHz) before rendering; this is the resampler
//! it uses. Quality is deliberately modest (a two-point linear kernel,
//! no anti-aliasing filter), matching the measured system.

use crate::buffer::AudioBuffer;
use crate::error::{CodecError, Result};

/// Resample a buffer to `target_rate` using linear interpolation.
///
/// For each output frame `i`, the source position is `i * source / target`;
/// the bracketing source pair is interpolated. The output holds
/// `floor(len * target / source)` frames per channel and never extrapolates:
/// positions at or past the final source sample clamp to it. Channels are
/// resampled independently on the same time grid.
///
/// Returns a plain clone when `target_rate` equals the buffer's rate.
///
/// # Errors
///
/// Returns [`CodecError::InvalidSampleRate`] if `target_rate` is zero.
pub fn resample(buffer: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if target_rate == 0 {
        return Err(CodecError::InvalidSampleRate(0));
    }
    let source_rate = buffer.sample_rate();
    if target_rate == source_rate {
        return Ok(buffer.clone());
    }

    let source_len = buffer.frame_count();
    let target_len = (source_len as u64 * target_rate as u64 / source_rate as u64) as usize;
    tracing::debug!(
        source_rate,
        target_rate,
        source_len,
        target_len,
        "Resampling buffer"
    );

    let mut channels = Vec::with_capacity(buffer.channel_count());
    for channel in buffer.channels() {
        let mut out = Vec::with_capacity(target_len);
        for i in 0..target_len {
            let t = i as f64 / target_rate as f64;
            let pos = t * source_rate as f64;
            let idx = pos.floor() as usize;
            let frac = pos - idx as f64;
            let sample = if idx + 1 < source_len {
                channel[idx] as f64 * (1.0 - frac) + channel[idx + 1] as f64 * frac
            } else {
                // Last valid source sample; no extrapolation past the end.
                channel[source_len - 1] as f64
            };
            out.push(sample as f32);
        }
        channels.push(out);
    }

    AudioBuffer::new(channels, target_rate)
}
