//! Binaural rendering: convolves a source against a measured HRIR pair.
//!
//! Convolution runs in "same-length" mode: the output is the centered
//! window of the full linear convolution with the source's length, so the
//! rendered buffer keeps the source's duration and time alignment. The
//! filter tail past that window is dropped. That truncation is part of the
//! demonstrated behavior this system reproduces (fixed-duration playback),
//! not an accident to correct.

use aural_codec::AudioBuffer;

use crate::error::{DspError, Result};

/// Same-length convolution of `signal` with `ir`.
///
/// Computes the `signal.len()` outputs of the full convolution starting at
/// offset `(ir.len() - 1) / 2`, the centering used by the measured
/// system. Accumulation is f64.
///
/// # Errors
///
/// [`DspError::EmptyInput`] if either input is empty.
pub fn convolve_same(signal: &[f32], ir: &[f32]) -> Result<Vec<f32>> {
    if signal.is_empty() || ir.is_empty() {
        return Err(DspError::EmptyInput);
    }
    let n = signal.len();
    let m = ir.len();
    let offset = (m - 1) / 2;

    let mut out = Vec::with_capacity(n);
    for j in 0..n {
        // Index into the (virtual) full convolution.
        let k = j + offset;
        let i_min = k.saturating_sub(m - 1);
        let i_max = k.min(n - 1);
        let mut acc = 0.0f64;
        for i in i_min..=i_max {
            acc += signal[i] as f64 * ir[k - i] as f64;
        }
        out.push(acc as f32);
    }
    Ok(out)
}

/// Render a mono source channel to spatialized stereo.
///
/// The source is convolved against `left_ir` for the left output channel
/// and against `right_ir` for the right, both in same-length mode, so the
/// output frame count equals the source frame count. `sample_rate` is the
/// HRIR dataset's native rate; the renderer never resamples, so callers
/// bring the source to that rate first.
pub fn render_mono(
    source: &[f32],
    left_ir: &[f32],
    right_ir: &[f32],
    sample_rate: u32,
) -> Result<AudioBuffer> {
    let left = convolve_same(source, left_ir)?;
    let right = convolve_same(source, right_ir)?;
    tracing::debug!(
        frames = source.len(),
        taps = left_ir.len(),
        sample_rate,
        "Rendered mono source binaurally"
    );
    Ok(AudioBuffer::stereo(left, right, sample_rate)?)
}

/// Render a stereo source to spatialized stereo.
///
/// The source's own left channel is convolved against `left_ir` and its
/// own right channel against `right_ir`, independently.
///
/// # Errors
///
/// [`DspError::LengthMismatch`] if the source channels differ in length.
pub fn render_stereo(
    source_left: &[f32],
    source_right: &[f32],
    left_ir: &[f32],
    right_ir: &[f32],
    sample_rate: u32,
) -> Result<AudioBuffer> {
    if source_left.len() != source_right.len() {
        return Err(DspError::LengthMismatch {
            left: source_left.len(),
            right: source_right.len(),
        });
    }
    let left = convolve_same(source_left, left_ir)?;
    let right = convolve_same(source_right, right_ir)?;
    tracing::debug!(
        frames = source_left.len(),
        taps = left_ir.len(),
        sample_rate,
        "Rendered stereo source binaurally"
    );
    Ok(AudioBuffer::stereo(left, right, sample_rate)?)
}

/// Render a whole buffer, dispatching on its channel count.
///
/// `output_rate` is the dataset's native sample rate and is stamped on the
/// result regardless of the source's rate; resample beforehand.
pub fn render_buffer(
    source: &AudioBuffer,
    left_ir: &[f32],
    right_ir: &[f32],
    output_rate: u32,
) -> Result<AudioBuffer> {
    match source.channel_count() {
        1 => render_mono(source.channel(0), left_ir, right_ir, output_rate),
        2 => render_stereo(
            source.channel(0),
            source.channel(1),
            left_ir,
            right_ir,
            output_rate,
        ),
        got => Err(DspError::ChannelMismatch { expected: 2, got }),
    }
}
