//! Linear PCM WAV decoding and encoding.
//!
//! Decoding accepts 8/16/32-bit signed integer PCM with 1 or 2 channels and
//! normalizes every sample by the bit width's maximum magnitude (127, 32 767,
//! 2 147 483 647). Encoding always re-quantizes to 16-bit signed PCM after
//! clamping to [-1.0, 1.0], regardless of the input's original width.
//!
//! # Example
//!
//! ```
//! use aural_codec::{decode_wav, encode_wav, AudioBuffer};
//!
//! let buffer = AudioBuffer::mono(vec![0.0, 0.25, -0.25], 48_000).unwrap();
//! let bytes = encode_wav(&buffer).unwrap();
//! let decoded = decode_wav(&bytes).unwrap();
//! assert_eq!(decoded.frame_count(), 3);
//! ```

use std::io::Cursor;
use std::path::Path;

use crate::buffer::AudioBuffer;
use crate::error::{CodecError, Result};

/// Normalization divisor for a supported integer bit width.
///
/// Uses the positive maximum of the sample type (e.g. 32 767 for 16-bit),
/// so the most negative sample decodes slightly below -1.0. Encoding clamps
/// it back.
fn max_magnitude(bits_per_sample: u16) -> Result<f32> {
    match bits_per_sample {
        8 => Ok(i8::MAX as f32),
        16 => Ok(i16::MAX as f32),
        32 => Ok(i32::MAX as f32),
        other => Err(CodecError::UnsupportedFormat(format!(
            "{other}-bit PCM (supported: 8, 16, 32-bit signed integer)"
        ))),
    }
}

/// Decode a linear-PCM WAV container into a normalized [`AudioBuffer`].
///
/// Channels are de-interleaved into planar storage and every sample is
/// divided by the bit width's maximum magnitude, yielding floats in
/// (approximately) [-1.0, 1.0].
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedFormat`] for compressed containers,
/// floating-point PCM, or bit widths outside {8, 16, 32}, and
/// [`CodecError::InvalidChannelCount`] for more than two channels.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).map_err(|e| match e {
        hound::Error::Unsupported => {
            CodecError::UnsupportedFormat("compressed or non-PCM WAV container".into())
        }
        other => CodecError::Wav(other),
    })?;

    let spec = reader.spec();
    if spec.sample_format == hound::SampleFormat::Float {
        return Err(CodecError::UnsupportedFormat(
            "floating-point PCM (only signed integer PCM is supported)".into(),
        ));
    }
    if spec.channels == 0 || spec.channels > 2 {
        return Err(CodecError::InvalidChannelCount(spec.channels));
    }
    let max_val = max_magnitude(spec.bits_per_sample)?;

    let channel_count = spec.channels as usize;
    let frames = reader.len() as usize / channel_count;
    tracing::debug!(
        channels = channel_count,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        frames,
        "Decoding WAV"
    );

    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for (i, sample) in reader.into_samples::<i32>().enumerate() {
        let sample = sample.map_err(CodecError::Wav)?;
        channels[i % channel_count].push(sample as f32 / max_val);
    }

    AudioBuffer::new(channels, spec.sample_rate)
}

/// Read and decode a WAV file from disk. See [`decode_wav`].
pub fn decode_wav_file(path: &Path) -> Result<AudioBuffer> {
    tracing::info!("Decoding WAV file: {}", path.display());
    let bytes = std::fs::read(path)?;
    decode_wav(&bytes)
}

/// Clamp a normalized sample to [-1.0, 1.0] and quantize to 16-bit signed PCM.
fn quantize_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Encode an [`AudioBuffer`] as a 16-bit signed integer PCM WAV container.
///
/// Every sample is clamped to [-1.0, 1.0] and scaled by 32 767; the header
/// carries the buffer's sample rate and channel count. Output width is
/// always 16-bit, whatever the source width was.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for frame in 0..buffer.frame_count() {
        for channel in buffer.channels() {
            writer.write_sample(quantize_i16(channel[frame]))?;
        }
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Encode an [`AudioBuffer`] and write it to disk. See [`encode_wav`].
pub fn encode_wav_file(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    tracing::info!(
        frames = buffer.frame_count(),
        channels = buffer.channel_count(),
        sample_rate = buffer.sample_rate(),
        "Encoding WAV file: {}",
        path.display()
    );
    let bytes = encode_wav(buffer)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Quantize and interleave a buffer into raw 16-bit little-endian sample
/// bytes, without a container header.
pub fn encode_frames(buffer: &AudioBuffer) -> Vec<u8> {
    let mut out = Vec::with_capacity(buffer.frame_count() * buffer.channel_count() * 2);
    for frame in 0..buffer.frame_count() {
        for channel in buffer.channels() {
            out.extend_from_slice(&quantize_i16(channel[frame]).to_le_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One 16-bit quantization step.
    const STEP: f32 = 1.0 / i16::MAX as f32;

    /// Helper: write a WAV container with the given integer spec and samples.
    fn build_wav(channels: u16, sample_rate: u32, bits: u16, samples: &[i32]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            match bits {
                8 => writer.write_sample(s as i8).unwrap(),
                16 => writer.write_sample(s as i16).unwrap(),
                _ => writer.write_sample(s).unwrap(),
            }
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_decode_16bit_mono() {
        let bytes = build_wav(1, 44100, 16, &[0, i16::MAX as i32, i16::MIN as i32]);
        let buffer = decode_wav(&bytes).unwrap();
        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.frame_count(), 3);
        assert_eq!(buffer.channel(0)[0], 0.0);
        assert_eq!(buffer.channel(0)[1], 1.0);
        // i16::MIN / i16::MAX is slightly below -1.0.
        assert!(buffer.channel(0)[2] < -1.0);
    }

    #[test]
    fn test_decode_8bit_normalization() {
        let bytes = build_wav(1, 8000, 8, &[127, -127]);
        let buffer = decode_wav(&bytes).unwrap();
        assert_eq!(buffer.channel(0), &[1.0, -1.0]);
    }

    #[test]
    fn test_decode_stereo_deinterleaves() {
        // Interleaved L R L R
        let bytes = build_wav(2, 48000, 16, &[100, -100, 200, -200]);
        let buffer = decode_wav(&bytes).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 2);
        let max = i16::MAX as f32;
        assert_eq!(buffer.channel(0), &[100.0 / max, 200.0 / max]);
        assert_eq!(buffer.channel(1), &[-100.0 / max, -200.0 / max]);
    }

    #[test]
    fn test_decode_rejects_float_pcm() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        writer.write_sample(0.5f32).unwrap();
        writer.finalize().unwrap();

        let result = decode_wav(&cursor.into_inner());
        assert!(matches!(result, Err(CodecError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_decode_rejects_24bit() {
        let bytes = build_wav(1, 44100, 24, &[0, 1, 2]);
        let result = decode_wav(&bytes);
        assert!(matches!(result, Err(CodecError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode_wav(&[0u8; 32]);
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_clamps_overdriven_samples() {
        let buffer = AudioBuffer::mono(vec![2.0, -2.0], 44100).unwrap();
        let bytes = encode_wav(&buffer).unwrap();
        let decoded = decode_wav(&bytes).unwrap();
        assert_eq!(decoded.channel(0)[0], 1.0);
        assert!((decoded.channel(0)[1] + 1.0).abs() <= STEP);
    }

    #[test]
    fn test_encode_is_always_16bit() {
        let buffer = AudioBuffer::mono(vec![0.5], 44100).unwrap();
        let bytes = encode_wav(&buffer).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 16);
        assert_eq!(reader.spec().sample_format, hound::SampleFormat::Int);
    }

    #[test]
    fn test_round_trip_within_quantization_error() {
        let samples: Vec<f32> = (0..1000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin() * 0.9)
            .collect();
        let buffer = AudioBuffer::stereo(samples.clone(), samples, 44100).unwrap();

        let decoded = decode_wav(&encode_wav(&buffer).unwrap()).unwrap();
        assert_eq!(decoded.frame_count(), buffer.frame_count());
        assert_eq!(decoded.sample_rate(), 44100);
        for ch in 0..2 {
            for (a, b) in decoded.channel(ch).iter().zip(buffer.channel(ch)) {
                assert!(
                    (a - b).abs() <= STEP,
                    "sample differs by more than one quantization step: {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn test_encode_frames_interleaves_le() {
        let buffer = AudioBuffer::stereo(vec![1.0], vec![-1.0], 96000).unwrap();
        let bytes = encode_frames(&buffer);
        assert_eq!(bytes.len(), 4);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), -i16::MAX);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.wav");

        let buffer = AudioBuffer::mono(vec![0.1, -0.1, 0.9], 22050).unwrap();
        encode_wav_file(&path, &buffer).unwrap();
        let decoded = decode_wav_file(&path).unwrap();
        assert_eq!(decoded.frame_count(), 3);
        assert_eq!(decoded.sample_rate(), 22050);
    }
}
