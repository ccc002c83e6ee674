//! # aural-codec
//!
//! PCM codec layer for the aural binaural rendering pipeline.
//! Converts between linear-PCM WAV containers and normalized in-memory
//! [`AudioBuffer`]s, and resamples buffers to a target rate:
//! - **[`buffer`]**: the planar, normalized `AudioBuffer` all pipeline
//!   stages exchange.
//! - **[`wav`]**: 8/16/32-bit signed integer PCM decoding; 16-bit encoding.
//! - **[`resample`]**: linear-interpolation resampling (typically to the
//!   HRIR dataset's native 96 kHz).
//! - **[`error`]**: typed codec failures.

pub mod buffer;
pub mod error;
pub mod resample;
pub mod wav;

pub use buffer::AudioBuffer;
pub use error::{CodecError, Result};
pub use resample::resample;
pub use wav::{decode_wav, decode_wav_file, encode_frames, encode_wav, encode_wav_file};
