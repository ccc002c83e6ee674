//! Signal processing for binaural rendering.
//!
//! This crate provides the processing stages that sit between decoded
//! audio and the spatialized output:
//!
//! - **Channel effects** ([`effects`]): inter-aural delay, per-ear gain,
//!   and a Butterworth low-pass applied to one ear of a stereo buffer.
//! - **Filter design** ([`filter`]): Butterworth low-pass coefficients and
//!   direct-form application.
//! - **Binaural rendering** ([`binaural`]): same-length convolution of a
//!   source against a head-related impulse response pair.
//!
//! Every stage is a pure function over [`aural_codec::AudioBuffer`]: the
//! input buffer is never mutated and each call returns a fresh buffer, so
//! stages compose freely.
//!
//! ```
//! use aural_codec::AudioBuffer;
//! use aural_dsp::{effects, Ear};
//!
//! let buffer = AudioBuffer::stereo(vec![1.0; 96], vec![1.0; 96], 48_000)?;
//! let delayed = effects::delay(&buffer, Ear::Right, 0.0005)?;
//! let quieter = effects::gain(&delayed, Ear::Right, 0.5)?;
//! assert_eq!(quieter.frame_count(), 96);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binaural;
pub mod effects;
pub mod error;
pub mod filter;

pub use binaural::{convolve_same, render_buffer, render_mono, render_stereo};
pub use effects::{delay, gain, lowpass, Ear};
pub use error::{DspError, Result};
pub use filter::FilterCoefficients;
