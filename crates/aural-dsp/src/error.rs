//! Error types for the DSP crate.

use thiserror::Error;

/// Errors that can occur during effect application or binaural rendering.
#[derive(Error, Debug)]
pub enum DspError {
    /// The buffer's channel count is incompatible with the requested effect.
    #[error("channel count mismatch: expected {expected}, got {got}")]
    ChannelMismatch { expected: usize, got: usize },

    /// The filter cutoff is outside (0, Nyquist).
    #[error("invalid cutoff frequency {cutoff} Hz: must be in (0, {nyquist}) Hz")]
    InvalidCutoff { cutoff: f64, nyquist: f64 },

    /// The filter order is zero.
    #[error("invalid filter order {0}: must be at least 1")]
    InvalidOrder(usize),

    /// The delay time is negative or non-finite.
    #[error("invalid delay time {0} s: must be finite and non-negative")]
    InvalidDelay(f64),

    /// The gain factor is negative or non-finite.
    #[error("invalid gain factor {0}: must be finite and non-negative")]
    InvalidGain(f64),

    /// Stereo source channels differ in length.
    #[error("channel length mismatch: left has {left} frames, right has {right}")]
    LengthMismatch { left: usize, right: usize },

    /// A convolution input (signal or impulse response) is empty.
    #[error("empty input: signal and impulse response must be non-empty")]
    EmptyInput,

    /// Buffer construction error from the codec layer.
    #[error(transparent)]
    Codec(#[from] aural_codec::CodecError),
}

/// Convenience Result type for DSP operations.
pub type Result<T> = std::result::Result<T, DspError>;
