//! Error types for the codec crate.

use thiserror::Error;

/// Errors that can occur when decoding, encoding, or resampling PCM audio.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The container is compressed, float PCM, or uses an unsupported bit width.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The channel count is outside the supported range (1 or 2).
    #[error("invalid channel count {0}: must be 1 (mono) or 2 (stereo)")]
    InvalidChannelCount(u16),

    /// The sample rate is zero.
    #[error("invalid sample rate {0}: must be positive")]
    InvalidSampleRate(u32),

    /// A buffer was constructed with channels of differing lengths.
    #[error("channel length mismatch: all channels must hold the same frame count")]
    ChannelLengthMismatch,

    /// WAV container error from the underlying reader/writer.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
