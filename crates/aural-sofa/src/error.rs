//! Error types for SOFA measurement file reading and HRIR lookup.

use thiserror::Error;

/// Errors that can occur when parsing a SOFA file or querying a dataset.
#[derive(Error, Debug)]
pub enum SofaError {
    /// The file is not a NetCDF classic container this reader understands.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// The container header is structurally malformed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A variable's data lies outside the file bounds.
    #[error("invalid offset: variable data at {offset} exceeds file size {file_size}")]
    InvalidOffset { offset: u64, file_size: u64 },

    /// A declared size would require an unreasonable allocation.
    #[error("allocation too large: requested {requested} bytes, limit is {limit} bytes")]
    AllocationTooLarge { requested: u64, limit: u64 },

    /// A required variable is absent from the file.
    #[error("missing variable: {0}")]
    MissingVariable(String),

    /// A variable's shape does not match the SOFA conventions this system expects.
    #[error("shape mismatch for {variable}: expected {expected}, got {got}")]
    ShapeMismatch {
        variable: String,
        expected: String,
        got: String,
    },

    /// The dataset holds no measurement rows.
    #[error("dataset contains no measurements")]
    EmptyDataset,

    /// No measurement row matches the requested position exactly.
    #[error("no measurement position found for azimuth={azimuth} and elevation={elevation}")]
    NoMatch { azimuth: f64, elevation: f64 },

    /// More than one measurement row matches the requested position.
    #[error(
        "multiple measurement positions ({count}) found for azimuth={azimuth} and elevation={elevation}"
    )]
    AmbiguousMatch {
        azimuth: f64,
        elevation: f64,
        count: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for SOFA operations.
pub type Result<T> = std::result::Result<T, SofaError>;
