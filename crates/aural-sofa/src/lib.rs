//! # aural-sofa
//!
//! Reader for SOFA (Spatially Oriented Format for Acoustics) HRIR
//! measurement files in the NetCDF classic encodings, and the immutable
//! [`HrirDataset`] the binaural renderer queries:
//! - **[`netcdf`]**: minimal, validating NetCDF classic (CDF-1/CDF-2) parser.
//! - **[`dataset`]**: position-indexed impulse-response grid with strict
//!   exact-match lookup.
//! - **[`error`]**: typed failures for parsing and lookup.
//!
//! A dataset is loaded once per subject, held for the rendering session,
//! and never mutated, so lookups are safe from any number of threads.

pub mod dataset;
pub mod error;
pub mod netcdf;

pub use dataset::{DatasetInfo, HrirDataset, MeasurementPosition, DEFAULT_SAMPLE_RATE};
pub use error::{Result, SofaError};
