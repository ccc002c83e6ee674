//! HRIR measurement dataset: load, index, and exact-position lookup.
//!
//! A dataset is built once from a SOFA file and immutable thereafter, so
//! concurrent lookups from multiple renders need no locking.

use std::path::Path;

use serde::Serialize;

use crate::error::{Result, SofaError};
use crate::netcdf::NcFile;

/// Variable holding the IR tensor, shaped (measurements, 2 ears, taps).
const VAR_IR: &str = "Data.IR";
/// Variable holding the source positions, shaped (measurements, 3).
const VAR_SOURCE_POSITION: &str = "SourcePosition";
/// Optional variable holding the measurement sample rate.
const VAR_SAMPLING_RATE: &str = "Data.SamplingRate";

/// Native rate assumed when the file carries no sampling-rate variable.
/// The datasets this system targets are measured at 96 kHz.
pub const DEFAULT_SAMPLE_RATE: u32 = 96_000;

/// A measurement direction: azimuth/elevation in degrees, radius in meters.
///
/// Azimuth lies in [0, 360). Within one dataset no two rows share an
/// (azimuth, elevation) pair; lookups rely on exact matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementPosition {
    pub azimuth: f64,
    pub elevation: f64,
    pub radius: f64,
}

/// Serializable summary of a dataset, for inspection tooling.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    /// Number of measurement rows.
    pub measurements: usize,
    /// Filter taps per impulse response.
    pub taps: usize,
    /// Native sample rate in Hz.
    pub sample_rate: u32,
    /// Distinct azimuth values present, ascending.
    pub azimuths: Vec<f64>,
    /// Distinct elevation values present, ascending.
    pub elevations: Vec<f64>,
}

/// An immutable grid of head-related impulse responses indexed by
/// measurement position.
///
/// # Example
///
/// ```no_run
/// use aural_sofa::HrirDataset;
///
/// let dataset = HrirDataset::load(std::path::Path::new("Subject1_HRIRs.sofa")).unwrap();
/// let (left, right) = dataset.lookup(30.0, 0.0).unwrap();
/// assert_eq!(left.len(), dataset.taps());
/// assert_eq!(right.len(), dataset.taps());
/// ```
#[derive(Debug, Clone)]
pub struct HrirDataset {
    positions: Vec<MeasurementPosition>,
    left: Vec<Vec<f32>>,
    right: Vec<Vec<f32>>,
    sample_rate: u32,
    taps: usize,
}

impl HrirDataset {
    /// Load a dataset from a SOFA file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!("Loading HRIR dataset: {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Load a dataset from SOFA file bytes.
    ///
    /// Requires `Data.IR` shaped (M, 2, taps) and `SourcePosition` shaped
    /// (M, 3). The raw file's ear ordering is swapped on load: ear index 1
    /// becomes the left IR and index 0 the right IR, a required correction
    /// for the datasets this system targets.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let file = NcFile::parse(bytes)?;

        let ir_var = file
            .variable(VAR_IR)
            .ok_or_else(|| SofaError::MissingVariable(VAR_IR.into()))?
            .clone();
        let (ir, ir_shape) = file.read_f64(&ir_var)?;
        if ir_shape.len() != 3 || ir_shape[1] != 2 {
            return Err(SofaError::ShapeMismatch {
                variable: VAR_IR.into(),
                expected: "(measurements, 2, taps)".into(),
                got: format!("{ir_shape:?}"),
            });
        }

        let pos_var = file
            .variable(VAR_SOURCE_POSITION)
            .ok_or_else(|| SofaError::MissingVariable(VAR_SOURCE_POSITION.into()))?
            .clone();
        let (pos, pos_shape) = file.read_f64(&pos_var)?;
        if pos_shape.len() != 2 || pos_shape[1] != 3 {
            return Err(SofaError::ShapeMismatch {
                variable: VAR_SOURCE_POSITION.into(),
                expected: "(measurements, 3)".into(),
                got: format!("{pos_shape:?}"),
            });
        }
        if pos_shape[0] != ir_shape[0] {
            return Err(SofaError::ShapeMismatch {
                variable: VAR_SOURCE_POSITION.into(),
                expected: format!("({}, 3)", ir_shape[0]),
                got: format!("{pos_shape:?}"),
            });
        }

        let measurements = ir_shape[0];
        let taps = ir_shape[2];
        if measurements == 0 {
            return Err(SofaError::EmptyDataset);
        }

        let sample_rate = match file.variable(VAR_SAMPLING_RATE) {
            Some(var) => {
                let var = var.clone();
                let (values, _) = file.read_f64(&var)?;
                values.first().map(|&v| v as u32).unwrap_or(DEFAULT_SAMPLE_RATE)
            }
            None => DEFAULT_SAMPLE_RATE,
        };

        let mut positions = Vec::with_capacity(measurements);
        let mut left = Vec::with_capacity(measurements);
        let mut right = Vec::with_capacity(measurements);
        for m in 0..measurements {
            positions.push(MeasurementPosition {
                azimuth: pos[m * 3],
                elevation: pos[m * 3 + 1],
                radius: pos[m * 3 + 2],
            });
            let row = m * 2 * taps;
            let ear0 = &ir[row..row + taps];
            let ear1 = &ir[row + taps..row + 2 * taps];
            // Ear ordering correction: file index 1 is the left ear.
            left.push(ear1.iter().map(|&v| v as f32).collect());
            right.push(ear0.iter().map(|&v| v as f32).collect());
        }

        tracing::info!(measurements, taps, sample_rate, "Loaded HRIR dataset");
        Ok(Self {
            positions,
            left,
            right,
            sample_rate,
            taps,
        })
    }

    /// Build a dataset from already-parsed parts (synthetic grids, tests,
    /// callers with their own measurement sources). No ear swap is applied:
    /// `left` and `right` are taken as given.
    pub fn from_parts(
        positions: Vec<MeasurementPosition>,
        left: Vec<Vec<f32>>,
        right: Vec<Vec<f32>>,
        sample_rate: u32,
    ) -> Result<Self> {
        if positions.is_empty() {
            return Err(SofaError::EmptyDataset);
        }
        if left.len() != positions.len() || right.len() != positions.len() {
            return Err(SofaError::ShapeMismatch {
                variable: "left/right".into(),
                expected: format!("{} rows", positions.len()),
                got: format!("{}/{} rows", left.len(), right.len()),
            });
        }
        let taps = left[0].len();
        if left.iter().chain(right.iter()).any(|ir| ir.len() != taps) {
            return Err(SofaError::ShapeMismatch {
                variable: "left/right".into(),
                expected: format!("uniform tap count {taps}"),
                got: "ragged impulse responses".into(),
            });
        }
        Ok(Self {
            positions,
            left,
            right,
            sample_rate,
            taps,
        })
    }

    /// Number of measurement rows.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// `true` if the dataset holds no measurements (never constructed).
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Filter taps per impulse response.
    pub fn taps(&self) -> usize {
        self.taps
    }

    /// Native sample rate of the measurements in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// All measurement positions in file order.
    pub fn positions(&self) -> &[MeasurementPosition] {
        &self.positions
    }

    /// Find the IR pair measured at exactly (azimuth, elevation).
    ///
    /// Only exact equality is attempted; there is no nearest-neighbor
    /// fallback; callers must request values that exist in the grid.
    ///
    /// # Errors
    ///
    /// [`SofaError::NoMatch`] when no row matches,
    /// [`SofaError::AmbiguousMatch`] when more than one does (a malformed,
    /// duplicate-entry dataset).
    pub fn lookup(&self, azimuth: f64, elevation: f64) -> Result<(&[f32], &[f32])> {
        let mut found: Option<usize> = None;
        let mut count = 0usize;
        for (i, p) in self.positions.iter().enumerate() {
            if p.azimuth == azimuth && p.elevation == elevation {
                count += 1;
                if found.is_none() {
                    found = Some(i);
                }
            }
        }
        match (found, count) {
            (Some(i), 1) => Ok((&self.left[i], &self.right[i])),
            (Some(_), count) => Err(SofaError::AmbiguousMatch {
                azimuth,
                elevation,
                count,
            }),
            (None, _) => Err(SofaError::NoMatch { azimuth, elevation }),
        }
    }

    /// Summary of the dataset for inspection tooling.
    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            measurements: self.len(),
            taps: self.taps,
            sample_rate: self.sample_rate,
            azimuths: distinct_sorted(self.positions.iter().map(|p| p.azimuth)),
            elevations: distinct_sorted(self.positions.iter().map(|p| p.elevation)),
        }
    }
}

/// Collect distinct values in ascending order.
fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, WriteBytesExt};
    use std::io::Write;

    /// Helper: write a 4-byte-padded name.
    fn write_name(buf: &mut Vec<u8>, name: &str) {
        buf.write_u32::<BigEndian>(name.len() as u32).unwrap();
        buf.write_all(name.as_bytes()).unwrap();
        let padding = name.len().div_ceil(4) * 4 - name.len();
        buf.write_all(&vec![0u8; padding]).unwrap();
    }

    /// Helper: build a CDF-1 SOFA file with the given positions and IR rows.
    ///
    /// `ir[m]` holds `(ear0, ear1)` in raw file order; the loader swaps them.
    pub(crate) fn build_sofa_bytes(
        positions: &[(f64, f64, f64)],
        ir: &[(Vec<f64>, Vec<f64>)],
        sample_rate: f64,
    ) -> Vec<u8> {
        assert_eq!(positions.len(), ir.len());
        let m = positions.len();
        let taps = ir[0].0.len();

        let mut buf: Vec<u8> = Vec::new();
        buf.write_all(b"CDF\x01").unwrap();
        buf.write_u32::<BigEndian>(0).unwrap(); // numrecs

        // dim_list: M, R, N, C, I
        let dims: [(&str, u32); 5] = [
            ("M", m as u32),
            ("R", 2),
            ("N", taps as u32),
            ("C", 3),
            ("I", 1),
        ];
        buf.write_u32::<BigEndian>(0x0A).unwrap();
        buf.write_u32::<BigEndian>(dims.len() as u32).unwrap();
        for (name, len) in dims {
            write_name(&mut buf, name);
            buf.write_u32::<BigEndian>(len).unwrap();
        }

        // gatt_list: absent
        buf.write_u32::<BigEndian>(0).unwrap();
        buf.write_u32::<BigEndian>(0).unwrap();

        // var_list: Data.IR (M,R,N), SourcePosition (M,C), Data.SamplingRate (I)
        struct VarSpec<'a> {
            name: &'a str,
            dim_ids: &'a [u32],
            len: usize,
        }
        let specs = [
            VarSpec {
                name: "Data.IR",
                dim_ids: &[0, 1, 2],
                len: m * 2 * taps,
            },
            VarSpec {
                name: "SourcePosition",
                dim_ids: &[0, 3],
                len: m * 3,
            },
            VarSpec {
                name: "Data.SamplingRate",
                dim_ids: &[4],
                len: 1,
            },
        ];
        buf.write_u32::<BigEndian>(0x0B).unwrap();
        buf.write_u32::<BigEndian>(specs.len() as u32).unwrap();
        let mut begin_positions = Vec::new();
        for spec in &specs {
            write_name(&mut buf, spec.name);
            buf.write_u32::<BigEndian>(spec.dim_ids.len() as u32).unwrap();
            for &id in spec.dim_ids {
                buf.write_u32::<BigEndian>(id).unwrap();
            }
            buf.write_u32::<BigEndian>(0).unwrap(); // vatt_list absent
            buf.write_u32::<BigEndian>(0).unwrap();
            buf.write_u32::<BigEndian>(6).unwrap(); // double
            buf.write_u32::<BigEndian>((spec.len * 8) as u32).unwrap();
            begin_positions.push(buf.len());
            buf.write_u32::<BigEndian>(0).unwrap(); // begin placeholder
        }

        // Data blocks, patching each begin offset as we go.
        let mut patch = |buf: &mut Vec<u8>, slot: usize| {
            let begin = buf.len() as u32;
            buf[slot..slot + 4].copy_from_slice(&begin.to_be_bytes());
        };

        patch(&mut buf, begin_positions[0]);
        for (ear0, ear1) in ir {
            for &v in ear0 {
                buf.write_f64::<BigEndian>(v).unwrap();
            }
            for &v in ear1 {
                buf.write_f64::<BigEndian>(v).unwrap();
            }
        }
        patch(&mut buf, begin_positions[1]);
        for &(az, el, r) in positions {
            buf.write_f64::<BigEndian>(az).unwrap();
            buf.write_f64::<BigEndian>(el).unwrap();
            buf.write_f64::<BigEndian>(r).unwrap();
        }
        patch(&mut buf, begin_positions[2]);
        buf.write_f64::<BigEndian>(sample_rate).unwrap();

        buf
    }

    fn two_row_dataset() -> Vec<u8> {
        build_sofa_bytes(
            &[(0.0, 0.0, 1.2), (30.0, 15.0, 1.2)],
            &[
                (vec![2.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]),
                (vec![4.0, 0.0, 0.0], vec![3.0, 0.0, 0.0]),
            ],
            96000.0,
        )
    }

    #[test]
    fn test_load_from_bytes() {
        let dataset = HrirDataset::from_bytes(&two_row_dataset()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.taps(), 3);
        assert_eq!(dataset.sample_rate(), 96000);
        assert_eq!(dataset.positions()[1].azimuth, 30.0);
        assert_eq!(dataset.positions()[1].radius, 1.2);
    }

    #[test]
    fn test_ear_channels_are_swapped_on_load() {
        let dataset = HrirDataset::from_bytes(&two_row_dataset()).unwrap();
        let (left, right) = dataset.lookup(0.0, 0.0).unwrap();
        // File ear index 1 (value 1.0) becomes the left IR.
        assert_eq!(left[0], 1.0);
        assert_eq!(right[0], 2.0);
    }

    #[test]
    fn test_lookup_exact_match() {
        let dataset = HrirDataset::from_bytes(&two_row_dataset()).unwrap();
        let (left, right) = dataset.lookup(30.0, 15.0).unwrap();
        assert_eq!(left[0], 3.0);
        assert_eq!(right[0], 4.0);
    }

    #[test]
    fn test_lookup_no_match() {
        let dataset = HrirDataset::from_bytes(&two_row_dataset()).unwrap();
        let result = dataset.lookup(90.0, 0.0);
        assert!(matches!(
            result,
            Err(SofaError::NoMatch {
                azimuth,
                elevation
            }) if azimuth == 90.0 && elevation == 0.0
        ));
    }

    #[test]
    fn test_lookup_no_nearest_neighbor_fallback() {
        let dataset = HrirDataset::from_bytes(&two_row_dataset()).unwrap();
        // 0.1 degrees away from a real measurement still fails.
        assert!(dataset.lookup(30.1, 15.0).is_err());
    }

    #[test]
    fn test_lookup_duplicate_position_is_ambiguous() {
        let bytes = build_sofa_bytes(
            &[(5.0, 0.0, 1.0), (5.0, 0.0, 1.0)],
            &[
                (vec![1.0], vec![1.0]),
                (vec![2.0], vec![2.0]),
            ],
            96000.0,
        );
        let dataset = HrirDataset::from_bytes(&bytes).unwrap();
        let result = dataset.lookup(5.0, 0.0);
        assert!(matches!(
            result,
            Err(SofaError::AmbiguousMatch { count: 2, .. })
        ));
    }

    #[test]
    fn test_missing_ir_variable() {
        // A structurally valid file with the wrong variables.
        let bytes = {
            let mut buf: Vec<u8> = Vec::new();
            buf.extend_from_slice(b"CDF\x01");
            buf.extend_from_slice(&0u32.to_be_bytes()); // numrecs
            buf.extend_from_slice(&[0u8; 8]); // dim_list absent
            buf.extend_from_slice(&[0u8; 8]); // gatt_list absent
            buf.extend_from_slice(&[0u8; 8]); // var_list absent
            buf
        };
        let result = HrirDataset::from_bytes(&bytes);
        assert!(matches!(result, Err(SofaError::MissingVariable(v)) if v == "Data.IR"));
    }

    #[test]
    fn test_from_parts_and_info() {
        let dataset = HrirDataset::from_parts(
            vec![
                MeasurementPosition {
                    azimuth: 0.0,
                    elevation: -15.0,
                    radius: 1.0,
                },
                MeasurementPosition {
                    azimuth: 355.0,
                    elevation: 0.0,
                    radius: 1.0,
                },
                MeasurementPosition {
                    azimuth: 0.0,
                    elevation: 0.0,
                    radius: 1.0,
                },
            ],
            vec![vec![1.0, 0.0]; 3],
            vec![vec![0.0, 1.0]; 3],
            96000,
        )
        .unwrap();

        let info = dataset.info();
        assert_eq!(info.measurements, 3);
        assert_eq!(info.taps, 2);
        assert_eq!(info.azimuths, vec![0.0, 355.0]);
        assert_eq!(info.elevations, vec![-15.0, 0.0]);

        // DatasetInfo serializes for the CLI's --json output.
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"measurements\":3"));
    }

    #[test]
    fn test_from_parts_rejects_ragged_rows() {
        let result = HrirDataset::from_parts(
            vec![MeasurementPosition {
                azimuth: 0.0,
                elevation: 0.0,
                radius: 1.0,
            }],
            vec![vec![1.0, 0.0]],
            vec![vec![0.0]],
            96000,
        );
        assert!(matches!(result, Err(SofaError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_from_parts_rejects_empty() {
        let result = HrirDataset::from_parts(vec![], vec![], vec![], 96000);
        assert!(matches!(result, Err(SofaError::EmptyDataset)));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subject.sofa");
        std::fs::write(&path, two_row_dataset()).unwrap();

        let dataset = HrirDataset::load(&path).unwrap();
        assert_eq!(dataset.len(), 2);
    }
}
