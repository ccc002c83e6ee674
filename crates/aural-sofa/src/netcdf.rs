//! Minimal read-only parser for the NetCDF classic encodings (CDF-1 and
//! CDF-2), the container family used for the SOFA measurement data this
//! system ingests.
//!
//! Only what HRIR loading needs is implemented: the dimension list, the
//! variable list, and whole-variable reads of fixed-size numeric data
//! (converted to `f64`). Attributes are validated and skipped. Record
//! (unlimited-dimension) variables are rejected; the measurement grids
//! this system targets are fixed-size.
//!
//! Structure is validated before any data access: tags, name lengths,
//! element counts, and data offsets are all bounds-checked so a malformed
//! file produces a typed error, never a panic or an outsized allocation.

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Result, SofaError};

/// List tag for the dimension list.
const TAG_DIMENSION: u32 = 0x0A;
/// List tag for a variable list.
const TAG_VARIABLE: u32 = 0x0B;
/// List tag for an attribute list.
const TAG_ATTRIBUTE: u32 = 0x0C;
/// Tag value for an absent list (paired with a zero element count).
const TAG_ABSENT: u32 = 0x00;

/// Maximum length of a dimension/variable/attribute name (sanity limit).
const MAX_NAME_LEN: u32 = 64 * 1024;
/// Maximum number of list elements accepted per list (sanity limit).
const MAX_LIST_LEN: u32 = 16 * 1024;
/// Per-variable allocation limit when reading data (256 MiB).
const ALLOCATION_LIMIT: u64 = 256 * 1024 * 1024;

/// External data types of the NetCDF classic format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NcType {
    Byte,
    Char,
    Short,
    Int,
    Float,
    Double,
}

impl NcType {
    /// Decode the on-disk type code.
    fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Byte),
            2 => Some(Self::Char),
            3 => Some(Self::Short),
            4 => Some(Self::Int),
            5 => Some(Self::Float),
            6 => Some(Self::Double),
            _ => None,
        }
    }

    /// Size of one element in bytes.
    fn size(self) -> u64 {
        match self {
            Self::Byte | Self::Char => 1,
            Self::Short => 2,
            Self::Int | Self::Float => 4,
            Self::Double => 8,
        }
    }
}

/// A named dimension. A length of zero marks the unlimited record dimension.
#[derive(Debug, Clone)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
}

/// A variable header: name, shape (as dimension ids), type, and data offset.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub dim_ids: Vec<usize>,
    pub nc_type: NcType,
    /// Byte offset of the variable's data from the start of the file.
    pub begin: u64,
}

/// A parsed NetCDF classic file: header lists plus the raw bytes for
/// on-demand variable reads.
#[derive(Debug)]
pub struct NcFile {
    dims: Vec<Dimension>,
    vars: Vec<Variable>,
    data: Vec<u8>,
}

impl NcFile {
    /// Parse the header (magic, dimension list, global attributes, variable
    /// list) of a NetCDF classic byte stream.
    ///
    /// # Errors
    ///
    /// Returns [`SofaError::UnsupportedEncoding`] for non-classic containers
    /// (including NetCDF-4/HDF5 files) and [`SofaError::Parse`] for
    /// structurally malformed headers.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() >= 4 && bytes[..4] == [0x89, b'H', b'D', b'F'] {
            return Err(SofaError::UnsupportedEncoding(
                "NetCDF-4 (HDF5-based) file; convert to the classic encoding first".into(),
            ));
        }
        if bytes.len() < 4 || &bytes[..3] != b"CDF" {
            return Err(SofaError::UnsupportedEncoding(
                "missing CDF magic bytes".into(),
            ));
        }
        let version = bytes[3];
        if version != 1 && version != 2 {
            return Err(SofaError::UnsupportedEncoding(format!(
                "CDF version byte {version} (supported: 1 and 2)"
            )));
        }
        let wide_offsets = version == 2;

        let mut cursor = Cursor::new(bytes);
        cursor.seek(SeekFrom::Start(4))?;

        // numrecs is only relevant for record variables, which are rejected
        // at read time, so the value itself is unused.
        let _numrecs = cursor.read_u32::<BigEndian>()?;

        let dims = Self::read_dim_list(&mut cursor)?;
        tracing::debug!(count = dims.len(), "Parsed dimension list");

        Self::skip_attr_list(&mut cursor, bytes.len() as u64)?;

        let vars = Self::read_var_list(&mut cursor, bytes.len() as u64, wide_offsets)?;
        tracing::debug!(count = vars.len(), "Parsed variable list");

        Ok(Self {
            dims,
            vars,
            data: bytes.to_vec(),
        })
    }

    /// Dimensions declared by the file.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.vars.iter().find(|v| v.name == name)
    }

    /// Names of all variables in the file.
    pub fn variable_names(&self) -> Vec<&str> {
        self.vars.iter().map(|v| v.name.as_str()).collect()
    }

    /// Read a variable's entire data as a flat `f64` vector plus its shape.
    ///
    /// All numeric external types are converted to `f64`. The data layout is
    /// row-major in the declared dimension order (the NetCDF convention).
    ///
    /// # Errors
    ///
    /// Record variables fail with [`SofaError::UnsupportedEncoding`];
    /// out-of-bounds data regions with [`SofaError::InvalidOffset`];
    /// oversized reads with [`SofaError::AllocationTooLarge`].
    pub fn read_f64(&self, var: &Variable) -> Result<(Vec<f64>, Vec<usize>)> {
        let mut shape = Vec::with_capacity(var.dim_ids.len());
        for &dim_id in &var.dim_ids {
            let dim = self.dims.get(dim_id).ok_or_else(|| {
                SofaError::Parse(format!(
                    "variable '{}' references unknown dimension id {dim_id}",
                    var.name
                ))
            })?;
            if dim.len == 0 {
                return Err(SofaError::UnsupportedEncoding(format!(
                    "variable '{}' uses the unlimited record dimension '{}'",
                    var.name, dim.name
                )));
            }
            shape.push(dim.len);
        }

        let mut count: u64 = 1;
        for &len in &shape {
            count = count.checked_mul(len as u64).ok_or_else(|| {
                SofaError::Parse(format!("variable '{}' shape overflows", var.name))
            })?;
        }
        let byte_len = count
            .checked_mul(var.nc_type.size())
            .ok_or_else(|| SofaError::Parse(format!("variable '{}' size overflows", var.name)))?;
        if byte_len > ALLOCATION_LIMIT {
            return Err(SofaError::AllocationTooLarge {
                requested: byte_len,
                limit: ALLOCATION_LIMIT,
            });
        }
        let file_size = self.data.len() as u64;
        if var
            .begin
            .checked_add(byte_len)
            .is_none_or(|end| end > file_size)
        {
            return Err(SofaError::InvalidOffset {
                offset: var.begin,
                file_size,
            });
        }

        let mut cursor = Cursor::new(&self.data[var.begin as usize..(var.begin + byte_len) as usize]);
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let value = match var.nc_type {
                NcType::Byte => cursor.read_i8()? as f64,
                NcType::Char => cursor.read_u8()? as f64,
                NcType::Short => cursor.read_i16::<BigEndian>()? as f64,
                NcType::Int => cursor.read_i32::<BigEndian>()? as f64,
                NcType::Float => cursor.read_f32::<BigEndian>()? as f64,
                NcType::Double => cursor.read_f64::<BigEndian>()?,
            };
            values.push(value);
        }
        Ok((values, shape))
    }

    // ---------------------------------------------------------------
    // Header parsing helpers
    // ---------------------------------------------------------------

    /// Read a list header (tag + element count), returning the count.
    ///
    /// An absent list is encoded as two zero words.
    fn read_list_header(cursor: &mut Cursor<&[u8]>, expected_tag: u32) -> Result<u32> {
        let tag = cursor.read_u32::<BigEndian>()?;
        let nelems = cursor.read_u32::<BigEndian>()?;
        if tag == TAG_ABSENT && nelems == 0 {
            return Ok(0);
        }
        if tag != expected_tag {
            return Err(SofaError::Parse(format!(
                "unexpected list tag 0x{tag:02X} (expected 0x{expected_tag:02X})"
            )));
        }
        if nelems > MAX_LIST_LEN {
            return Err(SofaError::Parse(format!(
                "list element count {nelems} exceeds limit {MAX_LIST_LEN}"
            )));
        }
        Ok(nelems)
    }

    /// Read a 4-byte-padded name string.
    fn read_name(cursor: &mut Cursor<&[u8]>) -> Result<String> {
        let len = cursor.read_u32::<BigEndian>()?;
        if len > MAX_NAME_LEN {
            return Err(SofaError::Parse(format!(
                "name length {len} exceeds limit {MAX_NAME_LEN}"
            )));
        }
        let mut buf = vec![0u8; len as usize];
        cursor.read_exact(&mut buf)?;
        let padding = len.div_ceil(4) * 4 - len;
        cursor.seek(SeekFrom::Current(padding as i64))?;
        String::from_utf8(buf)
            .map_err(|_| SofaError::Parse("name is not valid UTF-8".into()))
    }

    /// Parse the dimension list.
    fn read_dim_list(cursor: &mut Cursor<&[u8]>) -> Result<Vec<Dimension>> {
        let nelems = Self::read_list_header(cursor, TAG_DIMENSION)?;
        let mut dims = Vec::with_capacity(nelems as usize);
        for _ in 0..nelems {
            let name = Self::read_name(cursor)?;
            let len = cursor.read_u32::<BigEndian>()? as usize;
            dims.push(Dimension { name, len });
        }
        Ok(dims)
    }

    /// Parse and discard an attribute list, validating its structure.
    fn skip_attr_list(cursor: &mut Cursor<&[u8]>, file_size: u64) -> Result<()> {
        let nelems = Self::read_list_header(cursor, TAG_ATTRIBUTE)?;
        for _ in 0..nelems {
            let _name = Self::read_name(cursor)?;
            let type_word = cursor.read_u32::<BigEndian>()?;
            let nc_type = NcType::from_u32(type_word)
                .ok_or_else(|| SofaError::Parse(format!("invalid attribute type {type_word}")))?;
            let count = cursor.read_u32::<BigEndian>()? as u64;
            let byte_len = count
                .checked_mul(nc_type.size())
                .ok_or_else(|| SofaError::Parse("attribute size overflows".into()))?;
            let padded = byte_len.div_ceil(4) * 4;
            if cursor.position().checked_add(padded).is_none_or(|p| p > file_size) {
                return Err(SofaError::Parse(
                    "attribute values extend past end of file".into(),
                ));
            }
            cursor.seek(SeekFrom::Current(padded as i64))?;
        }
        Ok(())
    }

    /// Parse the variable list.
    fn read_var_list(
        cursor: &mut Cursor<&[u8]>,
        file_size: u64,
        wide_offsets: bool,
    ) -> Result<Vec<Variable>> {
        let nelems = Self::read_list_header(cursor, TAG_VARIABLE)?;
        let mut vars = Vec::with_capacity(nelems as usize);
        for _ in 0..nelems {
            let name = Self::read_name(cursor)?;

            let ndims = cursor.read_u32::<BigEndian>()?;
            if ndims > MAX_LIST_LEN {
                return Err(SofaError::Parse(format!(
                    "variable '{name}' declares {ndims} dimensions"
                )));
            }
            let mut dim_ids = Vec::with_capacity(ndims as usize);
            for _ in 0..ndims {
                dim_ids.push(cursor.read_u32::<BigEndian>()? as usize);
            }

            Self::skip_attr_list(cursor, file_size)?;

            let type_word = cursor.read_u32::<BigEndian>()?;
            let nc_type = NcType::from_u32(type_word).ok_or_else(|| {
                SofaError::Parse(format!("variable '{name}' has invalid type {type_word}"))
            })?;

            // vsize is a writer-side padding hint; the read path computes
            // sizes from the shape instead.
            let _vsize = cursor.read_u32::<BigEndian>()?;

            let begin = if wide_offsets {
                cursor.read_u64::<BigEndian>()?
            } else {
                cursor.read_u32::<BigEndian>()? as u64
            };
            if begin > file_size {
                return Err(SofaError::InvalidOffset {
                    offset: begin,
                    file_size,
                });
            }

            tracing::debug!(name, ?nc_type, ?dim_ids, begin, "Parsed variable");
            vars.push(Variable {
                name,
                dim_ids,
                nc_type,
                begin,
            });
        }
        Ok(vars)
    }
}
