//! Self-describing binary files holding a single `GridFunction`.
//!
//! Layout (little-endian): magic `XRGF`, `u32` number of dimensions `n`,
//! `n` × `u64` shape, `n` × `f32` spacing, `n` × `f32` origin, then the
//! values as `f32` in row-major order.

#[binrw]
#[brw(little, magic = b"XRGF")]
#[derive(Debug, PartialEq)]
pub struct RawGridFunction {
    #[br(temp)]
    #[bw(calc = shape.len() as u32)]
    ndim: u32,

    #[br(count = ndim as usize)]
    pub shape: Vec<u64>,

    #[br(count = ndim as usize)]
    pub spacing: Vec<Lengthf32>,

    #[br(count = ndim as usize)]
    pub origin: Vec<Lengthf32>,

    #[br(temp, calc = value_count(&shape))]
    #[br(assert(n_values.is_some(), "shape {:?} holds more values than can be addressed", shape))]
    #[bw(ignore)]
    n_values: Option<usize>,

    #[br(count = n_values.unwrap_or(0))]
    pub values: Vec<Intensityf32>,
}

/// Number of values implied by `shape`, if it fits in a `usize`
fn value_count(shape: &[u64]) -> Option<usize> {
    shape.iter().try_fold(1_usize, |n, &extent| n.checked_mul(usize::try_from(extent).ok()?))
}

impl RawGridFunction {
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut buf = BufReader::new(File::open(path)?);
        Ok(Self::read(&mut buf)?)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut buf = BufWriter::new(File::create(path)?);
        self.write(&mut buf)?;
        buf.flush()?;
        Ok(())
    }
}

impl From<&GridFunction> for RawGridFunction {
    fn from(function: &GridFunction) -> Self {
        let grid = function.grid();
        Self {
            shape  : grid.shape().iter().map(|&n| n as u64).collect(),
            spacing: grid.spacing().to_vec(),
            origin : grid.origin ().to_vec(),
            values : function.to_vec(),
        }
    }
}

impl TryFrom<RawGridFunction> for GridFunction {
    type Error = Error;
    fn try_from(raw: RawGridFunction) -> Result<Self> {
        let shape = raw.shape.iter()
            .map(|&n| usize::try_from(n).map_err(|_| Error::InvalidGrid(format!("axis length {n} does not fit in memory"))))
            .collect::<Result<Vec<usize>>>()?;
        let grid = UniformGrid::with_origin(&shape, raw.spacing, Some(&raw.origin))?;
        GridFunction::from_vec(grid, raw.values)
    }
}

impl GridFunction {
    pub fn from_raw_file(path: impl AsRef<Path>) -> Result<Self> {
        RawGridFunction::read_from_file(path)?.try_into()
    }

    pub fn write_to_raw_file(&self, path: impl AsRef<Path>) -> Result<()> {
        RawGridFunction::from(self).write_to_file(path)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn raw_io_roundtrip() -> Result<()> {
        // Harmless temporary location for output file
        let dir = tempdir()?;
        let file_path = dir.path().join("test.xrgf");

        // Some test data, with everything off its defaults
        let grid = UniformGrid::with_origin(&[2, 3, 2], [0.5, 0.25, 2.0], Some(&[-1.0, 3.5, 0.125]))?;
        let values = (0..12).map(|i| i as f32 * 1.5 - 4.0).collect();
        let original = GridFunction::from_vec(grid, values)?;

        // Write to file and read back
        original.write_to_raw_file(&file_path)?;
        let reloaded = GridFunction::from_raw_file(&file_path)?;

        // Check that roundtrip didn't corrupt the data
        assert_eq!(reloaded.grid(), original.grid());
        assert_eq!(reloaded.to_vec(), original.to_vec());
        Ok(())
    }

    #[test]
    fn header_layout() -> Result<()> {
        let grid = UniformGrid::with_origin(&[1, 2], 1.0, Some(&[0.0, 0.0]))?;
        let function = GridFunction::from_vec(grid, vec![2.0, 3.0])?;
        let mut bytes = Cursor::new(Vec::new());
        RawGridFunction::from(&function).write(&mut bytes)?;
        let bytes = bytes.into_inner();
        assert_eq!(&bytes[0..4], b"XRGF");
        assert_eq!(&bytes[4..8], &2_u32.to_le_bytes());
        assert_eq!(&bytes[8..16], &1_u64.to_le_bytes());
        assert_eq!(bytes.len(), 4 + 4 + 2 * (8 + 4 + 4) + 2 * 4);
        Ok(())
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut bytes = Cursor::new(b"XRGG\x02\x00\x00\x00".to_vec());
        let result = RawGridFunction::read(&mut bytes);
        assert!(matches!(result, Err(binrw::Error::BadMagic { .. })));
    }

    #[test]
    fn truncated_payload_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("truncated.xrgf");
        let function = GridFunction::filled(1.0, &[3, 3], 1.0)?;
        function.write_to_raw_file(&file_path)?;
        let full = std::fs::read(&file_path)?;
        std::fs::write(&file_path, &full[..full.len() - 4])?;
        let result = GridFunction::from_raw_file(&file_path);
        assert!(matches!(result, Err(Error::RawFormat(_))), "{result:?}");
        Ok(())
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        let mut bytes = b"XRGF".to_vec();
        bytes.extend(3_u32.to_le_bytes());
        for extent in [1_u64 << 40, 1 << 40, 1] { bytes.extend(extent.to_le_bytes()); }
        for _ in 0..6                           { bytes.extend(1.0_f32.to_le_bytes()); }
        let result = RawGridFunction::read(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(binrw::Error::AssertFail { .. })), "{result:?}");
    }

    #[test]
    fn huge_but_representable_shape_is_rejected() {
        let mut bytes = b"XRGF".to_vec();
        bytes.extend(3_u32.to_le_bytes());
        for extent in [1_u64 << 20, 1 << 20, 1 << 8] { bytes.extend(extent.to_le_bytes()); }
        for _ in 0..6                                { bytes.extend(1.0_f32.to_le_bytes()); }
        assert!(RawGridFunction::read(&mut Cursor::new(bytes)).is_err());
    }

    #[test]
    fn malformed_header_is_rejected() {
        let raw = RawGridFunction { shape: vec![2], spacing: vec![1.0], origin: vec![0.0], values: vec![0.0; 2] };
        let result = GridFunction::try_from(raw);
        assert!(matches!(result, Err(Error::InvalidGrid(_))));
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};
#[cfg(test)]
use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};

use crate::{
    error::{Error, Result},
    gfunc::GridFunction,
    grid::UniformGrid,
    types::{Intensityf32, Lengthf32},
};
