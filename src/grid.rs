/// Regular discretization of a rectangular 2D or 3D domain: the index space
/// of a `GridFunction`, together with its physical placement.
///
/// Cell `i` along `axis` spans `[origin + i*spacing, origin + (i+1)*spacing)`,
/// so `origin` is the lower corner of the grid, not the centre of its first
/// cell.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformGrid {
    shape  : Vec<usize>,
    spacing: Vec<Lengthf32>,
    origin : Vec<Lengthf32>,
}

/// Cell size, either shared by all axes or given per axis
#[derive(Clone, Debug, PartialEq)]
pub enum Spacing {
    Uniform(Lengthf32),
    PerAxis(Vec<Lengthf32>),
}

impl From<Lengthf32>      for Spacing { fn from(s: Lengthf32     ) -> Self { Self::Uniform(s) } }
impl From<Vec<Lengthf32>> for Spacing { fn from(s: Vec<Lengthf32>) -> Self { Self::PerAxis(s) } }
impl From<&[Lengthf32]>   for Spacing { fn from(s: &[Lengthf32]  ) -> Self { Self::PerAxis(s.to_vec()) } }
impl<const N: usize> From<[Lengthf32; N]> for Spacing {
    fn from(s: [Lengthf32; N]) -> Self { Self::PerAxis(s.to_vec()) }
}

impl Spacing {
    fn per_axis(self, ndim: usize) -> Vec<Lengthf32> {
        match self {
            Self::Uniform(s) => vec![s; ndim],
            Self::PerAxis(v) => v,
        }
    }
}

impl UniformGrid {

    /// Grid centred on the origin of the coordinate system
    pub fn new(shape: &[usize], spacing: impl Into<Spacing>) -> Result<Self> {
        Self::with_origin(shape, spacing, None)
    }

    /// Grid whose lower corner is placed at `origin`. When `origin` is `None`
    /// the grid is centred on the coordinate system origin.
    pub fn with_origin(
        shape  : &[usize],
        spacing: impl Into<Spacing>,
        origin : Option<&[Lengthf32]>,
    ) -> Result<Self> {
        let ndim = shape.len();
        if !(2..=3).contains(&ndim) {
            return Err(Error::InvalidGrid(format!("expected 2 or 3 dimensions, got shape {shape:?}")));
        }
        if shape.contains(&0) {
            return Err(Error::InvalidGrid(format!("empty axis in shape {shape:?}")));
        }
        let spacing = spacing.into().per_axis(ndim);
        if spacing.len() != ndim {
            return Err(Error::InvalidGrid(format!(
                "{} spacings given for {ndim} dimensions", spacing.len())));
        }
        if let Some(bad) = spacing.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(Error::InvalidGrid(format!("spacing must be positive and finite, got {bad}")));
        }
        let origin = match origin {
            Some(origin) => origin.to_vec(),
            None => shape.iter().zip(&spacing)
                .map(|(&n, &s)| -(n as Lengthf32) * s / 2.0)
                .collect(),
        };
        if origin.len() != ndim {
            return Err(Error::InvalidGrid(format!(
                "{} origin coordinates given for {ndim} dimensions", origin.len())));
        }
        if origin.iter().any(|o| !o.is_finite()) {
            return Err(Error::InvalidGrid(format!("non-finite origin {origin:?}")));
        }
        Ok(Self { shape: shape.to_vec(), spacing, origin })
    }

    pub fn ndim   (&self) -> usize        { self.shape.len() }
    pub fn shape  (&self) -> &[usize]     { &self.shape }
    pub fn spacing(&self) -> &[Lengthf32] { &self.spacing }
    pub fn origin (&self) -> &[Lengthf32] { &self.origin }

    /// Total number of cells
    pub fn n_cells(&self) -> usize { self.shape.iter().product() }

    /// The shape as a fixed-size array, if the grid is 3D
    pub fn box_dim(&self) -> Option<BoxDim_u> { self.shape.as_slice().try_into().ok() }

    // Per-axis accessors panic if `axis >= ndim()`

    /// Physical length covered along `axis`
    pub fn extent(&self, axis: usize) -> Lengthf32 { self.shape[axis] as Lengthf32 * self.spacing[axis] }

    pub fn lower(&self, axis: usize) -> Lengthf32 { self.origin[axis] }
    pub fn upper(&self, axis: usize) -> Lengthf32 { self.origin[axis] + self.extent(axis) }

    /// Coordinate of the centre of cell `index` along `axis`. `index` is not
    /// checked against the shape, so cells beyond the grid get coordinates too.
    ///
    /// # Panics
    ///
    /// If `axis >= self.ndim()`.
    pub fn coordinate(&self, axis: usize, index: usize) -> Lengthf32 {
        self.origin[axis] + self.spacing[axis] * (index as Lengthf32 + 0.5)
    }

    /// The grid with `axis` removed. Fails for 2D grids, as the result would
    /// be 1D.
    pub fn without_axis(&self, axis: usize) -> Result<Self> {
        self.check_axis(axis)?;
        let drop = |v: &[Lengthf32]| -> Vec<Lengthf32> {
            v.iter().enumerate().filter(|&(a, _)| a != axis).map(|(_, &x)| x).collect()
        };
        let shape: Vec<usize> = self.shape.iter().enumerate()
            .filter(|&(a, _)| a != axis)
            .map(|(_, &n)| n)
            .collect();
        Self::with_origin(&shape, drop(&self.spacing), Some(&drop(&self.origin)))
    }

    /// The grid extended with an extra, trailing axis
    pub fn with_axis_appended(&self, n: usize, spacing: Lengthf32, origin: Lengthf32) -> Result<Self> {
        let shape  : Vec<_> = self.shape  .iter().copied().chain([n      ]).collect();
        let spacings: Vec<_> = self.spacing.iter().copied().chain([spacing]).collect();
        let origins: Vec<_> = self.origin .iter().copied().chain([origin ]).collect();
        Self::with_origin(&shape, spacings, Some(&origins))
    }

    pub(crate) fn check_axis(&self, axis: usize) -> Result<()> {
        if axis < self.ndim() { Ok(()) }
        else { Err(Error::IndexOutOfRange { what: "axis".into(), index: axis, bound: self.ndim() }) }
    }
}

impl std::fmt::Display for UniformGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shape {:?}, spacing {:?}, origin {:?}", self.shape, self.spacing, self.origin)
    }
}


// ----- Imports ------------------------------------------------------------------------------------------
use crate::{
    error::{Error, Result},
    index::BoxDim_u,
    types::Lengthf32,
};
