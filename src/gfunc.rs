//! Sampled functions on a `UniformGrid`: reconstruction volumes, sinograms
//! and the 2D slices taken out of either.
//!
//! Arithmetic never mutates its operands. Binary operations between grid
//! functions check that the shapes agree, hence the `Result` outputs of `Add`
//! and `Sub`.

pub type Values = ArrayD<Intensityf32>;

#[derive(Clone, Debug)]
pub struct GridFunction {
    grid  : Arc<UniformGrid>,
    values: Values,
}

/// Read-only 2D view, the form in which slices are handed to renderers.
#[derive(Debug)]
pub struct ImageView<'a> {
    pub shape  : [usize; 2],
    pub spacing: [Lengthf32; 2],
    pub values : ArrayView2<'a, Intensityf32>,
}

impl GridFunction {

    pub fn new(grid: impl Into<Arc<UniformGrid>>, values: Values) -> Result<Self> {
        let grid = grid.into();
        if values.shape() != grid.shape() {
            return Err(Error::ShapeMismatch { left: grid.shape().to_vec(), right: values.shape().to_vec() });
        }
        Ok(Self { grid, values })
    }

    /// Build from values listed in row-major order
    pub fn from_vec(grid: impl Into<Arc<UniformGrid>>, values: Vec<Intensityf32>) -> Result<Self> {
        let grid = grid.into();
        let mismatch = |found: usize| Error::ShapeMismatch { left: grid.shape().to_vec(), right: vec![found] };
        if values.len() != grid.n_cells() { return Err(mismatch(values.len())) }
        let n = values.len();
        let values = ArrayD::from_shape_vec(IxDyn(grid.shape()), values).map_err(|_| mismatch(n))?;
        Ok(Self { grid, values })
    }

    pub fn constant(grid: impl Into<Arc<UniformGrid>>, value: Intensityf32) -> Self {
        let grid = grid.into();
        let values = ArrayD::from_elem(IxDyn(grid.shape()), value);
        Self { grid, values }
    }

    pub fn zeros(grid: impl Into<Arc<UniformGrid>>) -> Self { Self::constant(grid, 0.0) }

    /// Constant function on a centred grid built from `shape` and `spacing`
    pub fn filled(value: Intensityf32, shape: &[usize], spacing: impl Into<Spacing>) -> Result<Self> {
        Ok(Self::constant(UniformGrid::new(shape, spacing)?, value))
    }

    pub fn grid  (&self) -> &Arc<UniformGrid>          { &self.grid }
    pub fn shape (&self) -> &[usize]                   { self.grid.shape() }
    pub fn values(&self) -> ArrayViewD<'_, Intensityf32> { self.values.view() }
    pub fn into_values(self) -> Values                 { self.values }

    pub fn get(&self, index: &[usize]) -> Option<Intensityf32> { self.values.get(index).copied() }

    /// Values in row-major order
    pub fn to_vec(&self) -> Vec<Intensityf32> { self.values.iter().copied().collect() }

    /// The lower-dimensional function obtained by fixing `axis` at `index`.
    /// The result has its own copy of the values.
    pub fn slice(&self, axis: usize, index: usize) -> Result<Self> {
        self.grid.check_axis(axis)?;
        let len = self.shape()[axis];
        if index >= len {
            return Err(Error::IndexOutOfRange { what: format!("index on axis {axis}"), index, bound: len });
        }
        let grid = self.grid.without_axis(axis)?;
        let values = self.values.index_axis(Axis(axis), index).to_owned();
        Ok(Self { grid: Arc::new(grid), values })
    }

    pub fn image(&self) -> Result<ImageView<'_>> {
        let not_2d = || Error::InvalidGrid(format!("image view needs 2 dimensions, got shape {:?}", self.shape()));
        let shape:   [usize;     2] = self.shape()       .try_into().map_err(|_| not_2d())?;
        let spacing: [Lengthf32; 2] = self.grid.spacing().try_into().map_err(|_| not_2d())?;
        let values = self.values.view().into_dimensionality::<Ix2>().map_err(|_| not_2d())?;
        Ok(ImageView { shape, spacing, values })
    }

    /// Inner product, accumulated in double precision
    pub fn dot(&self, other: &Self) -> Result<f64> {
        self.check_same_shape(other)?;
        Ok(Zip::from(&self.values).and(&other.values)
           .fold(0.0, |acc, &a, &b| acc + a as f64 * b as f64))
    }

    /// Euclidean norm of the values, ignoring cell volume
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|&v| v as f64 * v as f64).sum::<f64>().sqrt()
    }

    pub fn sum(&self) -> f64 { self.values.iter().map(|&v| v as f64).sum() }

    pub fn max(&self) -> Intensityf32 { self.values.iter().copied().fold(Intensityf32::NEG_INFINITY, Intensityf32::max) }
    pub fn min(&self) -> Intensityf32 { self.values.iter().copied().fold(Intensityf32::INFINITY    , Intensityf32::min) }

    fn check_same_shape(&self, other: &Self) -> Result<()> {
        if self.shape() == other.shape() { Ok(()) }
        else { Err(Error::ShapeMismatch { left: self.shape().to_vec(), right: other.shape().to_vec() }) }
    }

    fn zip_with(&self, other: &Self, f: impl Fn(Intensityf32, Intensityf32) -> Intensityf32) -> Result<Self> {
        self.check_same_shape(other)?;
        let values = Zip::from(&self.values).and(&other.values).map_collect(|&a, &b| f(a, b));
        Ok(Self { grid: Arc::clone(&self.grid), values })
    }

    fn map(&self, f: impl Fn(Intensityf32) -> Intensityf32) -> Self {
        Self { grid: Arc::clone(&self.grid), values: self.values.mapv(f) }
    }
}

impl Add for &GridFunction {
    type Output = Result<GridFunction>;
    fn add(self, rhs: Self) -> Self::Output { self.zip_with(rhs, |a, b| a + b) }
}

impl Sub for &GridFunction {
    type Output = Result<GridFunction>;
    fn sub(self, rhs: Self) -> Self::Output { self.zip_with(rhs, |a, b| a - b) }
}

impl Mul<Intensityf32> for &GridFunction {
    type Output = GridFunction;
    fn mul(self, rhs: Intensityf32) -> Self::Output { self.map(|v| v * rhs) }
}

impl Mul<&GridFunction> for Intensityf32 {
    type Output = GridFunction;
    fn mul(self, rhs: &GridFunction) -> Self::Output { rhs * self }
}


// ----- Imports ------------------------------------------------------------------------------------------
use std::{
    ops::{Add, Mul, Sub},
    sync::Arc,
};

use ndarray::{ArrayD, ArrayView2, ArrayViewD, Axis, Ix2, IxDyn, Zip};

use crate::{
    error::{Error, Result},
    grid::{Spacing, UniformGrid},
    types::{Intensityf32, Lengthf32},
};
