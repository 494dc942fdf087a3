//! Calculation of system matrix elements for use in forward and backward
//! projections.
//!
//! Element `(r, j)` of the system matrix is the weight with which voxel `j`
//! contributes to the line integral measured by ray `r`. The matrix is never
//! stored: both projection directions recompute one row at a time, with the
//! same routine, which is what makes the back projection the exact adjoint of
//! the forward projection.

// ----- The trait --------------------------------------------------------------------

/// Interface for calculation of system matrix rows
pub trait SystemMatrix {

    /// Find the voxels of `grid` coupled to `ray`, and their weights. Place
    /// the results in the output parameter `system_matrix_row`.
    fn update_system_matrix_row(
        system_matrix_row: &mut SystemMatrixRow,
        ray : &Ray,
        grid: &UniformGrid,
    );

    // Sparse storage of the slice through the system matrix which corresponds
    // to the current ray. Allocating these anew for each ray had a noticeable
    // runtime cost, so we create them up-front and reuse them.
    fn buffers(grid: &UniformGrid) -> SystemMatrixRow;
}

// ----- Implementations of the trait -----------------------------------------------
pub mod siddon;
pub use siddon::Siddon;

// ----- Storage of system matrix elements. Only one row is relevant at any single time ------
pub type SystemMatrixElement = (Index1_u, Weightf32);

#[derive(Debug, Default)]
pub struct SystemMatrixRow(pub Vec<SystemMatrixElement>);

impl SystemMatrixRow {
    pub fn iter(&self) -> std::slice::Iter<SystemMatrixElement> { self.0.iter() }
    pub fn clear(&mut self) { self.0.clear(); }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl IntoIterator for SystemMatrixRow {
    type Item = SystemMatrixElement;
    type IntoIter = std::vec::IntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SystemMatrixRow {
    type Item = SystemMatrixElement;
    type IntoIter = std::iter::Cloned<std::slice::Iter<'a, Self::Item>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().cloned()
    }
}

// ----- Applying a single row ------------------------------------------------------

/// Line integral of `volume` along the ray described by `system_matrix_row`
#[inline]
pub fn forward_project(system_matrix_row: &SystemMatrixRow, volume: &[Intensityf32]) -> Intensityf32 {
    let mut projection = 0.0;
    for (j, w) in system_matrix_row {
        projection += w * volume[j]
    }
    projection
}

/// Smear `projection` back along the ray described by `system_matrix_row`
#[inline]
pub fn back_project(backprojection: &mut [Intensityf32], system_matrix_row: &SystemMatrixRow, projection: Intensityf32) {
    for (j, w) in system_matrix_row {
        backprojection[j] += w * projection;
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use crate::{
    geometry::Ray,
    grid::UniformGrid,
    index::Index1_u,
    types::{Intensityf32, Weightf32},
};
