//! Siddon ray tracing: the exact lengths of the intersections of a straight
//! line with the cells of a regular 3D grid.

#[derive(Clone, Copy, Debug, Default)]
pub struct Siddon;

impl SystemMatrix for Siddon {

    fn update_system_matrix_row(system_matrix_row: &mut SystemMatrixRow, ray: &Ray, grid: &UniformGrid) {
        // Throw away previous ray's values
        system_matrix_row.clear();
        if let Some(hit) = ray_grid_hit(ray, grid) {
            Self::update_smatrix_row(system_matrix_row, ray, grid, hit);
        }
    }

    fn buffers(grid: &UniformGrid) -> SystemMatrixRow {
        let max_number_of_coupled_voxels_possible = grid.shape().iter().sum::<usize>();
        SystemMatrixRow(Vec::with_capacity(max_number_of_coupled_voxels_possible))
    }
}

impl Siddon {

    /// The system matrix row of a single ray, in a freshly allocated buffer
    pub fn new_system_matrix_row(ray: &Ray, grid: &UniformGrid) -> SystemMatrixRow {
        let mut system_matrix_row = Self::buffers(grid);
        Self::update_system_matrix_row(&mut system_matrix_row, ray, grid);
        system_matrix_row
    }

    /// Walk along the ray from where it enters the grid until it leaves,
    /// pushing each crossed voxel and the length of ray inside it.
    #[inline]
    fn update_smatrix_row(system_matrix_row: &mut SystemMatrixRow, ray: &Ray, grid: &UniformGrid, hit: GridHit) {
        let GridHit { n, entry, exit, mut index, delta_index } = hit;

        // Crossings shorter than this are rounding noise at voxel corners
        let negligible = NEGLIGIBLE_FRACTION * grid.spacing().iter().copied().fold(Lengthf32::INFINITY, Lengthf32::min);

        // Distance along the ray of the next voxel boundary in each dimension
        let mut next_boundary = [0.0; 3];
        for d in 0..3 {
            next_boundary[d] = next_crossing(ray, grid, d, index[d], delta_index[d]);
        }

        // How far we have moved along the ray
        let mut here = entry;

        loop {
            // Which voxel boundary will be hit next, and its position
            let (dimension, crossing) = argmin(next_boundary);
            let boundary = crossing.min(exit);

            // The weight is the length of ray in this voxel
            let weight = boundary - here;
            if weight > negligible {
                let voxel = [index[0] as usize, index[1] as usize, index[2] as usize];
                system_matrix_row.0.push((index3_to_1(voxel, n), weight));
            }

            // If we have traversed the whole grid, we're finished
            if crossing >= exit { break }

            // Move along ray until it leaves this voxel
            here = boundary;

            // Move index across the boundary we are crossing
            index[dimension] += delta_index[dimension];
            if index[dimension] < 0 || index[dimension] >= n[dimension] as i32 { break }

            next_boundary[dimension] = next_crossing(ray, grid, dimension, index[dimension], delta_index[dimension]);
        }
    }
}

const NEGLIGIBLE_FRACTION: Lengthf32 = 1e-5;

/// Direction components smaller than this are treated as parallel to the
/// corresponding grid planes
const PARALLEL: Lengthf32 = 1e-6;

/// Where a ray enters the grid, and how to step through it
#[derive(Debug)]
struct GridHit {
    n: BoxDim_u,
    /// Distances along the ray at which it enters and leaves the grid
    entry: Lengthf32,
    exit : Lengthf32,
    /// Voxel containing the entry point
    index: [i32; 3],
    /// Direction in which the index moves in each dimension: +1, -1 or 0
    delta_index: [i32; 3],
}

/// Intersect `ray` with the bounding box of `grid`. Returns `None` if the ray
/// misses, only grazes the box, or the grid is not 3D.
fn ray_grid_hit(ray: &Ray, grid: &UniformGrid) -> Option<GridHit> {
    let n = grid.box_dim()?;

    let mut entry = Lengthf32::NEG_INFINITY;
    let mut exit  = Lengthf32::INFINITY;
    for d in 0..3 {
        let (p, dir) = (ray.origin[d], ray.direction[d]);
        let (lo, hi) = (grid.lower(d), grid.upper(d));
        if dir.abs() < PARALLEL {
            if p < lo || p >= hi { return None }
        } else {
            let (t_lo, t_hi) = ((lo - p) / dir, (hi - p) / dir);
            entry = entry.max(t_lo.min(t_hi));
            exit  = exit .min(t_lo.max(t_hi));
        }
    }
    if !entry.is_finite() || entry >= exit { return None }

    let mut index       = [0; 3];
    let mut delta_index = [0; 3];
    for d in 0..3 {
        let dir  = ray.direction[d];
        let last = n[d] as i32 - 1;
        let fractional_index = |t: Lengthf32| (ray.origin[d] + dir * t - grid.lower(d)) / grid.spacing()[d];
        let i = if dir.abs() < PARALLEL {
            fractional_index(0.0).floor()
        } else if dir > 0.0 {
            delta_index[d] = 1;
            fractional_index(entry).floor()
        } else {
            delta_index[d] = -1;
            fractional_index(entry).ceil() - 1.0
        };
        index[d] = (i as i32).clamp(0, last);
    }
    Some(GridHit { n, entry, exit, index, delta_index })
}

/// Distance along `ray` at which it leaves voxel `index` through a boundary
/// perpendicular to dimension `d`
#[inline]
fn next_crossing(ray: &Ray, grid: &UniformGrid, d: usize, index: i32, delta_index: i32) -> Lengthf32 {
    if delta_index == 0 { return Lengthf32::INFINITY }
    let plane = if delta_index > 0 { index + 1 } else { index };
    let position = grid.lower(d) + plane as Lengthf32 * grid.spacing()[d];
    (position - ray.origin[d]) / ray.direction[d]
}

#[inline]
fn argmin(values: [Lengthf32; 3]) -> (usize, Lengthf32) {
    let mut best = (0, values[0]);
    for (d, &v) in values.iter().enumerate().skip(1) {
        if v < best.1 { best = (d, v) }
    }
    best
}


// ----- Imports ------------------------------------------------------------------------------------------
use crate::{
    geometry::Ray,
    grid::UniformGrid,
    index::{index3_to_1, BoxDim_u},
    system_matrix::{SystemMatrix, SystemMatrixRow},
    types::Lengthf32,
};
