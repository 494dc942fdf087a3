//! Forward and backward projection between sample volumes and sinograms.
//!
//! Both directions are driven ray by ray: ray `r` is the flat (row-major)
//! index of the sinogram cell `(iu, iv, k)` it fills. The voxels it couples
//! to, and their weights, are obtained from the same `SystemMatrix`
//! implementation in both directions:
//!
//! + `ForwardProjector` gathers: `sinogram[r] = Σ_j w_rj volume[j]`
//!
//! + `BackProjector` scatters: `volume[j] += w_rj sinogram[r]`
//!
//! so the two are exact adjoints of each other.

/// Linear map between `GridFunction`s
pub trait Operator {
    fn apply(&self, input: &GridFunction) -> Result<GridFunction>;
}

impl<F> Operator for F
where
    F: Fn(&GridFunction) -> Result<GridFunction>,
{
    fn apply(&self, input: &GridFunction) -> Result<GridFunction> { self(input) }
}

/// Maps volumes on the sample grid to sinograms
#[derive(Clone)]
pub struct ForwardProjector<S = Siddon> {
    rays: Rays,
    system_matrix: PhantomData<fn() -> S>,
}

/// Maps sinograms back to volumes on the sample grid. The adjoint of
/// `ForwardProjector`.
#[derive(Clone)]
pub struct BackProjector<S = Siddon> {
    rays: Rays,
    system_matrix: PhantomData<fn() -> S>,
}

/// Forward and back projectors sharing one geometry
pub fn projectors(geometry: impl Into<Arc<AcquisitionGeometry>>) -> (ForwardProjector, BackProjector) {
    let geometry = geometry.into();
    (ForwardProjector::new(Arc::clone(&geometry)), BackProjector::new(geometry))
}

impl ForwardProjector {
    pub fn new(geometry: impl Into<Arc<AcquisitionGeometry>>) -> Self { Self::with_system_matrix(geometry) }
}

impl BackProjector {
    pub fn new(geometry: impl Into<Arc<AcquisitionGeometry>>) -> Self { Self::with_system_matrix(geometry) }
}

impl<S: SystemMatrix> ForwardProjector<S> {
    pub fn with_system_matrix(geometry: impl Into<Arc<AcquisitionGeometry>>) -> Self {
        Self { rays: Rays::new(geometry.into()), system_matrix: PhantomData }
    }
    pub fn geometry(&self) -> &Arc<AcquisitionGeometry> { &self.rays.geometry }
}

impl<S: SystemMatrix> BackProjector<S> {
    pub fn with_system_matrix(geometry: impl Into<Arc<AcquisitionGeometry>>) -> Self {
        Self { rays: Rays::new(geometry.into()), system_matrix: PhantomData }
    }
    pub fn geometry(&self) -> &Arc<AcquisitionGeometry> { &self.rays.geometry }
}

impl<S: SystemMatrix> Operator for ForwardProjector<S> {
    fn apply(&self, volume: &GridFunction) -> Result<GridFunction> {
        let geometry = &self.rays.geometry;
        check_grid(volume, geometry.sample_grid())?;
        let sinogram = project_forward::<S>(&self.rays, &volume.to_vec());
        GridFunction::from_vec(Arc::clone(geometry.sinogram_grid()), sinogram)
    }
}

impl<S: SystemMatrix> Operator for BackProjector<S> {
    fn apply(&self, sinogram: &GridFunction) -> Result<GridFunction> {
        let geometry = &self.rays.geometry;
        check_grid(sinogram, geometry.sinogram_grid())?;
        let volume = project_backward::<S>(&self.rays, &sinogram.to_vec());
        GridFunction::from_vec(Arc::clone(geometry.sample_grid()), volume)
    }
}

fn check_grid(input: &GridFunction, expected: &Arc<UniformGrid>) -> Result<()> {
    if input.grid() == expected { return Ok(()) }
    Err(Error::GeometryMismatch { expected: expected.to_string(), found: input.grid().to_string() })
}

/// Everything needed to reconstruct any ray from its index
#[derive(Clone)]
struct Rays {
    geometry: Arc<AcquisitionGeometry>,
    views: Vec<View>,
    /// Shape of the sinogram
    dims: BoxDim_u,
}

impl Rays {
    fn new(geometry: Arc<AcquisitionGeometry>) -> Self {
        let views = geometry.views();
        let dims = [geometry.detector_grid().shape()[0], geometry.detector_grid().shape()[1], views.len()];
        Self { geometry, views, dims }
    }

    fn len(&self) -> usize { self.dims.iter().product() }

    #[inline]
    fn ray(&self, r: Index1_u) -> Ray {
        let [iu, iv, k] = index1_to_3(r, self.dims);
        self.geometry.ray(&self.views[k], iu, iv)
    }

    fn sample_grid(&self) -> &UniformGrid { self.geometry.sample_grid() }
}

// ----- Serial drivers ----------------------------------------------------------------------
#[cfg(not(feature = "parallel"))]
fn project_forward<S: SystemMatrix>(rays: &Rays, volume: &[Intensityf32]) -> Vec<Intensityf32> {
    let grid = rays.sample_grid();
    let mut system_matrix_row = S::buffers(grid);
    (0..rays.len())
        .map(|r| {
            S::update_system_matrix_row(&mut system_matrix_row, &rays.ray(r), grid);
            forward_project(&system_matrix_row, volume)
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn project_backward<S: SystemMatrix>(rays: &Rays, sinogram: &[Intensityf32]) -> Vec<Intensityf32> {
    let grid = rays.sample_grid();
    let mut backprojection = vec![0.0; grid.n_cells()];
    let mut system_matrix_row = S::buffers(grid);
    for (r, &projection) in sinogram.iter().enumerate() {
        if projection == 0.0 { continue }
        S::update_system_matrix_row(&mut system_matrix_row, &rays.ray(r), grid);
        back_project(&mut backprojection, &system_matrix_row, projection);
    }
    backprojection
}

// ----- Parallel drivers --------------------------------------------------------------------
#[cfg(feature = "parallel")]
fn project_forward<S: SystemMatrix>(rays: &Rays, volume: &[Intensityf32]) -> Vec<Intensityf32> {
    let grid = rays.sample_grid();
    (0..rays.len())
        .into_par_iter()
        .map_init(
            || S::buffers(grid),
            |system_matrix_row, r| {
                S::update_system_matrix_row(system_matrix_row, &rays.ray(r), grid);
                forward_project(system_matrix_row, volume)
            })
        .collect()
}

#[cfg(feature = "parallel")]
fn project_backward<S: SystemMatrix>(rays: &Rays, sinogram: &[Intensityf32]) -> Vec<Intensityf32> {
    let grid = rays.sample_grid();
    let n_voxels = grid.n_cells();

    // Closure preparing the state needed by `fold`: will be called by
    // `fold` at the start of every thread that is launched.
    let initial_thread_state = || (vec![0.0; n_voxels], S::buffers(grid));

    // Rayon is too eager in spawning small jobs, each of which requires the
    // construction and subsequent combination of expensive accumulators
    // (whole volumes). So here we try to limit it to one job per thread.
    let job_size = (sinogram.len() / rayon::current_num_threads()).max(1);

    sinogram
        .par_iter()
        .enumerate()
        .with_min_len(job_size)
        .fold(initial_thread_state, |(mut backprojection, mut system_matrix_row), (r, &projection)| {
            if projection != 0.0 {
                S::update_system_matrix_row(&mut system_matrix_row, &rays.ray(r), grid);
                back_project(&mut backprojection, &system_matrix_row, projection);
            }
            (backprojection, system_matrix_row)
        })
        // Keep only the backprojection (ignore weights and indices)
        .map(|(backprojection, _)| backprojection)
        // Sum the backprojections calculated on each thread
        .reduce(|| vec![0.0; n_voxels], elementwise_add)
}

#[cfg(feature = "parallel")]
fn elementwise_add(a: Vec<f32>, b: Vec<f32>) -> Vec<f32> {
    a.iter().zip(b.iter()).map(|(l,r)| l+r).collect()
}


// ----- Imports ------------------------------------------------------------------------------------------
use std::{marker::PhantomData, sync::Arc};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    geometry::{AcquisitionGeometry, Ray, View},
    gfunc::GridFunction,
    grid::UniformGrid,
    index::{index1_to_3, BoxDim_u, Index1_u},
    system_matrix::{back_project, forward_project, Siddon, SystemMatrix},
    types::Intensityf32,
};
