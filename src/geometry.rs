//! Parallel-beam acquisition geometry: where the sample sits, where the
//! detector sits, and how one is turned with respect to the other in each
//! view.
//!
//! Axis naming: with `a` the rotation axis, `b = (a+1) % 3` and
//! `c = (a+2) % 3`, the beam travels along `+c` in the laboratory frame,
//! detector axis 0 (`u`) runs along `b` and detector axis 1 (`v`) along `a`.
//! In view `k` the sample frame is turned about `a` by `angles[k]` with
//! respect to the laboratory frame, or by `-angles[k]` when it is the source
//! and detector which rotate.

#[derive(Clone, Debug)]
pub struct AcquisitionGeometry {
    sample_grid    : Arc<UniformGrid>,
    detector_grid  : Arc<UniformGrid>,
    sinogram_grid  : Arc<UniformGrid>,
    rotation_axis  : usize,
    angles         : Vec<Anglef32>,
    rotating_sample: bool,
}

/// The transform belonging to a single projection angle
#[derive(Clone, Copy, Debug)]
pub struct View {
    pub angle: Anglef32,
    /// Maps laboratory coordinates into the sample frame
    pub to_sample: Rotation,
}

/// Straight line along which a detector pixel integrates the sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin   : Point,
    /// Unit vector
    pub direction: Vector,
}

impl Ray {
    /// Ray starting at `p1`, heading towards `p2`
    pub fn through(p1: Point, p2: Point) -> Self {
        Self { origin: p1, direction: (p2 - p1).normalize() }
    }
}

impl AcquisitionGeometry {

    pub fn new(
        sample_grid    : impl Into<Arc<UniformGrid>>,
        detector_grid  : impl Into<Arc<UniformGrid>>,
        rotation_axis  : usize,
        angles         : Vec<Anglef32>,
        rotating_sample: bool,
    ) -> Result<Self> {
        let sample_grid   = sample_grid  .into();
        let detector_grid = detector_grid.into();
        if sample_grid.ndim() != 3 {
            return Err(Error::InvalidGrid(format!("sample grid must be 3D, got {sample_grid}")));
        }
        if detector_grid.ndim() != 2 {
            return Err(Error::InvalidGrid(format!("detector grid must be 2D, got {detector_grid}")));
        }
        if rotation_axis >= 3 {
            return Err(Error::InvalidParameter(format!("rotation axis must be 0, 1 or 2, got {rotation_axis}")));
        }
        if angles.is_empty() {
            return Err(Error::InvalidParameter("no projection angles".into()));
        }
        if angles.iter().any(|a| !a.is_finite()) {
            return Err(Error::InvalidParameter(format!("non-finite projection angle in {angles:?}")));
        }
        let sinogram_grid = Arc::new(Self::make_sinogram_grid(&detector_grid, &angles)?);
        Ok(Self { sample_grid, detector_grid, sinogram_grid, rotation_axis, angles, rotating_sample })
    }

    fn make_sinogram_grid(detector_grid: &UniformGrid, angles: &[Anglef32]) -> Result<UniformGrid> {
        let n = angles.len();
        let first = angles[0];
        let delta = if n > 1 { (angles[n - 1] - first).abs() / (n - 1) as Anglef32 } else { 0.0 };
        let delta = if delta > 0.0 { delta } else { 1.0 };
        detector_grid.with_axis_appended(n, delta, first - delta / 2.0)
    }

    pub fn sample_grid    (&self) -> &Arc<UniformGrid> { &self.sample_grid }
    pub fn detector_grid  (&self) -> &Arc<UniformGrid> { &self.detector_grid }
    /// Grid of the projection data: detector axes followed by the angle axis
    pub fn sinogram_grid  (&self) -> &Arc<UniformGrid> { &self.sinogram_grid }
    pub fn rotation_axis  (&self) -> usize             { self.rotation_axis }
    pub fn angles         (&self) -> &[Anglef32]       { &self.angles }
    pub fn rotating_sample(&self) -> bool              { self.rotating_sample }
    pub fn n_views        (&self) -> usize             { self.angles.len() }

    /// Rotation axis, detector `u` axis and beam axis, in that order
    pub fn frame_axes(&self) -> [usize; 3] {
        let a = self.rotation_axis;
        [a, (a + 1) % 3, (a + 2) % 3]
    }

    /// Angle and sample-frame rotation of view `k`
    ///
    /// # Panics
    ///
    /// If `k >= self.n_views()`.
    pub fn view(&self, k: usize) -> View {
        let angle = self.angles[k];
        let phi = if self.rotating_sample { angle } else { -angle };
        let sample_to_lab = Rotation::from_axis_angle(&Vector::ith_axis(self.rotation_axis), phi);
        View { angle, to_sample: sample_to_lab.inverse() }
    }

    pub fn views(&self) -> Vec<View> { (0..self.n_views()).map(|k| self.view(k)).collect() }

    /// The ray through the centre of detector pixel `(iu, iv)` in `view`,
    /// expressed in the sample frame. Its origin lies in the plane through
    /// the rotation axis perpendicular to the beam.
    pub fn ray(&self, view: &View, iu: usize, iv: usize) -> Ray {
        let [a, b, c] = self.frame_axes();
        let mut lab = Point::origin();
        lab[b] = self.detector_grid.coordinate(0, iu);
        lab[a] = self.detector_grid.coordinate(1, iv);
        Ray {
            origin   : view.to_sample * lab,
            direction: view.to_sample * Vector::ith(c, 1.0),
        }
    }
}


// ----- Imports ------------------------------------------------------------------------------------------
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    grid::UniformGrid,
    types::{Anglef32, Point, Rotation, Vector},
};
