//! Piecewise-constant test volumes built from axis-aligned cuboids.

/// Cells with indices in `start[d]..stop[d]` along each axis `d` are set to
/// `value`
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cuboid {
    pub start: Index3_u,
    pub stop : Index3_u,
    pub value: Intensityf32,
}

impl Cuboid {
    pub fn new(start: Index3_u, stop: Index3_u, value: Intensityf32) -> Self { Self { start, stop, value } }
}

/// A volume on `grid`, zero except in `cuboids`. Where cuboids overlap, the
/// later one wins.
pub fn phantom(grid: impl Into<Arc<UniformGrid>>, cuboids: &[Cuboid]) -> Result<GridFunction> {
    let grid = grid.into();
    let n = grid.box_dim()
        .ok_or_else(|| Error::InvalidGrid(format!("phantoms need a 3D grid, got {grid}")))?;
    let mut values = ArrayD::zeros(IxDyn(&n));
    for cuboid in cuboids {
        for d in 0..3 {
            let Cuboid { start, stop, .. } = cuboid;
            if stop[d] > n[d] {
                return Err(Error::IndexOutOfRange { what: format!("cuboid stop on axis {d}"), index: stop[d], bound: n[d] + 1 });
            }
            if start[d] > stop[d] {
                return Err(Error::InvalidParameter(format!("cuboid start {start:?} beyond stop {stop:?}")));
            }
        }
        values
            .slice_each_axis_mut(|ax| {
                let d = ax.axis.index();
                Slice::from(cuboid.start[d]..cuboid.stop[d])
            })
            .fill(cuboid.value);
    }
    GridFunction::new(grid, values)
}


// ----- Imports ------------------------------------------------------------------------------------------
use std::sync::Arc;

use ndarray::{ArrayD, IxDyn, Slice};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    gfunc::GridFunction,
    grid::UniformGrid,
    index::Index3_u,
    types::Intensityf32,
};
