//! Landweber iteration: gradient descent on `½‖A x − data‖²`,
//!
//! ```text
//! x_{k+1} = x_k − relax · Aᵗ(A x_k − data)
//! ```
//!
//! `A` and `Aᵗ` are supplied by the caller as a pair of `Operator`s. The
//! residual norms are non-increasing for `0 < relax < 2/‖AᵗA‖`; outside that
//! range the iteration diverges, and nothing here tries to detect or prevent
//! that.

/// One completed iteration
#[derive(Clone, Debug)]
pub struct LandweberStep {
    /// Counts from 1
    pub iteration: usize,
    /// `‖A x − data‖` of the estimate this iteration started from
    pub residual_norm: f64,
    /// The estimate produced by this iteration
    pub estimate: GridFunction,
}

/// Run `niter` Landweber iterations starting from `init_guess`, stopping
/// early if the residual norm of the current estimate drops below
/// `tolerance`.
pub fn landweber<F, B>(
    forward   : &F,
    backward  : &B,
    data      : &GridFunction,
    init_guess: &GridFunction,
    niter     : usize,
    relax     : Intensityf32,
    tolerance : Option<f64>,
) -> Result<GridFunction>
where
    F: Operator + ?Sized,
    B: Operator + ?Sized,
{
    if niter == 0 {
        return Err(Error::InvalidParameter("number of iterations must be positive".into()));
    }
    check_relax(relax)?;
    if let Some(tolerance) = tolerance {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(Error::InvalidParameter(format!("tolerance must be non-negative and finite, got {tolerance}")));
        }
    }
    let mut current = init_guess.clone();
    for _ in 0..niter {
        let residual = residual(forward, &current, data)?;
        if tolerance.map_or(false, |tolerance| residual.norm() < tolerance) { break }
        current = update(backward, &current, &residual, relax)?;
    }
    Ok(current)
}

/// The same iteration as `landweber`, as an unbounded lazy sequence. The
/// caller decides when to stop, typically with `take`.
///
/// The sequence ends after yielding the first error.
pub fn landweber_steps<'a, F, B>(
    forward   : &'a F,
    backward  : &'a B,
    data      : &'a GridFunction,
    init_guess: &GridFunction,
    relax     : Intensityf32,
) -> Result<impl Iterator<Item = Result<LandweberStep>> + 'a>
where
    F: Operator + ?Sized,
    B: Operator + ?Sized,
{
    check_relax(relax)?;
    let mut current = init_guess.clone();
    let mut iteration = 0;
    let mut failed = false;

    // Return an iterator which generates an infinite sequence of estimates,
    // each one made by performing one iteration on the previous one
    Ok(std::iter::from_fn(move || {
        if failed { return None }
        let step = residual(forward, &current, data).and_then(|residual| {
            let estimate = update(backward, &current, &residual, relax)?;
            Ok((residual.norm(), estimate))
        });
        match step {
            Ok((residual_norm, estimate)) => {
                iteration += 1;
                current = estimate.clone();
                Some(Ok(LandweberStep { iteration, residual_norm, estimate }))
            }
            Err(e) => {
                failed = true;
                Some(Err(e))
            }
        }
    }))
}

/// Estimate `‖AᵗA‖` by `iterations` steps of power iteration on
/// `backward ∘ forward`, starting from a constant function on `grid`.
///
/// The estimate approaches the largest eigenvalue from below, so `2/estimate`
/// slightly overestimates the stable bound on `relax`.
pub fn estimate_normal_operator_norm<F, B>(
    forward   : &F,
    backward  : &B,
    grid      : &Arc<UniformGrid>,
    iterations: usize,
) -> Result<f64>
where
    F: Operator + ?Sized,
    B: Operator + ?Sized,
{
    if iterations == 0 {
        return Err(Error::InvalidParameter("power iteration needs at least one step".into()));
    }
    let mut x = GridFunction::constant(Arc::clone(grid), 1.0);
    let mut estimate = 0.0;
    for _ in 0..iterations {
        let norm = x.norm();
        if norm == 0.0 { return Ok(0.0) }
        x = &x * (1.0 / norm) as Intensityf32;
        let y = backward.apply(&forward.apply(&x)?)?;
        // Rayleigh quotient of the normalized x
        estimate = x.dot(&y)?;
        x = y;
    }
    Ok(estimate)
}

fn check_relax(relax: Intensityf32) -> Result<()> {
    if relax.is_finite() && relax > 0.0 { Ok(()) }
    else { Err(Error::InvalidParameter(format!("relaxation must be positive and finite, got {relax}"))) }
}

fn residual<F: Operator + ?Sized>(forward: &F, current: &GridFunction, data: &GridFunction) -> Result<GridFunction> {
    &forward.apply(current)? - data
}

fn update<B: Operator + ?Sized>(
    backward: &B,
    current : &GridFunction,
    residual: &GridFunction,
    relax   : Intensityf32,
) -> Result<GridFunction> {
    current - &(relax * &backward.apply(residual)?)
}


// ----- Imports ------------------------------------------------------------------------------------------
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    gfunc::GridFunction,
    grid::UniformGrid,
    projector::Operator,
    types::Intensityf32,
};
