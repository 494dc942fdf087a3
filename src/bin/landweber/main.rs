mod cli;
use cli::Cli;

fn main() -> Result<(), Box<dyn Error>> {

    let args = Cli::parse();
    let mut progress = Progress::new();

    #[cfg(feature = "parallel")]
    // Set the maximum number of threads used by rayon for parallel iteration
    match rayon::ThreadPoolBuilder::new().num_threads(args.n_threads).build_global() {
        Err(e) => println!("{}", e),
        Ok(_)  => println!("Using up to {} threads.", args.n_threads),
    }

    progress.start(&format!("Reading configuration {:?}", args.config));
    let config = read_config_file(&args.config)?;
    progress.done();

    let geometry = Arc::new(config.geometry()?);
    let (forward, backward) = projectors(Arc::clone(&geometry));
    let sample_grid = geometry.sample_grid();
    create_dir_all(&args.output)?;
    let out = |name: &str| args.output.join(name);

    progress.start(&format!("Building phantom from {} cuboids", config.phantom.len()));
    let truth = phantom(Arc::clone(sample_grid), &config.phantom)?;
    truth.write_to_raw_file(out("phantom.xrgf"))?;
    progress.done();

    let n_rays = geometry.sinogram_grid().n_cells();
    progress.start(&format!("Simulating {} views, {} rays in total",
                            geometry.n_views(), group_digits(n_rays)));
    let data = forward.apply(&truth)?;
    data.write_to_raw_file(out("sinogram.xrgf"))?;
    progress.done();

    let step_size = match args.relax {
        Some(relax) => StepSize::Absolute(relax),
        None        => config.landweber.step_size()?,
    };
    let relax = match step_size {
        StepSize::Absolute(relax) => relax,
        StepSize::Relative(fraction) => {
            progress.start("Estimating ‖AᵗA‖ by power iteration");
            let norm = estimate_normal_operator_norm(&forward, &backward, sample_grid, config.landweber.power_iterations)?;
            progress.done_with_message(&format!("‖AᵗA‖ ≈ {norm:.4}"));
            fraction / norm as f32
        }
    };
    println!("Relaxation parameter: {relax:.4e}");

    let iterations = args.iterations.unwrap_or(config.landweber.iterations);
    let save_every = args.save_every.filter(|&n| n > 0);
    let tolerance  = config.landweber.tolerance;

    let bar = ProgressBar::new(iterations as u64);
    bar.set_style(ProgressStyle::default_bar()
                  .template("[{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise}) {msg}")?);

    let init = GridFunction::zeros(Arc::clone(sample_grid));
    let mut estimate = init.clone();
    for step in landweber_steps(&forward, &backward, &data, &init, relax)?.take(iterations) {
        let LandweberStep { iteration, residual_norm, estimate: next } = step?;
        if tolerance.map_or(false, |tolerance| residual_norm < tolerance) {
            bar.println(format!("Residual {residual_norm:.4e} below tolerance after {} iterations", iteration - 1));
            break;
        }
        estimate = next;
        bar.set_message(format!("residual {residual_norm:.4e}"));
        bar.inc(1);
        if save_every.map_or(false, |n| iteration % n == 0) {
            estimate.write_to_raw_file(out(&format!("estimate_{iteration:03}.xrgf")))?;
        }
    }
    bar.finish();

    progress.start("Writing reconstruction and its central slices");
    estimate.write_to_raw_file(out("reconstruction.xrgf"))?;
    for axis in 0..3 {
        let index = estimate.shape()[axis] / 2;
        estimate.slice(axis, index)?
            .write_to_raw_file(out(&format!("reconstruction_axis{axis}_{index:03}.xrgf")))?;
    }
    progress.done();

    let residual = (&forward.apply(&estimate)? - &data)?;
    let error    = (&estimate - &truth)?;
    println!("Final residual norm:      {:.4e}", residual.norm());
    println!("Distance from phantom:    {:.4e}", error.norm());
    Ok(())
}

// ----- Imports ------------------------------------------------------------------------------------------
use std::{error::Error, fs::create_dir_all, sync::Arc};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use xrayct::{
    config::recon::{read_config_file, StepSize},
    estimate_normal_operator_norm, landweber_steps,
    phantom::phantom,
    projector::projectors,
    utils::{group_digits, timing::Progress},
    GridFunction, LandweberStep, Operator,
};
