#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "landweber", about = "Simulate parallel-beam projections of a phantom and reconstruct it with Landweber iterations")]
pub struct Cli {

    /// TOML file describing grids, acquisition, phantom and solver
    #[clap(short, long, default_value = "recon-config.toml")]
    pub config: PathBuf,

    /// Directory where volumes, sinogram and slices are written
    #[clap(short, long, default_value = "landweber-out")]
    pub output: PathBuf,

    /// Number of iterations, overriding the configuration file
    #[clap(short, long)]
    pub iterations: Option<usize>,

    /// Absolute relaxation parameter, overriding the configuration file
    #[clap(short, long)]
    pub relax: Option<f32>,

    /// Write the estimate after every this many iterations
    #[clap(short, long)]
    pub save_every: Option<usize>,

    #[cfg(feature = "parallel")]
    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub n_threads: usize,
}

use std::path::PathBuf;
