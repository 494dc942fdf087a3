mod exports;
pub use exports::*;

pub mod types;
pub mod error;
pub mod index;
pub mod grid;
pub mod gfunc;
pub mod geometry;
pub mod system_matrix;
pub mod projector;
pub mod landweber;
pub mod phantom;
pub mod io;
pub mod config;
pub mod utils;
