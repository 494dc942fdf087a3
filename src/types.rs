pub use units::todo::{Lengthf32, Anglef32, Weightf32, Ratiof32, Intensityf32};

pub type Vector   = nalgebra::Vector3  <Lengthf32>;
pub type Point    = nalgebra::Point3   <Lengthf32>;
pub type Rotation = nalgebra::Rotation3<Anglef32>;

pub use crate::index::{BoxDim_u, Index1_u, Index3_u};
