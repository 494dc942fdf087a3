pub use crate::error::{Error, Result};
pub use crate::grid::{UniformGrid, Spacing};
pub use crate::gfunc::{GridFunction, ImageView};
pub use crate::geometry::{AcquisitionGeometry, Ray, View};
pub use crate::projector::{Operator, ForwardProjector, BackProjector};
pub use crate::landweber::{landweber, landweber_steps, estimate_normal_operator_norm, LandweberStep};
pub use crate::types::{Lengthf32, Anglef32, Weightf32, Intensityf32, Point, Vector};
