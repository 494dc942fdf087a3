/// Units which are simply type aliases for `f32` rather than having an
/// implementation as a `uom` `Quantity`.
///
/// The numerical kernels (ray tracing, projection, Landweber updates) work on
/// large dense arrays of plain floats, so they use these aliases rather than
/// `uom` quantities, but still want some clues in the source as to what the
/// numbers represent. Lengths are in the length unit of the grids, which the
/// configuration layer fixes to mm.

pub type Lengthf32    = f32;
pub type Anglef32     = f32; // radians
pub type Weightf32    = f32; // path length of a ray inside a voxel
pub type Ratiof32     = f32;
pub type Intensityf32 = f32; // TODO uom attenuation coefficient per length
