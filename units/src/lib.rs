//! Physical quantities used at the boundaries of the reconstruction code:
//! configuration files and command-line arguments speak in `uom` quantities
//! (`"0.5 mm"`), the numerical kernels speak in the `f32` aliases of [`todo`].

pub mod todo;

pub use uom;
pub use uom::si::Quantity;
pub use uom::si::f32::{Angle, Length, Ratio};

mod units {
  pub use uom::si::{length::{micrometer, millimeter, centimeter},
                    ratio ::ratio,
                    angle ::{degree, radian, revolution},
  };
}

// Making values from float literals seems to be very long-winded, so provide
// some pithily-named convenience constructors.

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f32) -> $quantity { $quantity::new::<units::$unit>(x) }
  };
}

wrap!(cm     Length         centimeter);
wrap!(mm     Length         millimeter);
wrap!(um     Length         micrometer);
wrap!(ratio  Ratio               ratio);
wrap!(deg    Angle              degree);
wrap!(rad    Angle              radian);
wrap!(turn   Angle          revolution);

// Reverse direction of the above.
pub fn mm_   (x: Length) -> f32 { x.get::<units::millimeter>() }
pub fn ratio_(x: Ratio ) -> f32 { x.get::<units::ratio>() }
pub fn rad_  (x: Angle ) -> f32 { x.get::<units::radian>() }
pub fn deg_  (x: Angle ) -> f32 { x.get::<units::degree>() }

/// The half circle constant π, as an `Angle`.
pub fn half_turn() -> Angle { turn(0.5) }

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
  };
}
