//! Configuration file parser for simulation + reconstruction runs

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub landweber: Landweber,

    /// Grid on which volumes are reconstructed
    pub sample: GridConfig,

    /// Detector pixel grid
    pub detector: GridConfig,

    pub acquisition: Acquisition,

    /// Cuboids making up the simulated sample
    #[serde(default)]
    pub phantom: Vec<Cuboid>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Landweber {
    /// Number of Landweber iterations to perform
    pub iterations: usize,

    /// Relaxation parameter, used as given
    #[serde(default)]
    pub relax: Option<Intensityf32>,

    /// Relaxation parameter as a fraction of `1/‖AᵗA‖`, where the norm is
    /// estimated by power iteration
    #[serde(default)]
    pub relative_relax: Option<Intensityf32>,

    /// Stop early when the residual norm drops below this
    #[serde(default)]
    pub tolerance: Option<f64>,

    /// Number of power iterations used to estimate `‖AᵗA‖`
    #[serde(default = "default_power_iterations")]
    pub power_iterations: usize,
}

/// How the relaxation parameter is specified
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepSize {
    Absolute(Intensityf32),
    Relative(Intensityf32),
}

impl Landweber {
    pub fn step_size(&self) -> Result<StepSize> {
        match (self.relax, self.relative_relax) {
            (Some(relax), None) => Ok(StepSize::Absolute(relax)),
            (None, Some(relax)) => Ok(StepSize::Relative(relax)),
            _ => Err(Error::InvalidParameter(
                "exactly one of `relax` and `relative_relax` must be given".into())),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    pub shape: Vec<usize>,

    /// One length for all axes, or one per axis
    #[serde(deserialize_with = "deserialize_uom_one_or_many")]
    pub spacing: Vec<Length>,

    /// Lower corner of the grid. Centred on zero when absent.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_uom_many_opt")]
    pub origin: Option<Vec<Length>>,
}

impl GridConfig {
    /// The grid, with lengths in mm
    pub fn grid(&self) -> Result<UniformGrid> {
        let spacing: Vec<Lengthf32> = self.spacing.iter().copied().map(mm_).collect();
        let spacing = if spacing.len() == 1 { Spacing::Uniform(spacing[0]) }
                      else                   { Spacing::PerAxis(spacing)  };
        let origin: Option<Vec<Lengthf32>> = self.origin.as_ref()
            .map(|o| o.iter().copied().map(mm_).collect());
        UniformGrid::with_origin(&self.shape, spacing, origin.as_deref())
    }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Acquisition {
    /// Index of the sample axis about which the rotation takes place
    pub rotation_axis: usize,

    /// Whether it is the sample (rather than source and detector) that rotates
    #[serde(default = "default_true")]
    pub rotating_sample: bool,

    pub angles: Angles,
}

/// `count` equally spaced angles from `start` to `stop`, both included
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Angles {
    #[serde(deserialize_with = "deserialize_uom")]
    pub start: Angle,
    #[serde(deserialize_with = "deserialize_uom")]
    pub stop: Angle,
    pub count: usize,
}

impl Angles {
    pub fn radians(&self) -> Vec<Anglef32> {
        let (start, stop) = (rad_(self.start), rad_(self.stop));
        match self.count {
            0 => vec![],
            1 => vec![start],
            n => {
                let step = (stop - start) / (n - 1) as Anglef32;
                (0..n).map(|i| start + i as Anglef32 * step).collect()
            }
        }
    }
}

impl Config {
    pub fn geometry(&self) -> Result<AcquisitionGeometry> {
        AcquisitionGeometry::new(
            self.sample  .grid()?,
            self.detector.grid()?,
            self.acquisition.rotation_axis,
            self.acquisition.angles.radians(),
            self.acquisition.rotating_sample,
        )
    }
}

fn default_power_iterations() -> usize { 20 }
fn default_true() -> bool { true }

pub fn read_config_file(path: impl AsRef<Path>) -> Result<Config> {
    let config: String = fs::read_to_string(path)?;
    Ok(toml::from_str(&config)?)
}

// ----- Deserializers for quantities written as strings, such as "0.5 mm" -----
fn deserialize_uom<'d, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    String::deserialize(deserializer)?
        .parse::<T>()
        .map_err(de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn parse_all<T, E>(items: Vec<String>) -> std::result::Result<Vec<T>, E>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
    E: de::Error,
{
    items.iter().map(|s| s.parse::<T>().map_err(E::custom)).collect()
}

fn deserialize_uom_one_or_many<'d, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One (item ) => parse_all(vec![item]),
        OneOrMany::Many(items) => parse_all(items),
    }
}

fn deserialize_uom_many_opt<'d, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    Option::<Vec<String>>::deserialize(deserializer)?
        .map(parse_all)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use pretty_assertions::assert_eq;
    use units::{cm, deg, mm};

    // ----- Test an example on-disk config file -----------------------------------------
    #[test]
    fn test_config_file() {
        let config = read_config_file("recon-config.toml").unwrap();
        assert_eq!(config.landweber.iterations, 10);
        assert_eq!(config.landweber.step_size().unwrap(), StepSize::Relative(0.5));
        assert_eq!(config.sample  .shape, vec![100, 75, 50]);
        assert_eq!(config.detector.shape, vec![200, 150]);
        assert_eq!(config.sample  .spacing, vec![mm(0.5)]);
        assert_eq!(config.detector.spacing, vec![mm(0.4)]);
        assert_eq!(config.acquisition.rotation_axis, 2);
        assert!   (config.acquisition.rotating_sample);
        assert_eq!(config.acquisition.angles.count, 181);
        assert_eq!(config.phantom, vec![Cuboid::new([25, 17, 20], [75, 57, 30], 1.0)]);

        let geometry = config.geometry().unwrap();
        assert_eq!(geometry.sinogram_grid().shape(), &[200, 150, 181]);
    }

    // ----- Some helpers to make the tests more concise ---------------------------------
    //  ---  Parse string as TOML  -------------------------
    fn parse<'d, D: Deserialize<'d>>(input: &'d str) -> D {
        toml::from_str(input).unwrap()
    }
    //  ---  Macro for concise assertions about values of parsed fields -------------------
    macro_rules! check {
        ($type:ident($text:expr) fields: $($field:ident = $expected:expr);+$(;)?) => {
            let config: $type = parse::<$type>($text);
            println!("DESERIALIZED: {config:?}");
            $(assert_eq!(config.$field, $expected);)*
        }
    }
    // ----- Test deserializing of individual aspects of the Config type ----------------
    #[test]
    fn config_landweber() {
        check!{Landweber("iterations = 50 \n relax = 0.01") fields:
               iterations       = 50;
               relax            = Some(0.01);
               relative_relax   = None;
               tolerance        = None;
               power_iterations = 20;
        }
        check!{Landweber(r#"
                 iterations = 4
                 relative_relax = 0.9
                 tolerance = 1e-3
                 power_iterations = 5
               "#) fields:
               iterations       = 4;
               relative_relax   = Some(0.9);
               tolerance        = Some(1e-3);
               power_iterations = 5;
        }
    }

    #[test]
    fn relax_must_be_given_exactly_once() {
        let neither: Landweber = parse("iterations = 1");
        let both   : Landweber = parse("iterations = 1 \n relax = 0.1 \n relative_relax = 0.5");
        assert!(matches!(neither.step_size(), Err(Error::InvalidParameter(_))));
        assert!(matches!(both   .step_size(), Err(Error::InvalidParameter(_))));
    }

    // ----- Make sure that unknown fields are not accepted -----------------------------
    #[test]
    fn config_reject_unknown_field() {
        let result: std::result::Result<Landweber, _> = toml::from_str("iterations = 1 \n unknown_field = 666");
        assert!(result.is_err());
    }

    // ----- Test grid parameters ----------------------------------------------------------
    #[test]
    fn config_grid() {
        check!{GridConfig(r#"
                     shape = [10, 20, 30]
                     spacing = ["1 mm", "2 mm", "0.5 cm"]
                     origin = ["-5 mm", "0 mm", "1 cm"]
               "#)
        fields:
               shape   = vec![10, 20, 30];
               spacing = vec![mm(1.0), mm(2.0), cm(0.5)];
               origin  = Some(vec![mm(-5.0), mm(0.0), cm(1.0)]);
        }
        let grid = parse::<GridConfig>(r#"shape = [4, 2]
                                          spacing = "0.5 mm""#).grid().unwrap();
        assert_eq!(grid.spacing(), &[0.5, 0.5]);
        assert_eq!(grid.origin (), &[-1.0, -0.5]);
    }

    #[test]
    fn bad_length_is_rejected() {
        for spacing in ["0.5 s", "0.5 kg", "0.5 bananas", "half a mm"] {
            let text = format!("shape = [4, 2]\nspacing = {spacing:?}");
            let result: std::result::Result<GridConfig, _> = toml::from_str(&text);
            assert!(result.is_err(), "{spacing} accepted as a length");
        }
    }

    // ----- Test acquisition parameters ---------------------------------------------------
    #[test]
    fn config_angles() {
        let angles: Angles = parse(r#"start = "-90 °"
                                      stop  = "90 °"
                                      count = 7"#);
        assert_eq!(angles.start, deg(-90.0));
        let radians = angles.radians();
        assert_eq!(radians.len(), 7);
        assert_float_eq!(radians[0], -std::f32::consts::FRAC_PI_2, abs <= 1e-6);
        assert_float_eq!(radians[3],  0.0                        , abs <= 1e-6);
        assert_float_eq!(radians[6],  std::f32::consts::FRAC_PI_2, abs <= 1e-6);
    }

    #[test]
    fn rotating_sample_by_default() {
        let acquisition: Acquisition = parse(r#"rotation_axis = 1
                                                angles = { start = "0 °", stop = "0 °", count = 1 }"#);
        assert!(acquisition.rotating_sample);
        assert_eq!(acquisition.angles.radians(), vec![0.0]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(read_config_file("no-such-file.toml"), Err(Error::Io(_))));
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use std::{fs, path::Path, str::FromStr};

use serde::{de, Deserialize, Deserializer};

use units::{mm_, rad_, Angle, Length};

use crate::{
    error::{Error, Result},
    geometry::AcquisitionGeometry,
    grid::{Spacing, UniformGrid},
    phantom::Cuboid,
    types::{Anglef32, Intensityf32, Lengthf32},
};
