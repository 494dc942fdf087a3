use std::sync::Arc;

use float_eq::assert_float_eq;
use ndarray::{ArrayD, IxDyn};
use ndarray_rand::{RandomExt, rand::SeedableRng, rand_distr::Uniform};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand_isaac::Isaac64Rng;
use rstest::rstest;

use xrayct::{projector::projectors, AcquisitionGeometry, GridFunction, Operator, UniformGrid};

fn random(grid: &Arc<UniformGrid>, seed: u64) -> GridFunction {
    let mut rng = Isaac64Rng::seed_from_u64(seed);
    let values: ArrayD<f32> = ArrayD::random_using(IxDyn(grid.shape()), Uniform::new(0.0, 1.0), &mut rng);
    GridFunction::new(Arc::clone(grid), values).unwrap()
}

fn linspace(start: f32, stop: f32, n: usize) -> Vec<f32> {
    if n == 1 { return vec![start] }
    (0..n).map(|i| start + (stop - start) * i as f32 / (n - 1) as f32).collect()
}

// ----- ⟨A x, y⟩ = ⟨x, Aᵗ y⟩ for any geometry ---------------------------------------------
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn back_projector_is_adjoint_of_forward_projector(
        sample_shape    in [2..8_usize, 2..8_usize, 2..8_usize],
        sample_spacing  in 0.3..(1.0 as f32),
        detector_shape  in [2..10_usize, 2..10_usize],
        detector_spacing in 0.3..(1.0 as f32),
        rotation_axis   in 0..3_usize,
        rotating_sample in any::<bool>(),
        angles          in prop::collection::vec(-3.2..(3.2 as f32), 1..5),
        seed            in any::<u64>(),
    ) {
        let sample   = UniformGrid::new(&sample_shape  , sample_spacing  ).unwrap();
        let detector = UniformGrid::new(&detector_shape, detector_spacing).unwrap();
        let geometry = AcquisitionGeometry::new(sample, detector, rotation_axis, angles, rotating_sample).unwrap();
        let (forward, backward) = projectors(geometry);

        let x = random(forward .geometry().sample_grid()  , seed);
        let y = random(backward.geometry().sinogram_grid(), seed.wrapping_add(1));

        let lhs = forward.apply(&x).unwrap().dot(&y).unwrap();
        let rhs = x.dot(&backward.apply(&y).unwrap()).unwrap();
        assert_float_eq!(lhs, rhs, r2nd <= 1e-4);
    }
}

// ----- Zero preservation and shape contracts ----------------------------------------------
#[rstest(/**/ rotation_axis, rotating_sample, n_angles,
         case(0            , true           , 1       ),
         case(1            , false          , 4       ),
         case(2            , true           , 11      ),
)]
fn shapes_and_zeros(rotation_axis: usize, rotating_sample: bool, n_angles: usize) {
    let sample   = UniformGrid::new(&[6, 7, 8], 0.5).unwrap();
    let detector = UniformGrid::new(&[9, 5]   , 0.5).unwrap();
    let angles = linspace(-1.5, 1.5, n_angles);
    let geometry = AcquisitionGeometry::new(sample, detector, rotation_axis, angles, rotating_sample).unwrap();
    let (forward, backward) = projectors(geometry);

    let volume   = GridFunction::zeros(Arc::clone(forward .geometry().sample_grid()));
    let sinogram = forward.apply(&volume).unwrap();
    assert_eq!(sinogram.shape(), &[9, 5, n_angles]);
    assert_eq!(sinogram.norm(), 0.0);

    let back = backward.apply(&sinogram).unwrap();
    assert_eq!(back.shape(), &[6, 7, 8]);
    assert_eq!(back.norm(), 0.0);
}

// ----- Rotating the sample by θ is rotating the detector by -θ ---------------------------
#[test]
fn conventions_are_mirror_images() {
    let make = |angles: Vec<f32>, rotating: bool| {
        let sample   = UniformGrid::new(&[8, 6, 5], 0.5).unwrap();
        let detector = UniformGrid::new(&[12, 6]  , 0.5).unwrap();
        let geometry = AcquisitionGeometry::new(sample, detector, 1, angles, rotating).unwrap();
        projectors(geometry).0
    };
    let sample_turns   = make(vec![ 0.3,  1.1], true);
    let detector_turns = make(vec![-0.3, -1.1], false);
    let x = random(sample_turns.geometry().sample_grid(), 7);
    let a = sample_turns  .apply(&x).unwrap().to_vec();
    let b = detector_turns.apply(&x).unwrap().to_vec();
    for (a, b) in a.iter().zip(&b) {
        assert_float_eq!(*a, *b, abs <= 1e-5);
    }
}

// ----- Slicing a projected volume --------------------------------------------------------
#[test]
fn sinogram_slices_are_single_views() {
    let sample   = UniformGrid::new(&[6, 6, 6], 0.5).unwrap();
    let detector = UniformGrid::new(&[8, 6]   , 0.5).unwrap();
    let geometry = AcquisitionGeometry::new(sample, detector, 2, linspace(0.0, 1.0, 3), true).unwrap();
    let (forward, _) = projectors(geometry);
    let x = random(forward.geometry().sample_grid(), 3);
    let sinogram = forward.apply(&x).unwrap();
    for k in 0..3 {
        let view = sinogram.slice(2, k).unwrap();
        let image = view.image().unwrap();
        assert_eq!(image.shape, [8, 6]);
        assert_eq!(image.spacing, [0.5, 0.5]);
        for (iu, iv) in itertools::iproduct!(0..8, 0..6) {
            assert_eq!(image.values[[iu, iv]], sinogram.get(&[iu, iv, k]).unwrap());
        }
    }
}
