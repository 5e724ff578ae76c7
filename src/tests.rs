pub use crate::config::{ApertureFitConfig, PldConfig};
pub use crate::data::{ApertureMask, StampSequence};
pub use crate::error::{FitStage, PldError};

pub use light_curve_pld_test_util::{REFERENCE_SCENE, SceneParams, SyntheticScene};
pub use ndarray::{Array1, Array2, Array3};
pub use rand::prelude::*;
pub use rand_distr::StandardNormal;

/// Matrix of independent uniform values in `[0, 1)`
pub fn random_matrix(rng: &mut StdRng, rows: usize, columns: usize) -> Array2<f64> {
    Array2::from_shape_simple_fn((rows, columns), || rng.random::<f64>())
}

/// Stamp sequence where every cadence repeats the same stamp
pub fn constant_stamps(n_cadences: usize, stamp: &Array2<f64>) -> Array3<f64> {
    let (rows, columns) = stamp.dim();
    Array3::from_shape_fn((n_cadences, rows, columns), |(_, i, j)| stamp[[i, j]])
}

/// Transit curve of unit relative flux with a box-shaped dip
pub fn box_transit(n_cadences: usize, start: usize, end: usize, depth: f64) -> Array1<f64> {
    Array1::from_shape_fn(n_cadences, |t| {
        if (start..=end).contains(&t) {
            1.0 - depth
        } else {
            1.0
        }
    })
}

#[macro_export]
macro_rules! assert_all_close {
    ($actual: expr, $desired: expr, $tol: expr $(,)?) => {{
        let actual = &$actual;
        let desired = &$desired;
        assert_eq!(actual.len(), desired.len(), "arrays have different lengths");
        for (i, (&a, &d)) in actual.iter().zip(desired.iter()).enumerate() {
            assert!(
                (a - d).abs() <= $tol,
                "element {i} differs: actual {a}, desired {d}, tolerance {}",
                $tol,
            );
        }
    }};
}
