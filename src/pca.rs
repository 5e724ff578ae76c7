//! Projection of a regressor block onto its leading principal components

use crate::array_stats::lenf;

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_stats::{CorrelationExt, QuantileExt};

/// Safety factor applied to the rounding-noise variance estimate
const NOISE_VARIANCE_FACTOR: f64 = 16.0;

/// Scores of the `n_components` leading principal components of `data`
///
/// Rows of `data` are observations (cadences), columns are variables. The number of components
/// is capped by the number of variables, so the output has `min(n_components, ncols)` columns
/// and one row per observation. Components with variance indistinguishable from rounding noise,
/// including those that cannot exist because there are fewer observations than components, are
/// returned as exact zero columns. The sign of each component is chosen so that its
/// largest-magnitude score is positive.
pub fn principal_components(data: ArrayView2<f64>, n_components: usize) -> Array2<f64> {
    let (n_obs, n_vars) = data.dim();
    let n_components = n_components.min(n_vars);
    let mut scores = Array2::zeros((n_obs, n_components));
    if n_obs == 0 || n_components == 0 {
        return scores;
    }

    let mean = data
        .mean_axis(Axis(0))
        .expect("data has at least one observation");
    let centered = &data - &mean.insert_axis(Axis(0));

    if n_vars <= n_obs {
        // Eigenvectors of the covariance matrix are the loadings
        let cov = centered
            .t()
            .cov(0.0)
            .expect("data has at least one observation");
        let (values, vectors) = sorted_eigen(&cov);
        let tolerance = noise_variance(data, &values);
        let components = values.iter().zip(vectors.columns()).take(n_components);
        for (k, (&variance, loading)) in components.enumerate() {
            if variance <= tolerance {
                log::trace!("component {k} has variance {variance:e} below noise level");
                break;
            }
            scores.column_mut(k).assign(&centered.dot(&loading));
        }
    } else {
        // Fewer observations than variables, eigenvectors of the Gram matrix are scaled scores
        let gram = centered.dot(&centered.t()) / lenf(n_obs);
        let (values, vectors) = sorted_eigen(&gram);
        let tolerance = noise_variance(data, &values);
        let components = values.iter().zip(vectors.columns()).take(n_components);
        for (k, (&variance, u)) in components.enumerate() {
            if variance <= tolerance {
                log::trace!("component {k} has variance {variance:e} below noise level");
                break;
            }
            let singular_value = (variance * lenf(n_obs)).sqrt();
            scores.column_mut(k).assign(&(&u * singular_value));
        }
    }

    for mut column in scores.columns_mut() {
        let largest = column
            .iter()
            .copied()
            .reduce(|a, b| if b.abs() > a.abs() { b } else { a });
        if largest.is_some_and(|x| x < 0.0) {
            column.mapv_inplace(|x| -x);
        }
    }
    scores
}

/// Variance level indistinguishable from numerical noise
///
/// It is the larger of the rounding noise of centering `data` and the accuracy of the
/// eigendecomposition, which is relative to the largest eigenvalue.
fn noise_variance(data: ArrayView2<f64>, sorted_values: &Array1<f64>) -> f64 {
    let (n_obs, n_vars) = data.dim();
    let scale = *data.mapv(f64::abs).max_skipnan();
    // Error bound of the column mean accumulated over all observations
    let rounding = f64::EPSILON * scale * lenf(n_obs);
    let centering = lenf(n_vars) * rounding * rounding;
    let largest = sorted_values.first().copied().unwrap_or(0.0).max(0.0);
    let decomposition = lenf(sorted_values.len()) * f64::EPSILON * largest;
    NOISE_VARIANCE_FACTOR * centering.max(decomposition)
}

/// Eigenvalues in descending order together with the matching eigenvectors as columns
fn sorted_eigen(symmetric: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = symmetric.nrows();
    let matrix = DMatrix::from_fn(n, n, |i, j| symmetric[[i, j]]);
    let eigen = matrix.symmetric_eigen();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let values = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let vectors = Array2::from_shape_fn((n, n), |(row, k)| eigen.eigenvectors[(row, order[k])]);
    (values, vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    use approx::assert_relative_eq;
    use ndarray::{array, s};

    #[test]
    fn single_direction_is_recovered() {
        // Points on a line y = 2x, the first component carries all the variance
        let data = array![[0.0, 0.0], [1.0, 2.0], [2.0, 4.0], [5.0, 10.0]];
        let scores = principal_components(data.view(), 2);
        assert_eq!(scores.dim(), (4, 2));
        let norm = 5.0_f64.sqrt();
        let expected = array![-2.0, -1.0, 0.0, 3.0] * norm;
        for (&actual, &desired) in scores.column(0).iter().zip(expected.iter()) {
            assert_relative_eq!(actual, desired, epsilon = 1e-12);
        }
        assert!(scores.column(1).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn component_count_capped_by_variables() {
        let mut rng = StdRng::seed_from_u64(0);
        let data = random_matrix(&mut rng, 50, 9);
        let scores = principal_components(data.view(), 20);
        assert_eq!(scores.dim(), (50, 9));
    }

    #[test]
    fn constant_data_gives_zero_scores() {
        let data = Array2::from_elem((30, 4), 0.1);
        let scores = principal_components(data.view(), 3);
        assert!(scores.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn scores_are_uncorrelated_and_sorted() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = random_matrix(&mut rng, 200, 6);
        let scores = principal_components(data.view(), 6);
        let cov = scores.t().cov(0.0).unwrap();
        for i in 0..6 {
            for j in 0..6 {
                if i != j {
                    assert_relative_eq!(cov[[i, j]], 0.0, epsilon = 1e-10);
                }
            }
            if i > 0 {
                assert!(cov[[i - 1, i - 1]] >= cov[[i, i]]);
            }
        }
    }

    #[test]
    fn gram_and_covariance_branches_agree() {
        let mut rng = StdRng::seed_from_u64(2);
        // 8 observations, 8 variables goes through the covariance branch, adding a constant
        // ninth column switches to the Gram branch without changing the components
        let data = random_matrix(&mut rng, 8, 8);
        let mut wide = Array2::from_elem((8, 9), 0.5);
        wide.slice_mut(s![.., ..8]).assign(&data);
        let narrow_scores = principal_components(data.view(), 4);
        let wide_scores = principal_components(wide.view(), 4);
        for (&a, &b) in narrow_scores.iter().zip(wide_scores.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn missing_observations_give_zero_columns() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = random_matrix(&mut rng, 5, 40);
        let scores = principal_components(data.view(), 10);
        assert_eq!(scores.dim(), (5, 10));
        // Five centered observations span four dimensions at most
        for k in 4..10 {
            assert!(scores.column(k).iter().all(|&x| x == 0.0));
        }
        assert!(scores.column(3).iter().any(|&x| x != 0.0));
    }
}
