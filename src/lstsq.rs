//! Linear least squares through normal equations

use crate::array_stats::lenf;
use crate::error::{FitStage, PldError};

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Least-squares coefficients of `y ≈ x · c`
///
/// Solves `(xᵀx) c = xᵀy`. Any rank deficiency, including fewer rows than columns or an
/// all-zero column, is [`PldError::SingularSystem`].
pub fn solve_normal_equations(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    stage: FitStage,
) -> Result<Array1<f64>, PldError> {
    let columns: Vec<usize> = (0..x.ncols()).collect();
    solve_for_columns(x, y, stage, &columns)
}

/// Least-squares coefficients where all-zero columns get exactly zero coefficient
///
/// All-zero columns carry no information, the system is solved for the remaining ones. It is
/// how regressor blocks with components of vanishing variance are handled.
pub fn solve_normal_equations_skip_empty(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    stage: FitStage,
) -> Result<Array1<f64>, PldError> {
    let columns: Vec<usize> = x
        .columns()
        .into_iter()
        .enumerate()
        .filter_map(|(j, column)| column.iter().any(|&v| v != 0.0).then_some(j))
        .collect();
    log::trace!(
        "{stage} fit skips {} empty columns of {}",
        x.ncols() - columns.len(),
        x.ncols()
    );
    solve_for_columns(x, y, stage, &columns)
}

fn solve_for_columns(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    stage: FitStage,
    columns: &[usize],
) -> Result<Array1<f64>, PldError> {
    let singular = || PldError::SingularSystem {
        stage,
        rows: x.nrows(),
        columns: columns.len(),
    };
    if x.nrows() != y.len() {
        return Err(PldError::shape(format!(
            "{stage} fit has {} regressor rows and {} target values",
            x.nrows(),
            y.len()
        )));
    }
    if columns.is_empty() || x.nrows() < columns.len() {
        return Err(singular());
    }

    // Unit-norm columns keep the normal matrix well scaled
    let active = x.select(Axis(1), columns);
    let norms = active.map_axis(Axis(0), |column| column.dot(&column).sqrt());
    if norms.iter().any(|&norm| norm == 0.0 || !norm.is_finite()) {
        return Err(singular());
    }
    let scaled = &active / &norms.view().insert_axis(Axis(0));

    let normal = scaled.t().dot(&scaled);
    let rhs = scaled.t().dot(&y);
    let n = columns.len();
    let normal = DMatrix::from_fn(n, n, |i, j| normal[[i, j]]);
    let rhs = DVector::from_iterator(n, rhs.iter().copied());

    let lu = normal.lu();
    let pivots = lu.u().diagonal().map(f64::abs);
    if pivots.min() <= pivots.max() * lenf(n) * f64::EPSILON {
        return Err(singular());
    }
    let solution = lu.solve(&rhs).ok_or_else(singular)?;
    if solution.iter().any(|c| !c.is_finite()) {
        return Err(singular());
    }

    let mut coefficients = Array1::zeros(x.ncols());
    for ((&j, &c), &norm) in columns.iter().zip(solution.iter()).zip(norms.iter()) {
        coefficients[j] = c / norm;
    }
    Ok(coefficients)
}
