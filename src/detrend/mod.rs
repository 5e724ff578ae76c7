mod aperture;
pub use aperture::AperturePld;

mod detrender;
pub use detrender::{Detrender, DetrenderTrait};

mod pld;
pub use pld::PixelLevelDecorrelation;

use crate::array_stats::nanmean;
use crate::data::CadenceMask;
use crate::error::{FitStage, PldError};
use crate::lstsq::{solve_normal_equations, solve_normal_equations_skip_empty};

use ndarray::{Array1, ArrayView1, ArrayView2};

/// Result of subtracting a noise model from a raw light curve
#[derive(Clone, Debug, PartialEq)]
pub struct DetrendedLightCurve {
    /// `raw - model + mean(raw)`
    pub detrended: Array1<f64>,
    /// Summed flux of every cadence
    pub raw: Array1<f64>,
    /// Noise model predicted for every cadence
    pub model: Array1<f64>,
    /// Regressor coefficients fitted on the cadences outside of the fit mask
    pub coefficients: Array1<f64>,
}

/// How the noise-model solver treats all-zero regressor columns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EmptyColumns {
    /// Zero coefficient, the column is left out of the system
    Skip,
    /// Singular system
    Reject,
}

/// Fit `regressors` to `raw` outside of `fit_mask` and predict the model for every cadence
pub(crate) fn fit_and_predict(
    regressors: ArrayView2<f64>,
    raw: Array1<f64>,
    fit_mask: &CadenceMask,
    stage: FitStage,
    empty_columns: EmptyColumns,
) -> Result<DetrendedLightCurve, PldError> {
    fit_mask.check_len(raw.len())?;
    let fit_x = fit_mask.fit_rows(regressors);
    let fit_y = fit_mask.fit_values(raw.view());
    log::debug!(
        "{stage} fit: {} of {} cadences, {} regressors",
        fit_x.nrows(),
        raw.len(),
        fit_x.ncols()
    );

    let coefficients = match empty_columns {
        EmptyColumns::Skip => solve_normal_equations_skip_empty(fit_x.view(), fit_y.view(), stage)?,
        EmptyColumns::Reject => solve_normal_equations(fit_x.view(), fit_y.view(), stage)?,
    };
    let model = regressors.dot(&coefficients);
    let detrended = restore_mean(raw.view(), model.view());

    Ok(DetrendedLightCurve {
        detrended,
        raw,
        model,
        coefficients,
    })
}

/// `raw - model + mean(raw)`, the model intercept absorbs the flux level
///
/// The mean skips NaN cadences.
fn restore_mean(raw: ArrayView1<f64>, model: ArrayView1<f64>) -> Array1<f64> {
    let mean = nanmean(raw).unwrap_or(0.0);
    &raw - &model + mean
}
