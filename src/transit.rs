//! Transit depth recovery from a detrended light curve

use crate::array_stats::nanmedian;
use crate::error::{FitStage, PldError};
use crate::lstsq::solve_normal_equations;

use ndarray::{Array1, Array2, ArrayView1, Axis, stack};

/// Linear fit of a median-normalized light curve with a unit-depth transit shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthFit {
    /// Out-of-transit level relative to the median
    pub offset: f64,
    /// Fitted transit depth as a fraction of the median flux
    pub depth: f64,
}

/// Unit-depth transit shape, `(curve - 1) / reference_depth`
pub fn unit_depth_shape(transit_curve: ArrayView1<f64>, reference_depth: f64) -> Array1<f64> {
    transit_curve.mapv(|x| (x - 1.0) / reference_depth)
}

/// Fit `flux / median(flux) ≈ offset + depth * shape` over all cadences
///
/// `shape` is the transit curve turned into a unit-depth shape with `reference_depth`, the
/// depth it was injected with. The median ignores NaN.
///
/// Fails with [`PldError::DegenerateMedian`] if the median is zero or undefined,
/// [`PldError::DegenerateFlux`] at the first non-finite flux value and
/// [`PldError::SingularSystem`] if the transit curve is flat.
pub fn fit_transit(
    transit_curve: ArrayView1<f64>,
    reference_depth: f64,
    flux: ArrayView1<f64>,
) -> Result<DepthFit, PldError> {
    if transit_curve.len() != flux.len() {
        return Err(PldError::shape(format!(
            "transit curve has {} cadences and flux has {}",
            transit_curve.len(),
            flux.len()
        )));
    }
    if !(reference_depth.is_finite() && reference_depth > 0.0) {
        return Err(PldError::InvalidConfig(format!(
            "reference depth must be positive and finite, got {reference_depth}"
        )));
    }
    let median = nanmedian(flux).unwrap_or(f64::NAN);
    if median == 0.0 || !median.is_finite() {
        return Err(PldError::DegenerateMedian(median));
    }
    if let Some((cadence, &value)) = flux.iter().enumerate().find(|(_, x)| !x.is_finite()) {
        return Err(PldError::DegenerateFlux {
            cadence,
            flux: value,
        });
    }

    let shape = unit_depth_shape(transit_curve, reference_depth);
    let ones = Array1::ones(shape.len());
    let design: Array2<f64> = stack(Axis(1), &[ones.view(), shape.view()])
        .map_err(|err| PldError::shape(err.to_string()))?;
    let normalized = flux.mapv(|x| x / median);

    let coefficients =
        solve_normal_equations(design.view(), normalized.view(), FitStage::TransitDepth)?;
    let fit = DepthFit {
        offset: coefficients[0],
        depth: coefficients[1],
    };
    log::debug!(
        "recovered transit depth {} at offset {}",
        fit.depth,
        fit.offset
    );
    Ok(fit)
}

/// Depth part of [`fit_transit`]
pub fn recover_depth(
    transit_curve: ArrayView1<f64>,
    reference_depth: f64,
    flux: ArrayView1<f64>,
) -> Result<f64, PldError> {
    fit_transit(transit_curve, reference_depth, flux).map(|fit| fit.depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    use approx::assert_relative_eq;

    #[test]
    fn injected_depth_is_recovered() {
        let curve = box_transit(100, 40, 60, 0.01);
        for depth in [0.002, 0.01, 0.05] {
            let flux = curve.mapv(|x| 1000.0 * (1.0 + (x - 1.0) / 0.01 * depth));
            let fit = fit_transit(curve.view(), 0.01, flux.view()).unwrap();
            assert_relative_eq!(fit.depth, depth, epsilon = 1e-6);
            assert_relative_eq!(fit.offset, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn shape_is_unit_depth() {
        let curve = box_transit(10, 2, 4, 0.03);
        let shape = unit_depth_shape(curve.view(), 0.03);
        assert_relative_eq!(shape[3], -1.0, epsilon = 1e-12);
        assert_eq!(shape[0], 0.0);
    }

    #[test]
    fn depth_is_relative_to_median() {
        let curve = box_transit(50, 10, 20, 0.01);
        for level in [1e-3, 1.0, 5e4] {
            let flux = curve.mapv(|x| level * x);
            let fit = fit_transit(curve.view(), 0.01, flux.view()).unwrap();
            assert_relative_eq!(fit.depth, 0.01, epsilon = 1e-9);
            assert_relative_eq!(fit.offset, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn all_nan_flux_is_degenerate() {
        let curve = box_transit(5, 1, 2, 0.01);
        let flux = Array1::from_elem(5, f64::NAN);
        assert!(matches!(
            fit_transit(curve.view(), 0.01, flux.view()),
            Err(PldError::DegenerateMedian(m)) if m.is_nan()
        ));
    }

    #[test]
    fn nan_flux_cadence_is_rejected() {
        let curve = box_transit(100, 40, 60, 0.01);
        let mut flux = curve.mapv(|x| 1000.0 * x);
        flux[3] = f64::NAN;
        assert!(matches!(
            fit_transit(curve.view(), 0.01, flux.view()),
            Err(PldError::DegenerateFlux { cadence: 3, flux }) if flux.is_nan()
        ));

        flux[3] = 1000.0;
        flux[70] = f64::INFINITY;
        assert!(matches!(
            fit_transit(curve.view(), 0.01, flux.view()),
            Err(PldError::DegenerateFlux { cadence: 70, .. })
        ));
    }

    #[test]
    fn flat_curve_is_singular() {
        let curve = Array1::ones(30);
        let flux = Array1::from_elem(30, 10.0);
        assert!(matches!(
            fit_transit(curve.view(), 0.01, flux.view()),
            Err(PldError::SingularSystem {
                stage: FitStage::TransitDepth,
                ..
            })
        ));
    }

    #[test]
    fn zero_median_is_degenerate() {
        let curve = box_transit(5, 1, 2, 0.01);
        let flux = Array1::zeros(5);
        assert_eq!(
            fit_transit(curve.view(), 0.01, flux.view()),
            Err(PldError::DegenerateMedian(0.0))
        );
    }

    #[test]
    fn nonpositive_reference_depth() {
        let curve = box_transit(5, 1, 2, 0.01);
        let flux = Array1::ones(5);
        assert!(matches!(
            fit_transit(curve.view(), 0.0, flux.view()),
            Err(PldError::InvalidConfig(_))
        ));
    }

    #[test]
    fn length_mismatch() {
        let curve = box_transit(5, 1, 2, 0.01);
        let flux = Array1::ones(6);
        assert!(matches!(
            fit_transit(curve.view(), 0.01, flux.view()),
            Err(PldError::InvalidInputShape(_))
        ));
    }
}
