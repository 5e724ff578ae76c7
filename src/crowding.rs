//! Fraction of the measured flux that belongs to the target star

use crate::array_stats::nansum;
use crate::data::StampSequence;
use crate::error::PldError;

use ndarray::{Array1, Array3, Axis, Zip};

/// Crowding of every pixel and every cadence
#[derive(Clone, Debug, PartialEq)]
pub struct Crowding {
    /// Sum of target flux over sum of total flux, NaN pixels ignored
    pub per_cadence: Array1<f64>,
    /// Target flux over total flux, zero where either is missing or the total is zero
    pub per_pixel: Array3<f64>,
}

/// Compare the stamps of the whole scene with the stamps of the target alone
///
/// The per-cadence value is a ratio of sums, so brighter pixels weigh more. Pixels without a
/// usable total flux carry no crowding information and get zero instead of NaN.
///
/// Fails with [`PldError::InvalidInputShape`] if the sequences differ in shape and with
/// [`PldError::DegenerateFlux`] if the total flux of a cadence is zero.
pub fn compute_crowding(
    total: &StampSequence,
    target: &StampSequence,
) -> Result<Crowding, PldError> {
    total.check_same_shape(target)?;

    let per_pixel = Zip::from(total.view())
        .and(target.view())
        .map_collect(|&total, &target| {
            if total.is_nan() || target.is_nan() || total == 0.0 {
                0.0
            } else {
                target / total
            }
        });

    let per_cadence = total
        .view()
        .axis_iter(Axis(0))
        .zip(target.view().axis_iter(Axis(0)))
        .enumerate()
        .map(|(cadence, (total, target))| {
            let flux = nansum(&total);
            if flux == 0.0 || !flux.is_finite() {
                return Err(PldError::DegenerateFlux { cadence, flux });
            }
            Ok(nansum(&target) / flux)
        })
        .collect::<Result<Array1<_>, _>>()?;
    log::debug!(
        "crowding of {} cadences, mean {:?}",
        per_cadence.len(),
        per_cadence.mean()
    );

    Ok(Crowding {
        per_cadence,
        per_pixel,
    })
}
