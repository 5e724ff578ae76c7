use crate::data::{ApertureMask, StampSequence};
use crate::error::PldError;

use ndarray::{Array1, Array2, ArrayView2, Axis};

/// NaN-free pixel readings flattened to a `(cadence, pixel)` matrix
///
/// Every cadence has the same number of pixels, which is what the regressor builders rely on.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatPixels {
    pixels: Array2<f64>,
}

impl FlatPixels {
    /// All pixels of the stamps, NaN replaced by zero
    pub fn zero_filled(stamps: &StampSequence) -> Self {
        Self {
            pixels: stamps.zero_filled_pixels(),
        }
    }

    /// Pixels inside the aperture, NaN readings are dropped
    ///
    /// Fails if the aperture shape differs from the stamp shape, if no pixels survive, or if the
    /// number of surviving pixels changes from cadence to cadence.
    pub fn from_aperture(
        stamps: &StampSequence,
        aperture: &ApertureMask,
    ) -> Result<Self, PldError> {
        if aperture.shape() != stamps.stamp_shape() {
            return Err(PldError::shape(format!(
                "aperture is {:?} while stamps are {:?}",
                aperture.shape(),
                stamps.stamp_shape()
            )));
        }
        let positions = aperture.positions();

        let mut rows = Vec::with_capacity(stamps.n_cadences());
        for t in 0..stamps.n_cadences() {
            let stamp = stamps.cadence(t);
            let row: Vec<f64> = positions
                .iter()
                .map(|&ij| stamp[ij])
                .filter(|x| !x.is_nan())
                .collect();
            rows.push(row);
        }

        let n_pixels = rows[0].len();
        if n_pixels == 0 {
            return Err(PldError::shape("aperture contains no valid pixels"));
        }
        if let Some((cadence, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_pixels) {
            return Err(PldError::shape(format!(
                "aperture keeps {} pixels at cadence {cadence} but {n_pixels} at cadence 0",
                row.len()
            )));
        }

        let pixels = Array2::from_shape_vec((rows.len(), n_pixels), rows.concat())
            .map_err(|err| PldError::shape(err.to_string()))?;
        Ok(Self { pixels })
    }

    #[inline]
    pub fn n_cadences(&self) -> usize {
        self.pixels.nrows()
    }

    #[inline]
    pub fn n_pixels(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn pixels(&self) -> ArrayView2<'_, f64> {
        self.pixels.view()
    }

    /// Total flux of every cadence
    pub fn flux(&self) -> Array1<f64> {
        self.pixels.sum_axis(Axis(1))
    }

    /// Pixels divided by the total flux of their cadence
    ///
    /// Fails with [`PldError::DegenerateFlux`] on the first cadence with zero or non-finite flux.
    pub fn normalized(&self) -> Result<Array2<f64>, PldError> {
        let flux = self.flux();
        if let Some((cadence, &flux)) = flux
            .iter()
            .enumerate()
            .find(|(_, f)| !f.is_finite() || **f == 0.0)
        {
            return Err(PldError::DegenerateFlux { cadence, flux });
        }
        Ok(&self.pixels / &flux.insert_axis(Axis(1)))
    }
}
