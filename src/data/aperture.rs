use ndarray::{Array2, ArrayView2};

/// Pixels taking part in aperture-restricted detrending, the same for every cadence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApertureMask(Array2<bool>);

impl ApertureMask {
    pub fn new(mask: Array2<bool>) -> Self {
        Self(mask)
    }

    /// Aperture covering the whole stamp
    pub fn full(shape: (usize, usize)) -> Self {
        Self(Array2::from_elem(shape, true))
    }

    /// Mask from a multiplicative weight grid
    ///
    /// Pixels with finite non-zero weight are inside, zeros and NaN are outside. This is the
    /// convention of apertures multiplied into stamps, where NaN marks pixels to be dropped.
    pub fn from_weights(weights: ArrayView2<f64>) -> Self {
        Self(weights.mapv(|w| w.is_finite() && w != 0.0))
    }

    pub fn shape(&self) -> (usize, usize) {
        self.0.dim()
    }

    pub fn view(&self) -> ArrayView2<'_, bool> {
        self.0.view()
    }

    /// Number of pixels inside the aperture
    pub fn n_inside(&self) -> usize {
        self.0.iter().filter(|&&inside| inside).count()
    }

    /// Row-major positions of the pixels inside the aperture
    pub(crate) fn positions(&self) -> Vec<(usize, usize)> {
        self.0
            .indexed_iter()
            .filter_map(|(ij, &inside)| inside.then_some(ij))
            .collect()
    }
}

impl From<Array2<bool>> for ApertureMask {
    fn from(mask: Array2<bool>) -> Self {
        Self::new(mask)
    }
}
