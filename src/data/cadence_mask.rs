use crate::error::PldError;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};

/// Cadences excluded from a noise-model fit
///
/// The transit mask is the most common one: it holds every cadence where the transit curve is
/// below unity, so the noise model never learns the transit itself. An empty mask means that
/// the fit uses all cadences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CadenceMask {
    excluded: Array1<bool>,
}

impl CadenceMask {
    /// Mask excluding nothing
    pub fn none(n_cadences: usize) -> Self {
        Self {
            excluded: Array1::from_elem(n_cadences, false),
        }
    }

    /// Cadences where the relative flux is strictly below 1.0
    ///
    /// The threshold is exact: out-of-transit values of a transit model are exactly unity.
    pub fn from_transit_curve(transit_curve: ArrayView1<f64>) -> Self {
        Self {
            excluded: transit_curve.mapv(|x| x < 1.0),
        }
    }

    /// Mask excluding the given cadence indices, duplicates are allowed
    pub fn from_indices(
        n_cadences: usize,
        indices: impl IntoIterator<Item = usize>,
    ) -> Result<Self, PldError> {
        let mut mask = Self::none(n_cadences);
        for i in indices {
            if i >= n_cadences {
                return Err(PldError::shape(format!(
                    "cadence index {i} is out of range for {n_cadences} cadences"
                )));
            }
            mask.excluded[i] = true;
        }
        Ok(mask)
    }

    /// Cadences excluded by either mask
    pub fn union(&self, other: &Self) -> Result<Self, PldError> {
        self.check_len(other.n_cadences())?;
        let excluded = Zip::from(&self.excluded)
            .and(&other.excluded)
            .map_collect(|&a, &b| a || b);
        Ok(Self { excluded })
    }

    /// Total number of cadences the mask is defined for
    #[inline]
    pub fn n_cadences(&self) -> usize {
        self.excluded.len()
    }

    /// True if no cadence is excluded
    pub fn is_empty(&self) -> bool {
        self.n_excluded() == 0
    }

    pub fn n_excluded(&self) -> usize {
        self.excluded.iter().filter(|&&x| x).count()
    }

    pub fn n_kept(&self) -> usize {
        self.n_cadences() - self.n_excluded()
    }

    pub fn contains(&self, cadence: usize) -> bool {
        self.excluded.get(cadence).copied().unwrap_or(false)
    }

    /// Excluded cadence indices in increasing order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.excluded
            .iter()
            .enumerate()
            .filter_map(|(i, &x)| x.then_some(i))
    }

    fn kept_indices(&self) -> Vec<usize> {
        self.excluded
            .iter()
            .enumerate()
            .filter_map(|(i, &x)| (!x).then_some(i))
            .collect()
    }

    pub(crate) fn check_len(&self, n_cadences: usize) -> Result<(), PldError> {
        if self.n_cadences() == n_cadences {
            Ok(())
        } else {
            Err(PldError::shape(format!(
                "cadence mask covers {} cadences, data has {n_cadences}",
                self.n_cadences()
            )))
        }
    }

    /// Rows of kept cadences
    pub(crate) fn fit_rows(&self, x: ArrayView2<f64>) -> Array2<f64> {
        x.select(Axis(0), &self.kept_indices())
    }

    /// Elements of kept cadences
    pub(crate) fn fit_values(&self, y: ArrayView1<f64>) -> Array1<f64> {
        y.select(Axis(0), &self.kept_indices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn transit_threshold_is_exact() {
        let curve = array![1.0, 0.99, 1.0 - 1e-15, 1.0, f64::NAN];
        let mask = CadenceMask::from_transit_curve(curve.view());
        assert_eq!(mask.indices().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(mask.n_kept(), 3);
    }

    #[test]
    fn flat_curve_gives_empty_mask() {
        let curve = Array1::from_elem(10, 1.0);
        let mask = CadenceMask::from_transit_curve(curve.view());
        assert!(mask.is_empty());
        assert_eq!(mask.n_cadences(), 10);
        let y = Array1::linspace(0.0, 9.0, 10);
        assert_eq!(mask.fit_values(y.view()), y);
    }

    #[test]
    fn union_of_masks() {
        let a = CadenceMask::from_indices(5, [0, 2]).unwrap();
        let b = CadenceMask::from_indices(5, [2, 4]).unwrap();
        let u = a.union(&b).unwrap();
        assert_eq!(u.indices().collect::<Vec<_>>(), vec![0, 2, 4]);
        assert!(a.union(&CadenceMask::none(4)).is_err());
    }

    #[test]
    fn out_of_range_index() {
        assert!(matches!(
            CadenceMask::from_indices(3, [3]),
            Err(PldError::InvalidInputShape(_))
        ));
    }

    #[test]
    fn fit_rows_drop_excluded() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let mask = CadenceMask::from_indices(3, [1]).unwrap();
        assert_eq!(mask.fit_rows(x.view()), array![[1.0, 2.0], [5.0, 6.0]]);
        assert!(mask.contains(1));
        assert!(!mask.contains(7));
    }
}
