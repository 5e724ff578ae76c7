//! Regressor basis of pixel-level decorrelation

mod store;
pub use store::{BasisKey, BasisStore, CachedColumns, InMemoryBasisStore};

use crate::config::{PldConfig, PldOrder};
use crate::data::FlatPixels;
use crate::error::PldError;
use crate::pca::principal_components;

use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

/// Regressor matrix with one row per cadence
///
/// Columns are laid out as `[intercept | first order | second order | cached]`, the cached block
/// is present only if the basis was extended with a cached one.
#[derive(Clone, Debug, PartialEq)]
pub struct RegressorBasis {
    matrix: Array2<f64>,
    n_first_order: usize,
    n_second_order: usize,
}

impl RegressorBasis {
    /// Build the basis from NaN-free flattened pixels
    ///
    /// Fails with [`PldError::DegenerateFlux`] if any cadence has zero total flux.
    pub fn build(pixels: &FlatPixels, config: &PldConfig) -> Result<Self, PldError> {
        let ratios = pixels.normalized()?;
        let n_cadences = ratios.nrows();

        let first_order = principal_components(ratios.view(), config.first_order_components);
        let second_order = match config.order {
            PldOrder::First => Array2::zeros((n_cadences, 0)),
            PldOrder::Second => principal_components(
                second_order_products(ratios.view()).view(),
                config.second_order_components,
            ),
        };
        let intercept = Array2::ones((n_cadences, 1));

        let matrix = ndarray::concatenate(
            Axis(1),
            &[intercept.view(), first_order.view(), second_order.view()],
        )
        .map_err(|err| PldError::shape(err.to_string()))?;
        log::debug!(
            "built PLD basis: {n_cadences} cadences, {} pixels, {} first-order and {} second-order columns",
            pixels.n_pixels(),
            first_order.ncols(),
            second_order.ncols(),
        );

        Ok(Self {
            matrix,
            n_first_order: first_order.ncols(),
            n_second_order: second_order.ncols(),
        })
    }

    /// Append cached columns, their leading intercept must already be dropped
    pub fn with_cached(self, cached: &CachedColumns) -> Result<Self, PldError> {
        cached.check_rows(self.n_cadences())?;
        let matrix = ndarray::concatenate(Axis(1), &[self.matrix.view(), cached.columns.view()])
            .map_err(|err| PldError::shape(err.to_string()))?;
        log::debug!(
            "appended {} columns of cached basis {}",
            cached.columns.ncols(),
            cached.key
        );
        Ok(Self { matrix, ..self })
    }

    #[inline]
    pub fn n_cadences(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    pub fn n_columns(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn matrix(&self) -> ArrayView2<'_, f64> {
        self.matrix.view()
    }

    pub fn into_matrix(self) -> Array2<f64> {
        self.matrix
    }

    pub fn intercept(&self) -> ArrayView1<'_, f64> {
        self.matrix.column(0)
    }

    pub fn first_order(&self) -> ArrayView2<'_, f64> {
        self.matrix.slice(s![.., 1..1 + self.n_first_order])
    }

    pub fn second_order(&self) -> ArrayView2<'_, f64> {
        let start = 1 + self.n_first_order;
        self.matrix.slice(s![.., start..start + self.n_second_order])
    }

    /// Columns appended from a cached basis
    pub fn cached(&self) -> ArrayView2<'_, f64> {
        self.matrix
            .slice(s![.., 1 + self.n_first_order + self.n_second_order..])
    }
}

/// Element-wise products of every unordered pair of columns, including squares
///
/// Pairs are ordered as `(0, 0), (0, 1), ..., (0, p-1), (1, 1), ...`, giving `p (p + 1) / 2`
/// columns.
pub fn second_order_products(ratios: ArrayView2<f64>) -> Array2<f64> {
    let pairs: Vec<(usize, usize)> = (0..ratios.ncols())
        .combinations_with_replacement(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    let columns: Vec<Array1<f64>> = pairs
        .iter()
        .map(|&(i, j)| &ratios.column(i) * &ratios.column(j))
        .collect();
    let views: Vec<_> = columns.iter().map(|c| c.view()).collect();
    ndarray::stack(Axis(1), &views)
        .unwrap_or_else(|_| Array2::zeros((ratios.nrows(), 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    fn drifting_stamps(
        rng: &mut StdRng,
        n_cadences: usize,
        rows: usize,
        columns: usize,
    ) -> Array3<f64> {
        Array3::from_shape_fn((n_cadences, rows, columns), |(t, i, j)| {
            let phase = 0.1 * t as f64 + 0.7 * (i * columns + j) as f64;
            100.0 + 10.0 * phase.sin() + rng.random::<f64>()
        })
    }

    fn zero_filled_basis(stamps: &StampSequence, config: &PldConfig) -> RegressorBasis {
        let pixels = FlatPixels::zero_filled(stamps);
        RegressorBasis::build(&pixels, config).unwrap()
    }

    #[test]
    fn pair_products_order() {
        let ratios = array![[1.0, 2.0, 3.0]];
        let products = second_order_products(ratios.view());
        assert_eq!(products, array![[1.0, 2.0, 3.0, 4.0, 6.0, 9.0]]);
    }

    #[test]
    fn block_sizes_for_large_stamps() {
        let mut rng = StdRng::seed_from_u64(0);
        let stamps = StampSequence::new(drifting_stamps(&mut rng, 60, 5, 5)).unwrap();
        let basis = zero_filled_basis(&stamps, &PldConfig::default());
        assert_eq!(basis.n_cadences(), 60);
        assert_eq!(basis.first_order().ncols(), 20);
        assert_eq!(basis.second_order().ncols(), 10);
        assert_eq!(basis.cached().ncols(), 0);
        assert_eq!(basis.n_columns(), 31);
        assert!(basis.intercept().iter().all(|&x| x == 1.0));
    }

    #[test]
    fn block_sizes_for_small_stamps() {
        let mut rng = StdRng::seed_from_u64(1);
        let stamps = StampSequence::new(drifting_stamps(&mut rng, 40, 3, 3)).unwrap();
        let basis = zero_filled_basis(&stamps, &PldConfig::default());
        assert_eq!(basis.first_order().ncols(), 9);
        assert_eq!(basis.second_order().ncols(), 10);
    }

    #[test]
    fn second_order_capped_by_pair_count() {
        let mut rng = StdRng::seed_from_u64(2);
        // Two pixels give three pairwise products only
        let stamps = StampSequence::new(drifting_stamps(&mut rng, 30, 1, 2)).unwrap();
        let basis = zero_filled_basis(&stamps, &PldConfig::default());
        assert_eq!(basis.first_order().ncols(), 2);
        assert_eq!(basis.second_order().ncols(), 3);
    }

    #[test]
    fn first_order_only() {
        let mut rng = StdRng::seed_from_u64(3);
        let stamps = StampSequence::new(drifting_stamps(&mut rng, 30, 5, 5)).unwrap();
        let basis = zero_filled_basis(&stamps, &PldConfig::first_order());
        assert_eq!(basis.n_columns(), 21);
        assert_eq!(basis.second_order().ncols(), 0);
    }

    #[test]
    fn nan_pixels_are_zero_filled() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut stamps = drifting_stamps(&mut rng, 30, 4, 4);
        stamps[[3, 1, 2]] = f64::NAN;
        let seq = StampSequence::new(stamps.view()).unwrap();
        let basis = zero_filled_basis(&seq, &PldConfig::default());
        assert!(basis.matrix().iter().all(|x| x.is_finite()));
        assert!(stamps[[3, 1, 2]].is_nan());
    }

    #[test]
    fn zero_flux_cadence_fails() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut stamps = drifting_stamps(&mut rng, 30, 4, 4);
        stamps.index_axis_mut(Axis(0), 7).fill(0.0);
        let seq = StampSequence::new(stamps).unwrap();
        assert!(matches!(
            RegressorBasis::build(&FlatPixels::zero_filled(&seq), &PldConfig::default()),
            Err(PldError::DegenerateFlux { cadence: 7, .. })
        ));
    }

    #[test]
    fn cached_columns_are_appended() {
        let mut rng = StdRng::seed_from_u64(6);
        let stamps = StampSequence::new(drifting_stamps(&mut rng, 30, 5, 5)).unwrap();
        let basis = zero_filled_basis(&stamps, &PldConfig::first_order());

        let mut store = InMemoryBasisStore::new();
        let mut cached = Array2::from_elem((30, 4), 1.0);
        cached.column_mut(1).assign(&Array1::linspace(0.0, 1.0, 30));
        store.insert(2, cached.clone()).unwrap();

        let cached_columns = CachedColumns::fetch(&store, 2).unwrap();
        let extended = basis.clone().with_cached(&cached_columns).unwrap();
        assert_eq!(extended.n_columns(), basis.n_columns() + 3);
        assert_eq!(extended.cached(), cached.slice(s![.., 1..]));
        assert_eq!(extended.first_order(), basis.first_order());
        assert_relative_eq!(extended.cached()[[29, 0]], 1.0);
    }

    #[test]
    fn cached_basis_with_wrong_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let stamps = StampSequence::new(drifting_stamps(&mut rng, 30, 3, 3)).unwrap();
        let basis = zero_filled_basis(&stamps, &PldConfig::default());
        let mut store = InMemoryBasisStore::new();
        store.insert(1, Array2::ones((31, 2))).unwrap();
        let cached = CachedColumns::fetch(&store, 1).unwrap();
        assert!(matches!(
            basis.with_cached(&cached),
            Err(PldError::InvalidCachedBasis { key: 1, .. })
        ));
    }
}
