//! NaN-aware reductions over flux arrays

use crate::sorted_array::SortedArray;

use conv::prelude::*;
use ndarray::{ArrayBase, ArrayView1, Data, Dimension};

/// Array length as a float
pub fn lenf(n: usize) -> f64 {
    n.approx_as::<f64>()
        .expect("usize to f64 conversion rounds to nearest and cannot fail")
}

/// Sum of all non-NaN elements, zero for an all-NaN or empty array
pub fn nansum<S, D>(a: &ArrayBase<S, D>) -> f64
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    a.iter().filter(|x| !x.is_nan()).sum()
}

/// Mean of all non-NaN elements
pub fn nanmean(a: ArrayView1<f64>) -> Option<f64> {
    let (sum, count) = a
        .iter()
        .filter(|x| !x.is_nan())
        .fold((0.0, 0_usize), |(sum, count), &x| (sum + x, count + 1));
    (count > 0).then(|| sum / lenf(count))
}

/// Median of all non-NaN elements
pub fn nanmedian(a: ArrayView1<f64>) -> Option<f64> {
    SortedArray::from(a).median()
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{Array1, array};

    #[test]
    fn nansum_skips_nan() {
        let a = array![[1.0, f64::NAN], [2.0, 3.0]];
        assert_eq!(nansum(&a), 6.0);
    }

    #[test]
    fn nansum_all_nan() {
        let a = array![f64::NAN, f64::NAN];
        assert_eq!(nansum(&a), 0.0);
    }

    #[test]
    fn nanmean_basic() {
        let a = array![1.0, f64::NAN, 2.0, 3.0];
        assert_eq!(nanmean(a.view()), Some(2.0));
    }

    #[test]
    fn nanmean_empty() {
        let a: Array1<f64> = Array1::from(vec![]);
        assert!(nanmean(a.view()).is_none());
    }

    #[test]
    fn nanmedian_basic() {
        let a = array![5.0, f64::NAN, 1.0, 4.0];
        assert_eq!(nanmedian(a.view()), Some(4.0));
    }
}
