use ndarray::{Array1, ArrayView1};
use std::ops::Deref;

// Underlying array is guaranteed to be sorted, contiguous and NaN-free
#[derive(Clone, Debug, PartialEq)]
pub struct SortedArray(Array1<f64>);

impl SortedArray {
    /// Sort finite and infinite values, NaN are dropped
    pub fn from_skipnan(values: impl IntoIterator<Item = f64>) -> Self {
        let mut v: Vec<_> = values.into_iter().filter(|x| !x.is_nan()).collect();
        v.sort_unstable_by(f64::total_cmp);
        Self(Array1::from_vec(v))
    }

    pub fn median(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let i = (self.len() - 1) / 2;
        if self.len() % 2 == 0 {
            Some(0.5 * (self[i] + self[i + 1]))
        } else {
            Some(self[i])
        }
    }
}

impl From<ArrayView1<'_, f64>> for SortedArray {
    fn from(v: ArrayView1<'_, f64>) -> Self {
        Self::from_skipnan(v.iter().copied())
    }
}

impl Deref for SortedArray {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        self.0
            .as_slice()
            .expect("array is constructed from Vec and is contiguous")
    }
}
