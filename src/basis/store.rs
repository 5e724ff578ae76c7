use crate::error::PldError;

use ndarray::{Array2, ArrayView2, s};
use std::collections::HashMap;

/// Key of a cached basis, the motion amplitude of the simulation that produced it
pub type BasisKey = u32;

/// Read-only source of precomputed regressor bases
///
/// A cached basis has one row per cadence and its first column is a constant intercept. The
/// intercept duplicates the one of the freshly built basis, so it is dropped before the cached
/// columns are appended; bases without a constant leading column are rejected.
pub trait BasisStore {
    fn get(&self, key: BasisKey) -> Option<ArrayView2<'_, f64>>;
}

/// [`BasisStore`] held in memory
///
/// Entries are write-once: storing the same matrix twice under one key is a no-op, storing a
/// different one is [`PldError::CacheConflict`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryBasisStore {
    entries: HashMap<BasisKey, Array2<f64>>,
}

impl InMemoryBasisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: BasisKey, basis: Array2<f64>) -> Result<(), PldError> {
        check_leading_intercept(key, basis.view())?;
        match self.entries.get(&key) {
            Some(existing) if *existing == basis => Ok(()),
            Some(_) => Err(PldError::CacheConflict { key }),
            None => {
                log::debug!("caching basis {key} of shape {:?}", basis.dim());
                self.entries.insert(key, basis);
                Ok(())
            }
        }
    }

    pub fn contains(&self, key: BasisKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BasisStore for InMemoryBasisStore {
    fn get(&self, key: BasisKey) -> Option<ArrayView2<'_, f64>> {
        self.entries.get(&key).map(|basis| basis.view())
    }
}

impl<S> BasisStore for &S
where
    S: BasisStore + ?Sized,
{
    fn get(&self, key: BasisKey) -> Option<ArrayView2<'_, f64>> {
        (**self).get(key)
    }
}

/// Cached columns with the leading intercept removed
#[derive(Clone, Debug, PartialEq)]
pub struct CachedColumns {
    pub key: BasisKey,
    pub columns: Array2<f64>,
}

impl CachedColumns {
    /// Look up `key` and drop the intercept column
    pub fn fetch<S>(store: &S, key: BasisKey) -> Result<Self, PldError>
    where
        S: BasisStore + ?Sized,
    {
        let basis = store.get(key).ok_or(PldError::MissingCacheEntry(key))?;
        check_leading_intercept(key, basis)?;
        Ok(Self {
            key,
            columns: basis.slice(s![.., 1..]).to_owned(),
        })
    }

    pub fn check_rows(&self, n_cadences: usize) -> Result<(), PldError> {
        if self.columns.nrows() == n_cadences {
            Ok(())
        } else {
            Err(PldError::InvalidCachedBasis {
                key: self.key,
                reason: format!(
                    "it has {} rows while there are {n_cadences} cadences",
                    self.columns.nrows()
                ),
            })
        }
    }
}

fn check_leading_intercept(key: BasisKey, basis: ArrayView2<f64>) -> Result<(), PldError> {
    let invalid = |reason: &str| PldError::InvalidCachedBasis {
        key,
        reason: reason.to_owned(),
    };
    if basis.ncols() == 0 || basis.nrows() == 0 {
        return Err(invalid("it is empty"));
    }
    let first = basis.column(0);
    let c = first[0];
    if !c.is_finite() || c == 0.0 || first.iter().any(|&x| x != c) {
        return Err(invalid("its leading column is not a constant intercept"));
    }
    Ok(())
}
