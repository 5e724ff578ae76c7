use crate::error::PldError;
use crate::types::CowArray3;

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};

/// Sequence of equally shaped pixel stamps, one per cadence
///
/// Stamps are stored as a 3-D array with `(cadence, row, column)` axes. Pixels may hold NaN
/// marking missing or saturated readings, the sequence itself is never modified: every routine
/// that needs NaN-free values works on its own copy.
#[derive(Clone, Debug)]
pub struct StampSequence<'a> {
    stamps: CowArray3<'a, f64>,
}

impl<'a> StampSequence<'a> {
    /// Wrap a `(cadence, row, column)` array
    ///
    /// Input could be [`ndarray::Array3`], [`ndarray::ArrayView3`] or 3-D [`ndarray::CowArray`].
    /// Fails if there are no cadences or stamps have no pixels.
    pub fn new(stamps: impl Into<CowArray3<'a, f64>>) -> Result<Self, PldError> {
        let stamps = stamps.into();
        let (n_cadences, rows, columns) = stamps.dim();
        if n_cadences == 0 {
            return Err(PldError::shape("stamp sequence has no cadences"));
        }
        if rows == 0 || columns == 0 {
            return Err(PldError::shape(format!(
                "stamps must have at least one pixel, got {rows}x{columns}"
            )));
        }
        Ok(Self { stamps })
    }

    /// Stack individual stamps, all of them must have the same shape
    pub fn from_stamps<'s>(
        stamps: impl IntoIterator<Item = ArrayView2<'s, f64>>,
    ) -> Result<StampSequence<'static>, PldError> {
        let views: Vec<_> = stamps.into_iter().collect();
        let first = views
            .first()
            .ok_or_else(|| PldError::shape("stamp sequence has no cadences"))?
            .dim();
        if let Some((cadence, stamp)) = views.iter().enumerate().find(|(_, s)| s.dim() != first) {
            return Err(PldError::shape(format!(
                "stamp of cadence {cadence} is {:?} while the first one is {first:?}",
                stamp.dim()
            )));
        }
        let stacked = ndarray::stack(Axis(0), &views)
            .map_err(|err| PldError::shape(format!("cannot stack stamps: {err}")))?;
        StampSequence::new(stacked)
    }

    #[inline]
    pub fn n_cadences(&self) -> usize {
        self.stamps.len_of(Axis(0))
    }

    /// `(rows, columns)` of a single stamp
    pub fn stamp_shape(&self) -> (usize, usize) {
        let (_, rows, columns) = self.stamps.dim();
        (rows, columns)
    }

    pub fn n_pixels(&self) -> usize {
        let (rows, columns) = self.stamp_shape();
        rows * columns
    }

    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.stamps.view()
    }

    pub fn cadence(&self, i: usize) -> ArrayView2<'_, f64> {
        self.stamps.index_axis(Axis(0), i)
    }

    pub fn into_owned(self) -> StampSequence<'static> {
        StampSequence {
            stamps: self.stamps.into_owned().into(),
        }
    }

    /// Fails unless `other` has the same number of cadences and the same stamp shape
    pub fn check_same_shape(&self, other: &StampSequence) -> Result<(), PldError> {
        if self.stamps.dim() == other.stamps.dim() {
            Ok(())
        } else {
            Err(PldError::shape(format!(
                "stamp sequences differ in shape: {:?} and {:?}",
                self.stamps.dim(),
                other.stamps.dim()
            )))
        }
    }

    /// Pixel-wise difference with a model scene, e.g. a fitted neighbor PSF
    pub fn subtract(&self, model: &StampSequence) -> Result<StampSequence<'static>, PldError> {
        self.check_same_shape(model)?;
        let difference: Array3<f64> = &self.stamps - &model.stamps;
        StampSequence::new(difference)
    }

    /// Row-major flattened copy of the stamps with NaN replaced by zero, shape is
    /// `(cadence, pixel)`
    pub(crate) fn zero_filled_pixels(&self) -> Array2<f64> {
        let (n_cadences, _, columns) = self.stamps.dim();
        Array2::from_shape_fn((n_cadences, self.n_pixels()), |(t, k)| {
            let x = self.stamps[[t, k / columns, k % columns]];
            if x.is_nan() { 0.0 } else { x }
        })
    }

    /// True if every pixel of every cadence is NaN-free
    pub fn is_complete(&self) -> bool {
        Zip::from(&self.stamps).all(|x| !x.is_nan())
    }
}

impl From<StampSequence<'_>> for Array3<f64> {
    fn from(seq: StampSequence<'_>) -> Self {
        seq.stamps.into_owned()
    }
}
