use crate::data::{CadenceMask, StampSequence};
use crate::detrend::{AperturePld, DetrendedLightCurve, PixelLevelDecorrelation};
use crate::error::PldError;

use enum_dispatch::enum_dispatch;
use std::fmt::Debug;

#[enum_dispatch]
pub trait DetrenderTrait: Clone + Debug + Send + Sync {
    /// Fit the noise model outside of `fit_mask` and subtract it from the summed flux
    fn detrend(
        &self,
        stamps: &StampSequence,
        fit_mask: &CadenceMask,
    ) -> Result<DetrendedLightCurve, PldError>;
}

/// Any of the detrending flavours
#[enum_dispatch(DetrenderTrait)]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Detrender {
    Pld(PixelLevelDecorrelation),
    Aperture(AperturePld),
}
