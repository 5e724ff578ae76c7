use crate::data::{ApertureMask, CadenceMask, FlatPixels, StampSequence};
use crate::detrend::{DetrendedLightCurve, DetrenderTrait, EmptyColumns, fit_and_predict};
use crate::error::{FitStage, PldError};

/// First-order pixel-level decorrelation restricted to an aperture
///
/// Regressors are the aperture pixels divided by the aperture flux of their cadence, without an
/// intercept, dimensionality reduction or higher-order terms. NaN pixels inside the aperture are
/// dropped, which must leave the same number of pixels for every cadence.
#[derive(Clone, Debug, PartialEq)]
pub struct AperturePld {
    aperture: ApertureMask,
}

impl AperturePld {
    pub fn new(aperture: ApertureMask) -> Self {
        Self { aperture }
    }

    pub fn aperture(&self) -> &ApertureMask {
        &self.aperture
    }
}

impl DetrenderTrait for AperturePld {
    fn detrend(
        &self,
        stamps: &StampSequence,
        fit_mask: &CadenceMask,
    ) -> Result<DetrendedLightCurve, PldError> {
        fit_mask.check_len(stamps.n_cadences())?;
        let pixels = FlatPixels::from_aperture(stamps, &self.aperture)?;
        let regressors = pixels.normalized()?;
        fit_and_predict(
            regressors.view(),
            pixels.flux(),
            fit_mask,
            FitStage::ApertureNoiseModel,
            EmptyColumns::Reject,
        )
    }
}
