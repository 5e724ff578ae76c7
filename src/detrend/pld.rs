use crate::basis::{BasisKey, BasisStore, CachedColumns, RegressorBasis};
use crate::config::PldConfig;
use crate::data::{CadenceMask, FlatPixels, StampSequence};
use crate::detrend::{DetrendedLightCurve, DetrenderTrait, EmptyColumns, fit_and_predict};
use crate::error::{FitStage, PldError};

use macro_const::macro_const;

macro_const! {
    const DOC: &str = r"
Pixel-level decorrelation over the whole stamp

The noise model is a linear combination of an intercept, principal components of pixel fluxes
normalized by the total flux of their cadence, principal components of pairwise products of the
normalized fluxes, and optionally columns of a cached basis:
$$
f_t = c_0 + \sum_k a_k X^{(1)}_{tk} + \sum_k b_k X^{(2)}_{tk} + \sum_k d_k X^{(c)}_{tk}.
$$
NaN pixels are treated as zeros. The coefficients are fitted by linear least squares outside of
the fit mask, the model is evaluated for all cadences and subtracted from the summed flux, the
mean summed flux is added back.
";
}

#[doc = DOC!()]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PixelLevelDecorrelation {
    config: PldConfig,
    cached: Option<CachedColumns>,
}

impl PixelLevelDecorrelation {
    pub fn new(config: PldConfig) -> Self {
        Self {
            config,
            cached: None,
        }
    }

    /// Extend every basis with the cached basis stored under `key`
    pub fn with_cached_basis<S>(self, store: &S, key: BasisKey) -> Result<Self, PldError>
    where
        S: BasisStore + ?Sized,
    {
        Ok(Self {
            cached: Some(CachedColumns::fetch(store, key)?),
            ..self
        })
    }

    pub const fn doc() -> &'static str {
        DOC
    }

    pub fn config(&self) -> &PldConfig {
        &self.config
    }

    /// Full regressor matrix, including cached columns if any
    pub fn build_basis(&self, stamps: &StampSequence) -> Result<RegressorBasis, PldError> {
        self.basis_from_pixels(&FlatPixels::zero_filled(stamps))
    }

    fn basis_from_pixels(&self, pixels: &FlatPixels) -> Result<RegressorBasis, PldError> {
        let basis = RegressorBasis::build(pixels, &self.config)?;
        match &self.cached {
            Some(cached) => basis.with_cached(cached),
            None => Ok(basis),
        }
    }
}

impl DetrenderTrait for PixelLevelDecorrelation {
    fn detrend(
        &self,
        stamps: &StampSequence,
        fit_mask: &CadenceMask,
    ) -> Result<DetrendedLightCurve, PldError> {
        fit_mask.check_len(stamps.n_cadences())?;
        let pixels = FlatPixels::zero_filled(stamps);
        let basis = self.basis_from_pixels(&pixels)?;
        fit_and_predict(
            basis.matrix(),
            pixels.flux(),
            fit_mask,
            FitStage::NoiseModel,
            EmptyColumns::Skip,
        )
    }
}
