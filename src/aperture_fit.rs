use crate::basis::{BasisKey, BasisStore, RegressorBasis};
use crate::config::ApertureFitConfig;
use crate::crowding::{self, Crowding};
use crate::data::{ApertureMask, CadenceMask, StampSequence};
use crate::detrend::{
    AperturePld, DetrendedLightCurve, Detrender, DetrenderTrait, PixelLevelDecorrelation,
};
use crate::error::PldError;
use crate::transit::{self, DepthFit};

use macro_const::macro_const;
use ndarray::{Array1, ArrayView1};

macro_const! {
    const DOC: &str = r"
Transit-preserving detrending of a pixel-level light curve

The engine is built from a transit curve: relative flux of the injected transit, exactly unity
out of transit. Cadences with the curve below unity form the transit mask, they are excluded
from every noise-model fit, so the noise model never absorbs the transit. Additional cadences,
e.g. outliers, may be excluded as well.

Noise models:
- pixel-level decorrelation over the whole stamp, see [`PixelLevelDecorrelation`], optionally
  extended with a cached basis,
- first-order pixel-level decorrelation inside of an aperture, see [`AperturePld`].

The transit depth is recovered from a detrended light curve by a linear fit of the median
normalized flux with the transit curve scaled to unit depth by `reference_depth`.

The engine holds no mutable state, its transit curve and masks are fixed at construction.
";
}

#[doc = DOC!()]
#[derive(Clone, Debug, PartialEq)]
pub struct ApertureFit {
    transit_curve: Array1<f64>,
    transit_mask: CadenceMask,
    fit_mask: CadenceMask,
    config: ApertureFitConfig,
}

/// Aperture-restricted light curve together with the aperture it was computed for
#[derive(Clone, Debug, PartialEq)]
pub struct ApertureDetrended {
    pub aperture: ApertureMask,
    pub light_curve: DetrendedLightCurve,
}

impl ApertureFit {
    /// Engine with the default configuration
    pub fn new(transit_curve: impl Into<Array1<f64>>) -> Self {
        let transit_curve = transit_curve.into();
        let transit_mask = CadenceMask::from_transit_curve(transit_curve.view());
        Self {
            fit_mask: transit_mask.clone(),
            transit_mask,
            transit_curve,
            config: ApertureFitConfig::default(),
        }
    }

    /// Fails with [`PldError::InvalidConfig`] unless the reference depth is positive and finite
    pub fn with_config(
        transit_curve: impl Into<Array1<f64>>,
        config: ApertureFitConfig,
    ) -> Result<Self, PldError> {
        Self::with_excluded_cadences(transit_curve, config, std::iter::empty())
    }

    /// Engine excluding `excluded` cadences from noise-model fits in addition to the transit
    pub fn with_excluded_cadences(
        transit_curve: impl Into<Array1<f64>>,
        config: ApertureFitConfig,
        excluded: impl IntoIterator<Item = usize>,
    ) -> Result<Self, PldError> {
        if !(config.reference_depth.is_finite() && config.reference_depth > 0.0) {
            return Err(PldError::InvalidConfig(format!(
                "reference depth must be positive and finite, got {}",
                config.reference_depth
            )));
        }
        let transit_curve = transit_curve.into();
        let transit_mask = CadenceMask::from_transit_curve(transit_curve.view());
        let outliers = CadenceMask::from_indices(transit_curve.len(), excluded)?;
        let fit_mask = transit_mask.union(&outliers)?;
        log::debug!(
            "{} cadences, {} in transit, {} excluded from fits",
            transit_curve.len(),
            transit_mask.n_excluded(),
            fit_mask.n_excluded()
        );
        Ok(Self {
            transit_curve,
            transit_mask,
            fit_mask,
            config,
        })
    }

    pub const fn doc() -> &'static str {
        DOC
    }

    #[inline]
    pub fn n_cadences(&self) -> usize {
        self.transit_curve.len()
    }

    pub fn transit_curve(&self) -> ArrayView1<'_, f64> {
        self.transit_curve.view()
    }

    /// Cadences where the transit curve is below unity
    pub fn transit_mask(&self) -> &CadenceMask {
        &self.transit_mask
    }

    /// Cadences excluded from noise-model fits: the transit mask and the excluded cadences
    pub fn fit_mask(&self) -> &CadenceMask {
        &self.fit_mask
    }

    pub fn config(&self) -> &ApertureFitConfig {
        &self.config
    }

    /// Full-stamp detrender configured for this engine
    pub fn pld(&self) -> PixelLevelDecorrelation {
        PixelLevelDecorrelation::new(self.config.pld.clone())
    }

    fn check_stamps(&self, stamps: &StampSequence) -> Result<(), PldError> {
        self.fit_mask.check_len(stamps.n_cadences())
    }

    /// Per-pixel and per-cadence fraction of the flux coming from the target
    pub fn compute_crowding(
        &self,
        total: &StampSequence,
        target: &StampSequence,
    ) -> Result<Crowding, PldError> {
        self.check_stamps(total)?;
        crowding::compute_crowding(total, target)
    }

    /// Regressor matrix of the full-stamp noise model, intercept first
    ///
    /// The matrix can be put into a [`BasisStore`](crate::BasisStore) and reused as a cached
    /// basis.
    pub fn build_basis(&self, stamps: &StampSequence) -> Result<RegressorBasis, PldError> {
        self.check_stamps(stamps)?;
        self.pld().build_basis(stamps)
    }

    /// [`ApertureFit::build_basis`] extended with the cached basis stored under `key`
    pub fn build_basis_with_cache<S>(
        &self,
        stamps: &StampSequence,
        store: &S,
        key: BasisKey,
    ) -> Result<RegressorBasis, PldError>
    where
        S: BasisStore + ?Sized,
    {
        self.check_stamps(stamps)?;
        self.pld()
            .with_cached_basis(store, key)?
            .build_basis(stamps)
    }

    /// Full-stamp pixel-level decorrelation
    pub fn detrend(&self, stamps: &StampSequence) -> Result<DetrendedLightCurve, PldError> {
        self.pld().detrend(stamps, &self.fit_mask)
    }

    /// Full-stamp pixel-level decorrelation extended with the cached basis stored under `key`
    pub fn detrend_with_cached_basis<S>(
        &self,
        stamps: &StampSequence,
        store: &S,
        key: BasisKey,
    ) -> Result<DetrendedLightCurve, PldError>
    where
        S: BasisStore + ?Sized,
    {
        self.pld()
            .with_cached_basis(store, key)?
            .detrend(stamps, &self.fit_mask)
    }

    /// First-order pixel-level decorrelation inside of `aperture`
    pub fn detrend_aperture(
        &self,
        stamps: &StampSequence,
        aperture: ApertureMask,
    ) -> Result<ApertureDetrended, PldError> {
        let detrender = AperturePld::new(aperture);
        let light_curve = detrender.detrend(stamps, &self.fit_mask)?;
        Ok(ApertureDetrended {
            aperture: detrender.aperture().clone(),
            light_curve,
        })
    }

    /// Detrend with any detrender, fitting outside of the engine's fit mask
    pub fn detrend_with(
        &self,
        detrender: &Detrender,
        stamps: &StampSequence,
    ) -> Result<DetrendedLightCurve, PldError> {
        detrender.detrend(stamps, &self.fit_mask)
    }

    /// Offset and depth of the transit in `flux`
    pub fn fit_transit(&self, flux: ArrayView1<f64>) -> Result<DepthFit, PldError> {
        transit::fit_transit(self.transit_curve.view(), self.config.reference_depth, flux)
    }

    /// Transit depth in `flux` as a fraction of its median
    pub fn recover_depth(&self, flux: ArrayView1<f64>) -> Result<f64, PldError> {
        self.fit_transit(flux).map(|fit| fit.depth)
    }
}
