#![doc = include_str!("../README.md")]

#[cfg(test)]
#[macro_use]
mod tests;

mod aperture_fit;
pub use aperture_fit::{ApertureDetrended, ApertureFit};

mod array_stats;

pub mod basis;
pub use basis::{BasisKey, BasisStore, CachedColumns, InMemoryBasisStore, RegressorBasis};

mod config;
pub use config::{ApertureFitConfig, PldConfig, PldOrder};

mod crowding;
pub use crowding::{Crowding, compute_crowding};

mod data;
pub use data::{ApertureMask, CadenceMask, FlatPixels, StampSequence};

pub mod detrend;
pub use detrend::{
    AperturePld, DetrendedLightCurve, Detrender, DetrenderTrait, PixelLevelDecorrelation,
};

mod error;
pub use error::{FitStage, PldError};

#[doc(hidden)]
pub mod lstsq;

#[doc(hidden)]
pub mod pca;
pub use pca::principal_components;

pub mod prelude;

mod sorted_array;

mod transit;
pub use transit::{DepthFit, fit_transit, recover_depth, unit_depth_shape};

mod types;

pub use ndarray;
