use crate::basis::BasisKey;

use std::fmt;

/// Linear fit that failed, reported with [`PldError::SingularSystem`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FitStage {
    /// Full-stamp noise model
    NoiseModel,
    /// First-order noise model restricted to an aperture
    ApertureNoiseModel,
    /// Offset + depth regression against the transit shape
    TransitDepth,
}

impl fmt::Display for FitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoiseModel => "noise-model",
            Self::ApertureNoiseModel => "aperture noise-model",
            Self::TransitDepth => "transit-depth",
        };
        f.write_str(name)
    }
}

/// Error returned from detrending, crowding and depth-recovery routines
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PldError {
    #[error("invalid input shape: {0}")]
    InvalidInputShape(String),

    #[error("total flux {flux} of cadence {cadence} cannot be used as a normalization")]
    DegenerateFlux { cadence: usize, flux: f64 },

    #[error("median flux {0} cannot normalize the light curve")]
    DegenerateMedian(f64),

    #[error("{stage} normal equations are singular ({rows} fit rows, {columns} columns)")]
    SingularSystem {
        stage: FitStage,
        rows: usize,
        columns: usize,
    },

    #[error("cached basis {0} is not found")]
    MissingCacheEntry(BasisKey),

    #[error("cached basis {key} is malformed: {reason}")]
    InvalidCachedBasis { key: BasisKey, reason: String },

    #[error("cached basis {key} already holds a different matrix")]
    CacheConflict { key: BasisKey },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PldError {
    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::InvalidInputShape(message.into())
    }
}
