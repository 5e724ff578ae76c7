pub use crate::basis::BasisStore;
pub use crate::detrend::DetrenderTrait;
