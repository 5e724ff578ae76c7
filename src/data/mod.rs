mod aperture;
pub use aperture::ApertureMask;

mod cadence_mask;
pub use cadence_mask::CadenceMask;

mod flat_pixels;
pub use flat_pixels::FlatPixels;

mod stamps;
pub use stamps::StampSequence;
