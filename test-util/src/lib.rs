use itertools::iproduct;
use lazy_static::lazy_static;
use light_curve_pld::ndarray::{Array1, Array2, Array3, Axis};
use rand::prelude::*;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Parameters of a synthetic pixel scene
///
/// The target is a Gaussian PSF whose pixel ratios drift sinusoidally along both axes and jitter
/// randomly. Its total flux follows the horizontal drift, so it is a linear function of the pixel
/// ratios, and is multiplied by a trapezoid transit.
#[derive(Clone, Debug)]
pub struct SceneParams {
    pub n_cadences: usize,
    pub stamp_shape: (usize, usize),
    pub psf_sigma: f64,
    /// Out-of-transit target flux at zero drift
    pub flux: f64,
    /// Relative flux change per unit horizontal drift
    pub flux_amplitude: f64,
    /// Relative change of the pixel ratios at the stamp edge per unit drift
    pub drift_amplitude: f64,
    /// Relative standard deviation of the pixel ratio noise
    pub jitter: f64,
    /// Transit depth, ingress and egress cadences are at half depth
    pub depth: f64,
    /// First and last in-transit cadences
    pub transit: (usize, usize),
    /// Flux of a constant neighbor star in the stamp corner
    pub neighbor_flux: f64,
    pub seed: u64,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            n_cadences: 100,
            stamp_shape: (5, 5),
            psf_sigma: 1.2,
            flux: 1000.0,
            flux_amplitude: 0.05,
            drift_amplitude: 0.01,
            jitter: 2e-4,
            depth: 0.01,
            transit: (40, 60),
            neighbor_flux: 0.0,
            seed: 0,
        }
    }
}

pub struct SyntheticScene {
    /// Target and neighbor, `(cadence, row, column)`
    pub stamps: Array3<f64>,
    /// Target alone
    pub target: Array3<f64>,
    /// Relative flux of the transit, exactly unity out of transit
    pub transit_curve: Array1<f64>,
}

impl SyntheticScene {
    pub fn new(params: &SceneParams) -> Self {
        let (rows, columns) = params.stamp_shape;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let base = gaussian_stamp(
            params.stamp_shape,
            center(rows),
            center(columns),
            params.psf_sigma,
        );
        let gx = Array2::from_shape_fn(params.stamp_shape, |(_, j)| gradient(j, columns));
        let gy = Array2::from_shape_fn(params.stamp_shape, |(i, _)| gradient(i, rows));
        let drift_norm = params.drift_amplitude * (&base * &gx * &gx).sum();

        let transit_curve = trapezoid_transit(params);
        let mut target = Array3::zeros((params.n_cadences, rows, columns));
        for (t, mut stamp) in target.axis_iter_mut(Axis(0)).enumerate() {
            let phase = 2.0 * PI * t as f64 / params.n_cadences as f64;
            let (dx, dy) = (phase.cos(), (2.0 * phase).sin());
            let mut ratios = Array2::from_shape_fn(params.stamp_shape, |(i, j)| {
                let eps: f64 = rng.sample(StandardNormal);
                base[[i, j]]
                    * (1.0 + params.drift_amplitude * (gx[[i, j]] * dx + gy[[i, j]] * dy))
                    * (1.0 + params.jitter * eps)
            });
            ratios /= ratios.sum();

            let drift_x = if drift_norm > 0.0 {
                ((&ratios - &base) * &gx).sum() / drift_norm
            } else {
                0.0
            };
            let flux = params.flux * (1.0 + params.flux_amplitude * drift_x) * transit_curve[t];
            stamp.assign(&(ratios * flux));
        }

        let neighbor = gaussian_stamp(params.stamp_shape, 0.0, 0.0, params.psf_sigma)
            * params.neighbor_flux;
        let stamps = &target + &neighbor.insert_axis(Axis(0));

        Self {
            stamps,
            target,
            transit_curve,
        }
    }
}

fn center(n: usize) -> f64 {
    (n as f64 - 1.0) / 2.0
}

/// Linear ramp from -1 to 1 across the axis
fn gradient(i: usize, n: usize) -> f64 {
    let c = center(n);
    if c > 0.0 { (i as f64 - c) / c } else { 0.0 }
}

/// Unit-sum Gaussian profile centered at `(ci, cj)`
fn gaussian_stamp(shape: (usize, usize), ci: f64, cj: f64, sigma: f64) -> Array2<f64> {
    let mut stamp = Array2::zeros(shape);
    for (i, j) in iproduct!(0..shape.0, 0..shape.1) {
        let d2 = (i as f64 - ci).powi(2) + (j as f64 - cj).powi(2);
        stamp[[i, j]] = (-0.5 * d2 / sigma.powi(2)).exp();
    }
    let total = stamp.sum();
    stamp / total
}

fn trapezoid_transit(params: &SceneParams) -> Array1<f64> {
    let (start, end) = params.transit;
    Array1::from_shape_fn(params.n_cadences, |t| {
        if params.depth == 0.0 || t < start || t > end {
            1.0
        } else if t == start || t == end {
            1.0 - 0.5 * params.depth
        } else {
            1.0 - params.depth
        }
    })
}

lazy_static! {
    /// Scene of 100 cadences of 5x5 stamps with a 1% transit at cadences 40-60
    pub static ref REFERENCE_SCENE: SyntheticScene = SyntheticScene::new(&SceneParams::default());
}
