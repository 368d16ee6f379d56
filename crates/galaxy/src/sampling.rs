//! Distribution sampling helpers for population generation.

use std::f64::consts::PI;

use rand::Rng;
use rand_chacha::ChaChaRng;

/// Sample from a Gaussian (normal) distribution using the Box-Muller
/// transform.
///
/// # Arguments
/// * `rng` - Random number generator
/// * `mean` - Mean of the distribution
/// * `std_dev` - Standard deviation
pub fn sample_gaussian(rng: &mut ChaChaRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.random();
    let u2: f64 = rng.random();
    let z = (-2.0 * (1.0 - u1).ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}

/// Sample from a power-law distribution p(x) ∝ x^α between `x_min` and
/// `x_max` using inverse transform sampling.
///
/// # Arguments
/// * `rng` - Random number generator
/// * `x_min` - Minimum value
/// * `x_max` - Maximum value
/// * `alpha` - Power-law exponent (e.g., -2.3 for a Salpeter-like mass
///   function)
pub fn sample_power_law(rng: &mut ChaChaRng, x_min: f64, x_max: f64, alpha: f64) -> f64 {
    let u: f64 = rng.random();
    let alpha1 = alpha + 1.0;
    (u * (x_max.powf(alpha1) - x_min.powf(alpha1)) + x_min.powf(alpha1)).powf(1.0 / alpha1)
}

/// Sample a radius with an exponential surface-density profile Σ ∝ e^(-r/h),
/// truncated at `r_max`.
///
/// Rejection-free: inverts the cumulative distribution of r · e^(-r/h) by
/// bisection, which is plenty fast for one-off population setup.
pub fn sample_exponential_disc_radius(rng: &mut ChaChaRng, scale: f64, r_max: f64) -> f64 {
    let u: f64 = rng.random();
    let cdf = |r: f64| -> f64 {
        // CDF of the disc profile, normalized over [0, r_max].
        let mass = |r: f64| 1.0 - (1.0 + r / scale) * (-r / scale).exp();
        mass(r) / mass(r_max)
    };
    let (mut lo, mut hi) = (0.0, r_max);
    for _ in 0..48 {
        let mid = (lo + hi) / 2.0;
        if cdf(mid) < u {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}
