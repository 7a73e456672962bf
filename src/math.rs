//! Math utilities.

pub mod quadrature;
pub mod romberg;

use num::Float;
use special::Gamma;
use special_fun::FloatSpecial;

/// Floating-point precision to use for integration.
#[allow(non_camel_case_types)]
pub type fin = f64;

/// Evaluates the ratio of gamma functions Γ(a)/Γ(b) for positive arguments.
pub fn gamma_ratio<F: Float + Gamma>(a: F, b: F) -> F {
    F::exp(a.ln_gamma().0 - b.ln_gamma().0)
}

/// Argument above which `K_2` is evaluated from its asymptotic expansion,
/// as it approaches the underflow limit beyond this.
const BESSEL_K2_ASYMPTOTIC_LIMIT: fin = 500.0;

/// Evaluates the exponentially scaled modified Bessel function of the
/// second kind of order two, `exp(x)*K_2(x)`, for `x > 0`.
///
/// The scaling keeps the result finite for arguments far beyond where
/// `K_2` itself underflows.
pub fn scaled_bessel_k2(x: fin) -> fin {
    assert!(x > 0.0, "Argument to K_2 must be positive, got {}", x);
    if x < BESSEL_K2_ASYMPTOTIC_LIMIT {
        fin::exp(x) * x.besselk(2)
    } else {
        asymptotic_scaled_bessel_k2(x)
    }
}

/// Hankel expansion `sqrt(pi/(2x))*(1 + (mu - 1)/(8x) + ...)` with `mu = 4*2^2`.
fn asymptotic_scaled_bessel_k2(x: fin) -> fin {
    const MU: fin = 16.0;
    let eight_x = 8.0 * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..=4 {
        let odd = (2 * k - 1) as fin;
        term *= (MU - odd * odd) / (k as fin * eight_x);
        sum += term;
    }
    fin::sqrt(std::f64::consts::PI / (2.0 * x)) * sum
}
