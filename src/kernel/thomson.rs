//! Redistribution of photon frequencies by Thomson scattering off
//! electrons with a single speed.

use super::{fkr, KernelValue};
use crate::{
    error::{SzError, SzResult},
    kinematics::{self, ScatteringLimits},
    math::quadrature::{self, QuadratureConfig},
    units::beta_to_gamma,
};
use rayon::prelude::*;

/// Evaluates the integrand over the incoming direction cosine `mu` of the
/// probability that an electron with speed `beta` shifts a photon by the
/// logarithmic amount `s`.
///
/// The integrand is
/// `3/(16*gamma^4*beta)*(1 + beta*mu')*(1 + mu^2*mu'^2 + (1 - mu^2)*(1 - mu'^2)/2)/(1 - beta*mu)^3`,
/// where `mu' = (exp(s)*(1 - beta*mu) - 1)/beta` is the outgoing direction
/// cosine. Negative values arising from rounding are clamped to zero.
pub fn thomson_scatter(mu: fkr, s: fkr, beta: fkr) -> fkr {
    let gamma = beta_to_gamma(beta);
    let gamma_sqr = gamma * gamma;
    let prefactor = 3.0 / (16.0 * gamma_sqr * gamma_sqr * beta);

    let exp_s = fkr::exp(s);
    let mu_prime = (fkr::exp_m1(s) / beta - exp_s * mu).clamp(-1.0, 1.0);

    let mu_sqr = mu * mu;
    let mu_prime_sqr = mu_prime * mu_prime;
    let denominator = 1.0 - beta * mu;

    let value = prefactor
        * (1.0 + beta * mu_prime)
        * (1.0 + mu_sqr * mu_prime_sqr + 0.5 * (1.0 - mu_sqr) * (1.0 - mu_prime_sqr))
        / (denominator * denominator * denominator);

    fkr::max(value, 0.0)
}

/// Computes the probability density `P(s; beta)` that a photon scattering off
/// an electron with speed `beta` has its frequency shifted by the logarithmic
/// amount `s`.
///
/// Shifts that are not accessible for the given speed have zero probability.
pub fn single_scattering(s: fkr, beta: fkr, config: &QuadratureConfig) -> SzResult<KernelValue> {
    match kinematics::scattering_limits(s, beta) {
        Ok(limits) => Ok(integrate_over_directions(s, beta, &limits, config)),
        Err(SzError::InaccessibleShift { .. }) => Ok(KernelValue::ZERO),
        Err(err) => Err(err),
    }
}

/// Computes [`single_scattering`] for each of the given shifts in parallel.
pub fn single_scattering_all(
    shifts: &[fkr],
    beta: fkr,
    config: &QuadratureConfig,
) -> SzResult<Vec<KernelValue>> {
    shifts
        .par_iter()
        .map(|&s| single_scattering(s, beta, config))
        .collect()
}

/// Computes `P(s; beta)` for a speed in `(0, 1)`, returning zero for
/// inaccessible shifts.
pub(super) fn single_scattering_unchecked(
    s: fkr,
    beta: fkr,
    config: &QuadratureConfig,
) -> KernelValue {
    if beta <= 0.0 || fkr::abs(s) > kinematics::max_shift(beta) {
        return KernelValue::ZERO;
    }
    match kinematics::scattering_limits(s, beta) {
        Ok(limits) => integrate_over_directions(s, beta, &limits, config),
        Err(_) => KernelValue::ZERO,
    }
}

fn integrate_over_directions(
    s: fkr,
    beta: fkr,
    limits: &ScatteringLimits,
    config: &QuadratureConfig,
) -> KernelValue {
    // The delta function at s = 0 for electrons at rest is not representable
    if beta == 0.0 || limits.width() <= 0.0 {
        return KernelValue::ZERO;
    }
    let estimate = quadrature::estimate_eval_count(
        |mu| thomson_scatter(mu, s, beta),
        limits.mu1,
        limits.mu2,
        config,
    );
    KernelValue {
        value: fkr::max(estimate.value, 0.0),
        converged: estimate.converged,
    }
}
