//! Relativistic thermal (Maxwell-Juttner) electron distribution.

use super::{fel, SpeedDistribution};
use crate::{
    constants::BETA_MAX,
    error::{SzError, SzResult},
    math,
    units::{self, beta_to_gamma, beta_to_gamma_minus_one},
};

/// A relativistic thermal distribution of electron speeds.
///
/// The probability density for a dimensionless speed `beta` is
/// `f(beta) = gamma^5*beta^2*exp(-gamma/theta)/(theta*K_2(1/theta))`,
/// where `theta = kT_e/(m_e*c^2)`.
#[derive(Clone, Debug, PartialEq)]
pub struct MaxwellJuttnerDistribution {
    /// Electron temperature [keV].
    temperature: fel,
    /// Dimensionless electron temperature.
    theta: fel,
    /// Inverse of `theta*exp(1/theta)*K_2(1/theta)`.
    scaled_normalization: fel,
}

impl MaxwellJuttnerDistribution {
    /// Number of thermal energies above the rest energy beyond which
    /// the density is treated as negligible.
    pub const THERMAL_ENERGY_CUTOFF: fel = 60.0;

    /// Creates a new thermal distribution for the given electron temperature [keV].
    pub fn new(temperature: fel) -> SzResult<Self> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(SzError::NonPositiveTemperature(temperature));
        }
        let theta = units::kev_to_theta(temperature);
        let scaled_normalization = 1.0 / (theta * math::scaled_bessel_k2(1.0 / theta));
        Ok(Self {
            temperature,
            theta,
            scaled_normalization,
        })
    }

    /// Returns the electron temperature [keV].
    pub fn temperature(&self) -> fel {
        self.temperature
    }

    /// Returns the dimensionless electron temperature `kT_e/(m_e*c^2)`.
    pub fn theta(&self) -> fel {
        self.theta
    }
}

impl SpeedDistribution for MaxwellJuttnerDistribution {
    fn evaluate_beta(&self, beta: fel) -> fel {
        if !(0.0..1.0).contains(&beta) {
            return 0.0;
        }
        let gamma = beta_to_gamma(beta);
        let gamma_sqr = gamma * gamma;
        // exp(-gamma/theta) is split into exp(-(gamma - 1)/theta)*exp(-1/theta)
        // with the second factor absorbed into the scaled normalization
        gamma_sqr
            * gamma_sqr
            * gamma
            * beta
            * beta
            * fel::exp(-beta_to_gamma_minus_one(beta) / self.theta)
            * self.scaled_normalization
    }

    fn min_lorentz_factor(&self) -> fel {
        1.0
    }

    fn max_lorentz_factor(&self) -> fel {
        fel::min(
            1.0 + Self::THERMAL_ENERGY_CUTOFF * self.theta,
            beta_to_gamma(BETA_MAX),
        )
    }
}

/// Evaluates the Maxwell-Juttner probability density for the given
/// speed `beta` and electron temperature [keV].
///
/// Speeds outside `[0, 1)` have zero density.
pub fn maxwell_juttner(beta: fel, temperature: fel) -> SzResult<fel> {
    Ok(MaxwellJuttnerDistribution::new(temperature)?.evaluate_beta(beta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::quadrature;
    use approx::assert_relative_eq;

    #[test]
    fn thermal_distribution_is_normalized() {
        for &temperature in &[1.0, 5.0, 50.0, 511.0] {
            let distribution = MaxwellJuttnerDistribution::new(temperature).unwrap();
            let total =
                quadrature::integrate(|beta| distribution.evaluate_beta(beta), 0.0, 1.0, 40001)
                    .unwrap();
            assert_relative_eq!(total, 1.0, max_relative = 1e-4);
        }
    }

    #[test]
    fn cold_distribution_is_concentrated_at_low_speeds() {
        let distribution = MaxwellJuttnerDistribution::new(0.01).unwrap();
        assert_eq!(distribution.evaluate_beta(0.5), 0.0);
        let total = quadrature::integrate(|beta| distribution.evaluate_beta(beta), 0.0, 0.05, 4001)
            .unwrap();
        assert_relative_eq!(total, 1.0, max_relative = 1e-4);
    }

    #[test]
    fn density_vanishes_outside_physical_speeds() {
        assert_eq!(maxwell_juttner(-0.1, 5.0).unwrap(), 0.0);
        assert_eq!(maxwell_juttner(1.0, 5.0).unwrap(), 0.0);
        assert_eq!(maxwell_juttner(0.0, 5.0).unwrap(), 0.0);
        assert!(maxwell_juttner(0.2, 5.0).unwrap() > 0.0);
    }

    #[test]
    fn non_positive_temperature_is_rejected() {
        assert_eq!(
            maxwell_juttner(0.1, 0.0),
            Err(SzError::NonPositiveTemperature(0.0))
        );
        assert!(maxwell_juttner(0.1, -3.0).unwrap_err().is_domain_error());
        assert!(MaxwellJuttnerDistribution::new(fel::NAN).is_err());
    }

    #[test]
    fn extreme_temperatures_give_finite_densities() {
        for &temperature in &[1e-3, 1e5] {
            let distribution = MaxwellJuttnerDistribution::new(temperature).unwrap();
            let densities = distribution.evaluate_all(&[1e-4, 0.1, 0.5, 0.9, 0.999]);
            assert!(densities.iter().all(|density| density.is_finite() && *density >= 0.0));
        }
    }
}
