//! Non-thermal power-law electron distribution.

use super::{fel, SpeedDistribution};
use crate::{
    error::{SzError, SzResult},
    units::beta_to_gamma,
};

/// A non-thermal power-law distribution over the electron Lorentz factor,
/// parameterized by an exponent `alpha` and lower and upper cut-offs.
///
/// The probability density for a Lorentz factor `gamma` is
/// `P(gamma) = A*gamma^(-alpha)` for `gamma_min <= gamma <= gamma_max`,
/// where `A` normalizes the density to unity.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerLawDistribution {
    /// Lower cut-off Lorentz factor.
    gamma_min: fel,
    /// Upper cut-off Lorentz factor.
    gamma_max: fel,
    /// Exponent of the inverse power-law.
    alpha: fel,
    /// Normalization constant `A`.
    normalization: fel,
}

impl PowerLawDistribution {
    /// Exponents closer to unity than this use the logarithmic normalization.
    pub const UNIT_EXPONENT_TOLERANCE: fel = 1e-10;

    /// Creates a new power-law distribution with the given cut-offs and exponent.
    pub fn new(gamma_min: fel, gamma_max: fel, alpha: fel) -> SzResult<Self> {
        let normalization = compute_power_law_normalization(gamma_min, gamma_max, alpha)?;
        Ok(Self {
            gamma_min,
            gamma_max,
            alpha,
            normalization,
        })
    }

    /// Returns the exponent of the inverse power-law.
    pub fn alpha(&self) -> fel {
        self.alpha
    }

    /// Returns the normalization constant `A`.
    pub fn normalization(&self) -> fel {
        self.normalization
    }

    /// Returns the probability density per unit Lorentz factor.
    pub fn evaluate_gamma(&self, gamma: fel) -> fel {
        power_law(
            gamma,
            self.gamma_min,
            self.gamma_max,
            self.alpha,
            self.normalization,
        )
    }
}

impl SpeedDistribution for PowerLawDistribution {
    fn evaluate_beta(&self, beta: fel) -> fel {
        if !(0.0..1.0).contains(&beta) {
            return 0.0;
        }
        let gamma = beta_to_gamma(beta);
        // dgamma/dbeta = gamma^3*beta
        self.evaluate_gamma(gamma) * gamma * gamma * gamma * beta
    }

    fn min_lorentz_factor(&self) -> fel {
        self.gamma_min
    }

    fn max_lorentz_factor(&self) -> fel {
        self.gamma_max
    }
}

/// Computes the constant `A` normalizing `A*gamma^(-alpha)` to unity
/// over `[gamma_min, gamma_max]`.
pub fn compute_power_law_normalization(
    gamma_min: fel,
    gamma_max: fel,
    alpha: fel,
) -> SzResult<fel> {
    if !(gamma_min.is_finite() && gamma_max.is_finite() && gamma_min >= 1.0 && gamma_min < gamma_max)
    {
        return Err(SzError::InvalidLorentzFactorRange {
            lower: gamma_min,
            upper: gamma_max,
        });
    }
    if !alpha.is_finite() {
        return Err(SzError::Domain(format!(
            "Power-law exponent must be finite, got {}",
            alpha
        )));
    }
    let normalization = if fel::abs(1.0 - alpha) < PowerLawDistribution::UNIT_EXPONENT_TOLERANCE {
        1.0 / fel::ln(gamma_max / gamma_min)
    } else {
        let exponent = 1.0 - alpha;
        exponent / (fel::powf(gamma_max, exponent) - fel::powf(gamma_min, exponent))
    };
    if normalization.is_finite() && normalization > 0.0 {
        Ok(normalization)
    } else {
        Err(SzError::Domain(format!(
            "Power-law normalization is not representable for alpha = {} over [{}, {}]",
            alpha, gamma_min, gamma_max
        )))
    }
}

/// Evaluates the power-law density `A*gamma^(-alpha)` inside
/// `[gamma_min, gamma_max]`, and zero outside.
pub fn power_law(gamma: fel, gamma_min: fel, gamma_max: fel, alpha: fel, normalization: fel) -> fel {
    if gamma < gamma_min || gamma > gamma_max {
        0.0
    } else {
        normalization * fel::powf(gamma, -alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        math::quadrature,
        units::{gamma_to_rapidity, rapidity_to_beta},
    };
    use approx::assert_relative_eq;

    #[test]
    fn power_law_is_normalized() {
        for &alpha in &[0.5, 1.0, 2.5, 3.0] {
            let distribution = PowerLawDistribution::new(1.0, 1e3, alpha).unwrap();
            // Integrate in u = ln(gamma), where dgamma = gamma*du
            let total = quadrature::integrate(
                |u| {
                    let gamma = fel::exp(u);
                    distribution.evaluate_gamma(gamma) * gamma
                },
                1e-9,
                fel::ln(1e3) - 1e-9,
                20001,
            )
            .unwrap();
            assert_relative_eq!(total, 1.0, max_relative = 1e-6);
        }
    }

    #[test]
    fn speed_density_includes_jacobian() {
        let distribution = PowerLawDistribution::new(2.0, 50.0, 2.5).unwrap();
        // dbeta/deta = 1/cosh(eta)^2 for rapidity eta
        let total = quadrature::integrate(
            |rapidity| {
                let cosh = fel::cosh(rapidity);
                distribution.evaluate_beta(rapidity_to_beta(rapidity)) / (cosh * cosh)
            },
            gamma_to_rapidity(2.0) + 1e-9,
            gamma_to_rapidity(50.0) - 1e-9,
            20001,
        )
        .unwrap();
        assert_relative_eq!(total, 1.0, max_relative = 1e-5);
    }

    #[test]
    fn unit_exponent_uses_logarithmic_normalization() {
        let normalization = compute_power_law_normalization(1.0, fel::exp(2.0), 1.0).unwrap();
        assert_relative_eq!(normalization, 0.5, max_relative = 1e-12);
        let nearly_unit = compute_power_law_normalization(1.0, fel::exp(2.0), 1.0 + 1e-12).unwrap();
        assert_relative_eq!(nearly_unit, 0.5, max_relative = 1e-9);
    }

    #[test]
    fn density_vanishes_outside_cutoffs() {
        let distribution = PowerLawDistribution::new(2.0, 10.0, 2.0).unwrap();
        assert_eq!(distribution.evaluate_gamma(1.5), 0.0);
        assert_eq!(distribution.evaluate_gamma(11.0), 0.0);
        assert!(distribution.evaluate_gamma(5.0) > 0.0);
        assert_eq!(distribution.evaluate_beta(0.1), 0.0);
    }

    #[test]
    fn invalid_cutoffs_are_rejected() {
        assert!(matches!(
            compute_power_law_normalization(10.0, 2.0, 2.0),
            Err(SzError::InvalidLorentzFactorRange { .. })
        ));
        assert!(compute_power_law_normalization(0.5, 2.0, 2.0).is_err());
        assert!(compute_power_law_normalization(1.0, fel::INFINITY, 2.0).is_err());
        assert!(compute_power_law_normalization(1.0, 2.0, fel::NAN)
            .unwrap_err()
            .is_domain_error());
    }
}
