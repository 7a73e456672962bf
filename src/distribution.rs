//! Electron speed distributions.

pub mod maxwell_juttner;
pub mod power_law;

use self::{maxwell_juttner::MaxwellJuttnerDistribution, power_law::PowerLawDistribution};
use rayon::prelude::*;
use std::fmt;

/// Floating-point precision to use for electron distributions.
#[allow(non_camel_case_types)]
pub type fel = f64;

/// Defines the properties of an electron speed distribution.
pub trait SpeedDistribution {
    /// Returns the probability density per unit dimensionless speed `beta`.
    fn evaluate_beta(&self, beta: fel) -> fel;

    /// Returns the smallest Lorentz factor with non-zero density.
    fn min_lorentz_factor(&self) -> fel;

    /// Returns the Lorentz factor above which the density is negligible.
    fn max_lorentz_factor(&self) -> fel;

    /// Evaluates the density for each of the given speeds in parallel.
    fn evaluate_all(&self, betas: &[fel]) -> Vec<fel>
    where
        Self: Sync,
    {
        betas
            .par_iter()
            .map(|&beta| self.evaluate_beta(beta))
            .collect()
    }
}

/// An electron population that can scatter CMB photons.
#[derive(Clone, Debug, PartialEq)]
pub enum ElectronDistribution {
    Thermal(MaxwellJuttnerDistribution),
    PowerLaw(PowerLawDistribution),
}

impl SpeedDistribution for ElectronDistribution {
    fn evaluate_beta(&self, beta: fel) -> fel {
        match self {
            Self::Thermal(distribution) => distribution.evaluate_beta(beta),
            Self::PowerLaw(distribution) => distribution.evaluate_beta(beta),
        }
    }

    fn min_lorentz_factor(&self) -> fel {
        match self {
            Self::Thermal(distribution) => distribution.min_lorentz_factor(),
            Self::PowerLaw(distribution) => distribution.min_lorentz_factor(),
        }
    }

    fn max_lorentz_factor(&self) -> fel {
        match self {
            Self::Thermal(distribution) => distribution.max_lorentz_factor(),
            Self::PowerLaw(distribution) => distribution.max_lorentz_factor(),
        }
    }
}

impl From<MaxwellJuttnerDistribution> for ElectronDistribution {
    fn from(distribution: MaxwellJuttnerDistribution) -> Self {
        Self::Thermal(distribution)
    }
}

impl From<PowerLawDistribution> for ElectronDistribution {
    fn from(distribution: PowerLawDistribution) -> Self {
        Self::PowerLaw(distribution)
    }
}

impl fmt::Display for ElectronDistribution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Thermal(distribution) => write!(
                f,
                "Maxwell-Juttner (T_e = {} keV)",
                distribution.temperature()
            ),
            Self::PowerLaw(distribution) => write!(
                f,
                "power-law (alpha = {}, gamma in [{}, {}])",
                distribution.alpha(),
                distribution.min_lorentz_factor(),
                distribution.max_lorentz_factor()
            ),
        }
    }
}
