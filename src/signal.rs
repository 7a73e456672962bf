//! Spectral distortions of the cosmic microwave background.

pub mod background;
pub mod pointing;

use crate::{
    error::{SzError, SzResult},
    kernel::KernelConfig,
    math::{quadrature::QuadratureConfig, romberg::RombergConfig},
};
use std::{fmt, str::FromStr};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Floating-point precision to use for signals.
#[allow(non_camel_case_types)]
pub type fsg = f64;

/// Treatment of the Doppler shift in the kinematic SZ effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum KinematicApproximation {
    /// Distortion linear in the peculiar speed.
    FirstOrder,
    /// Distortion integrated over incoming photon directions with the full
    /// Lorentz boost of the CMB dipole.
    Angular,
}

impl FromStr for KinematicApproximation {
    type Err = SzError;

    fn from_str(s: &str) -> SzResult<Self> {
        match s {
            "first_order" => Ok(Self::FirstOrder),
            "angular" => Ok(Self::Angular),
            _ => Err(SzError::InvalidArgument(format!(
                "Unknown kinematic approximation: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for KinematicApproximation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::FirstOrder => "first_order",
                Self::Angular => "angular",
            }
        )
    }
}

/// Configuration parameters for signal computation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SignalConfig {
    /// Configuration of the scattering kernels.
    pub kernel: KernelConfig,
    /// Configuration of the kernel tabulation over frequency shifts.
    pub romberg: RombergConfig,
    /// Quadrature parameters for the angular kinematic SZ integral.
    pub kinematic_quadrature: QuadratureConfig,
    /// Treatment of the kinematic Doppler shift.
    pub kinematic_approximation: KinematicApproximation,
    /// Whether to add the unscattered CMB to the distortion.
    pub include_cmb: bool,
}

impl SignalConfig {
    pub const DEFAULT_KINEMATIC_APPROXIMATION: KinematicApproximation =
        KinematicApproximation::FirstOrder;
    pub const DEFAULT_INCLUDE_CMB: bool = false;

    /// Panics if any of the configuration parameter values are invalid.
    pub fn validate(&self) {
        self.kernel.validate();
        self.romberg.validate();
        self.kinematic_quadrature.validate();
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            kernel: KernelConfig::default(),
            romberg: RombergConfig::default(),
            kinematic_quadrature: QuadratureConfig::default(),
            kinematic_approximation: Self::DEFAULT_KINEMATIC_APPROXIMATION,
            include_cmb: Self::DEFAULT_INCLUDE_CMB,
        }
    }
}

/// Checks that all the given frequencies [Hz] are positive and finite.
pub fn validate_frequencies(frequencies: &[fsg]) -> SzResult<()> {
    if frequencies.is_empty() {
        return Err(SzError::InvalidArgument(
            "At least one frequency is required".to_string(),
        ));
    }
    match frequencies
        .iter()
        .find(|&&frequency| !(frequency.is_finite() && frequency > 0.0))
    {
        Some(frequency) => Err(SzError::Domain(format!(
            "Frequencies must be positive and finite, got {}",
            frequency
        ))),
        None => Ok(()),
    }
}

/// Checks that the given optical depth is non-negative and finite.
pub fn validate_optical_depth(optical_depth: fsg) -> SzResult<()> {
    if optical_depth.is_finite() && optical_depth >= 0.0 {
        Ok(())
    } else {
        Err(SzError::Domain(format!(
            "Optical depth must be non-negative and finite, got {}",
            optical_depth
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematic_approximation_parses_its_display() {
        for approximation in [KinematicApproximation::FirstOrder, KinematicApproximation::Angular] {
            assert_eq!(
                approximation.to_string().parse::<KinematicApproximation>(),
                Ok(approximation)
            );
        }
        assert!("exact".parse::<KinematicApproximation>().is_err());
    }

    #[test]
    fn invalid_frequencies_are_rejected() {
        assert!(validate_frequencies(&[]).unwrap_err().is_invalid_argument());
        assert!(validate_frequencies(&[1e9, 0.0]).unwrap_err().is_domain_error());
        assert!(validate_frequencies(&[1e9, 2e11]).is_ok());
        assert!(validate_optical_depth(-0.1).is_err());
    }
}
