//! Unit conversions and relativistic kinematic factors.

use crate::constants::{
    ARCSEC_TO_RAD, CLIGHT, HPLANCK, KBOLTZMANN, KEV_TO_J, KM_TO_M, MC2_ELECTRON, MPC_TO_M,
    PC_TO_M, SI_TO_JY, T_CMB,
};

/// Floating-point precision to use for units.
#[allow(non_camel_case_types)]
pub type fun = f64;

/// Converts an energy [keV] to the equivalent temperature [K].
pub fn kev_to_kelvin(energy: fun) -> fun {
    energy * KEV_TO_J / KBOLTZMANN
}

/// Converts a temperature [K] to the dimensionless temperature `kT/(m_e c^2)`.
pub fn kelvin_to_theta(temperature: fun) -> fun {
    KBOLTZMANN * temperature / MC2_ELECTRON
}

/// Converts a thermal energy [keV] to the dimensionless temperature `kT/(m_e c^2)`.
pub fn kev_to_theta(energy: fun) -> fun {
    energy * KEV_TO_J / MC2_ELECTRON
}

/// Converts a length in parsecs to meters.
pub fn parsec_to_meter(length: fun) -> fun {
    length * PC_TO_M
}

/// Converts a length in megaparsecs to meters.
pub fn megaparsec_to_meter(length: fun) -> fun {
    length * MPC_TO_M
}

/// Converts an angle in arcseconds to radians.
pub fn arcsec_to_radian(angle: fun) -> fun {
    angle * ARCSEC_TO_RAD
}

/// Converts a velocity [km/s] to a speed in units of the speed of light.
pub fn velocity_to_beta(velocity: fun) -> fun {
    velocity * KM_TO_M / CLIGHT
}

/// Computes the Lorentz factor for the given speed in units of c.
pub fn beta_to_gamma(beta: fun) -> fun {
    1.0 / fun::sqrt((1.0 - beta) * (1.0 + beta))
}

/// Computes the speed in units of c for the given Lorentz factor.
pub fn gamma_to_beta(gamma: fun) -> fun {
    fun::sqrt((gamma - 1.0) * (gamma + 1.0)) / gamma
}

/// Computes `gamma - 1` without cancellation for small speeds.
pub fn beta_to_gamma_minus_one(beta: fun) -> fun {
    let gamma = beta_to_gamma(beta);
    beta * beta * gamma * gamma / (gamma + 1.0)
}

/// Computes the speed in units of c from `gamma - 1`, without cancellation
/// for small speeds.
pub fn gamma_minus_one_to_beta(gamma_minus_one: fun) -> fun {
    fun::sqrt(gamma_minus_one * (gamma_minus_one + 2.0)) / (gamma_minus_one + 1.0)
}

/// Computes the rapidity `atanh(beta)` of an electron with the given Lorentz factor.
pub fn gamma_to_rapidity(gamma: fun) -> fun {
    fun::acosh(gamma)
}

/// Computes the speed in units of c for the given rapidity.
pub fn rapidity_to_beta(rapidity: fun) -> fun {
    fun::tanh(rapidity)
}

/// Converts a specific intensity in SI units [W/(m^2 Hz sr)] to Jansky per steradian.
pub fn si_to_jansky_per_steradian(intensity: fun) -> fun {
    intensity * SI_TO_JY
}

/// Computes the brightness temperature [K] of a specific intensity [W/(m^2 Hz sr)]
/// at the given frequency [Hz] by inverting the Planck law.
pub fn intensity_to_brightness_temperature(intensity: fun, frequency: fun) -> fun {
    HPLANCK * frequency
        / (KBOLTZMANN
            * fun::ln_1p(2.0 * HPLANCK * frequency.powi(3) / (intensity * CLIGHT * CLIGHT)))
}

/// Converts a distortion of the CMB specific intensity [W/(m^2 Hz sr)] at the given
/// frequency [Hz] to the corresponding change in CMB thermodynamic temperature [K].
pub fn intensity_to_cmb_temperature_change(intensity_change: fun, frequency: fun) -> fun {
    let x = HPLANCK * frequency / (KBOLTZMANN * T_CMB);
    let exp_m1_x = fun::exp_m1(x);
    let planck_derivative = 2.0 * HPLANCK * frequency.powi(3) / (CLIGHT * CLIGHT)
        * x
        * (exp_m1_x + 1.0)
        / (exp_m1_x * exp_m1_x * T_CMB);
    intensity_change / planck_derivative
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lorentz_factor_round_trip_is_accurate() {
        for &beta in &[0.1, 0.5, 0.99, 0.999_999] {
            assert_relative_eq!(gamma_to_beta(beta_to_gamma(beta)), beta, max_relative = 1e-9);
        }
        for &beta in &[1e-9, 1e-6, 1e-3, 0.5, 0.999_999] {
            assert_relative_eq!(
                gamma_minus_one_to_beta(beta_to_gamma_minus_one(beta)),
                beta,
                max_relative = 1e-9
            );
        }
        assert_relative_eq!(rapidity_to_beta(gamma_to_rapidity(beta_to_gamma(0.3))), 0.3, max_relative = 1e-12);
        assert_eq!(gamma_to_rapidity(1.0), 0.0);
    }

    #[test]
    fn gamma_minus_one_is_stable_for_small_speeds() {
        let beta = 1e-9;
        assert_relative_eq!(beta_to_gamma_minus_one(beta), 0.5 * beta * beta, max_relative = 1e-6);
    }

    #[test]
    fn electron_rest_energy_gives_unit_theta() {
        assert_relative_eq!(kev_to_theta(511.0), 1.0, max_relative = 1e-3);
        assert_relative_eq!(kelvin_to_theta(kev_to_kelvin(5.0)), kev_to_theta(5.0), max_relative = 1e-12);
    }

    #[test]
    fn brightness_temperature_inverts_planck_law() {
        let frequency = 150e9;
        let x = HPLANCK * frequency / (KBOLTZMANN * T_CMB);
        let intensity =
            2.0 * HPLANCK * frequency.powi(3) / (CLIGHT * CLIGHT) / fun::exp_m1(x);
        assert_relative_eq!(
            intensity_to_brightness_temperature(intensity, frequency),
            T_CMB,
            max_relative = 1e-10
        );
    }
}
