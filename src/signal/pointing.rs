//! Distortion spectra along a single line of sight.

use super::{
    background::{cmb_intensity, dimensionless_frequency},
    fsg, validate_frequencies, validate_optical_depth, KinematicApproximation, SignalConfig,
};
use crate::{
    error::{SzError, SzResult},
    kernel::{multiple::MultipleScatteringKernel, KernelTable},
    math::quadrature,
    units::{beta_to_gamma, velocity_to_beta},
};
use ndarray::Array1;
use rayon::prelude::*;

/// Computes the thermal SZ spectrum [W/(m^2 Hz sr)] at the given frequencies
/// [Hz] for gas with the given electron temperature [keV] and optical depth.
pub fn tsz_signal(
    frequencies: &[fsg],
    temperature: fsg,
    optical_depth: fsg,
    config: &SignalConfig,
) -> SzResult<Array1<fsg>> {
    validate_frequencies(frequencies)?;
    validate_optical_depth(optical_depth)?;
    config.validate();
    let kernel = MultipleScatteringKernel::thermal(temperature, config.kernel.clone())?;
    let table = kernel.tabulate(&config.romberg);
    Ok(scattered_signal(
        &table,
        frequencies,
        optical_depth,
        config.include_cmb,
    ))
}

/// Computes the non-thermal SZ spectrum [W/(m^2 Hz sr)] at the given
/// frequencies [Hz] for a power-law electron population with the given
/// Lorentz factor cut-offs and exponent, and the given optical depth.
pub fn ntsz_signal(
    frequencies: &[fsg],
    gamma_min: fsg,
    gamma_max: fsg,
    alpha: fsg,
    optical_depth: fsg,
    config: &SignalConfig,
) -> SzResult<Array1<fsg>> {
    validate_frequencies(frequencies)?;
    validate_optical_depth(optical_depth)?;
    config.validate();
    let kernel =
        MultipleScatteringKernel::power_law(gamma_min, gamma_max, alpha, config.kernel.clone())?;
    let table = kernel.tabulate(&config.romberg);
    Ok(scattered_signal(
        &table,
        frequencies,
        optical_depth,
        config.include_cmb,
    ))
}

/// Computes the spectrum of CMB photons scattered once with the tabulated
/// redistribution kernel, `tau*(int P_1(s)*B(nu*exp(-s)) ds - B(nu))`.
///
/// The unscattered CMB is added if `include_cmb` is true.
pub fn scattered_signal(
    table: &KernelTable,
    frequencies: &[fsg],
    optical_depth: fsg,
    include_cmb: bool,
) -> Array1<fsg> {
    let signal: Vec<fsg> = frequencies
        .par_iter()
        .map(|&frequency| {
            let unscattered = cmb_intensity(frequency);
            let scattered =
                table.integrate_weighted(|s| cmb_intensity(frequency * fsg::exp(-s)));
            let distortion = optical_depth * (scattered - unscattered);
            if include_cmb {
                unscattered + distortion
            } else {
                distortion
            }
        })
        .collect();
    Array1::from(signal)
}

/// Computes the kinematic SZ spectrum [W/(m^2 Hz sr)] at the given
/// frequencies [Hz] for gas with the given line-of-sight peculiar velocity
/// [km/s] (positive when receding) and optical depth.
pub fn ksz_signal(
    frequencies: &[fsg],
    velocity: fsg,
    optical_depth: fsg,
    config: &SignalConfig,
) -> SzResult<Array1<fsg>> {
    validate_frequencies(frequencies)?;
    validate_optical_depth(optical_depth)?;
    config.validate();
    let beta = velocity_to_beta(velocity);
    if !(beta.is_finite() && fsg::abs(beta) < 1.0) {
        return Err(SzError::InvalidSpeed(beta));
    }

    let signal: Vec<fsg> = frequencies
        .par_iter()
        .map(|&frequency| {
            let unscattered = cmb_intensity(frequency);
            let distortion = optical_depth
                * match config.kinematic_approximation {
                    KinematicApproximation::FirstOrder => {
                        first_order_kinematic_distortion(frequency, beta)
                    }
                    KinematicApproximation::Angular => angular_kinematic_distortion(
                        frequency,
                        beta,
                        &config.kinematic_quadrature,
                    ),
                };
            if config.include_cmb {
                unscattered + distortion
            } else {
                distortion
            }
        })
        .collect();
    Ok(Array1::from(signal))
}

/// Computes `-beta*B(nu)*x*exp(x)/(exp(x) - 1)`, the kinematic distortion
/// per unit optical depth to first order in the peculiar speed.
fn first_order_kinematic_distortion(frequency: fsg, beta: fsg) -> fsg {
    let intensity = cmb_intensity(frequency);
    if intensity == 0.0 {
        return 0.0;
    }
    let x = dimensionless_frequency(frequency);
    -beta * intensity * x * (1.0 + 1.0 / fsg::exp_m1(x))
}

/// Computes the kinematic distortion per unit optical depth by averaging the
/// boosted CMB over the dipole scattering phase function.
fn angular_kinematic_distortion(
    frequency: fsg,
    beta: fsg,
    quadrature_config: &quadrature::QuadratureConfig,
) -> fsg {
    let intensity = cmb_intensity(frequency);
    if intensity == 0.0 {
        return 0.0;
    }
    let x = dimensionless_frequency(frequency);
    let gamma = beta_to_gamma(beta);
    let boost = gamma * gamma * (1.0 + beta);
    let exp_m1_x = fsg::exp_m1(x);
    let estimate = quadrature::estimate_eval_count(
        |mu| {
            let boosted_x = x * boost * (1.0 - beta * mu);
            0.375 * (1.0 + mu * mu) * (exp_m1_x / fsg::exp_m1(boosted_x) - 1.0)
        },
        -1.0,
        1.0,
        quadrature_config,
    );
    if !estimate.converged {
        tracing::warn!(
            "Kinematic SZ integral at {:e} Hz did not reach the requested accuracy",
            frequency
        );
    }
    intensity * estimate.value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::GHZ_TO_HZ, units::kev_to_theta};
    use approx::assert_relative_eq;

    #[test]
    fn tsz_decrement_matches_rayleigh_jeans_limit() {
        let temperature = 5.0;
        let optical_depth = 0.01;
        let frequency = 1.0 * GHZ_TO_HZ;
        let signal =
            tsz_signal(&[frequency], temperature, optical_depth, &SignalConfig::default()).unwrap();
        let expected = -2.0 * optical_depth * kev_to_theta(temperature) * cmb_intensity(frequency);
        assert_relative_eq!(signal[0], expected, max_relative = 3e-2);
    }

    #[test]
    #[should_panic]
    fn ksz_rejects_invalid_quadrature_config() {
        let mut config = SignalConfig::default();
        config.kinematic_quadrature.min_refinements = config.kinematic_quadrature.max_refinements + 1;
        let _ = ksz_signal(&[150.0 * GHZ_TO_HZ], 300.0, 0.01, &config);
    }

    #[test]
    fn tsz_changes_sign_near_220_ghz() {
        let frequencies = [100.0 * GHZ_TO_HZ, 200.0 * GHZ_TO_HZ, 240.0 * GHZ_TO_HZ, 350.0 * GHZ_TO_HZ];
        let signal = tsz_signal(&frequencies, 5.0, 0.01, &SignalConfig::default()).unwrap();
        assert!(signal[0] < 0.0);
        assert!(signal[1] < 0.0);
        assert!(signal[2] > 0.0);
        assert!(signal[3] > 0.0);
    }

    #[test]
    fn including_cmb_adds_blackbody() {
        let frequencies = [150.0 * GHZ_TO_HZ];
        let mut config = SignalConfig::default();
        let distortion = tsz_signal(&frequencies, 8.0, 0.01, &config).unwrap();
        config.include_cmb = true;
        let total = tsz_signal(&frequencies, 8.0, 0.01, &config).unwrap();
        assert_relative_eq!(
            total[0] - distortion[0],
            cmb_intensity(frequencies[0]),
            max_relative = 1e-10
        );
    }

    #[test]
    fn ntsz_signal_is_a_decrement_at_low_frequencies() {
        let signal =
            ntsz_signal(&[30.0 * GHZ_TO_HZ], 1.0, 10.0, 2.5, 1e-4, &SignalConfig::default())
                .unwrap();
        assert!(signal[0] < 0.0);
    }

    #[test]
    fn ksz_approximations_agree_for_small_velocities() {
        let frequencies = [90.0 * GHZ_TO_HZ, 150.0 * GHZ_TO_HZ, 300.0 * GHZ_TO_HZ];
        let mut config = SignalConfig::default();
        let first_order = ksz_signal(&frequencies, 300.0, 0.01, &config).unwrap();
        config.kinematic_approximation = KinematicApproximation::Angular;
        let angular = ksz_signal(&frequencies, 300.0, 0.01, &config).unwrap();
        for (a, b) in first_order.iter().zip(angular.iter()) {
            assert!(*a < 0.0);
            assert_relative_eq!(*a, *b, max_relative = 1e-2);
        }
    }

    #[test]
    fn ksz_sign_follows_velocity() {
        let config = SignalConfig::default();
        let receding = ksz_signal(&[150.0 * GHZ_TO_HZ], 500.0, 0.01, &config).unwrap();
        let approaching = ksz_signal(&[150.0 * GHZ_TO_HZ], -500.0, 0.01, &config).unwrap();
        assert_relative_eq!(receding[0], -approaching[0], max_relative = 1e-12);
        assert!(ksz_signal(&[150.0 * GHZ_TO_HZ], 4e5, 0.01, &config).is_err());
    }

    #[test]
    fn signals_are_reproducible() {
        let frequencies = [150.0 * GHZ_TO_HZ];
        let config = SignalConfig::default();
        let first = tsz_signal(&frequencies, 5.0, 0.01, &config).unwrap();
        let second = tsz_signal(&frequencies, 5.0, 0.01, &config).unwrap();
        assert_eq!(first, second);
    }
}
