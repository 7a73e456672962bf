//! Redistribution kernels for single scatterings off a population of
//! electrons with a distribution of speeds.

use super::{fkr, thomson, KernelConfig, KernelTable, KernelValue};
use crate::{
    constants::BETA_MAX,
    distribution::{
        maxwell_juttner::MaxwellJuttnerDistribution, power_law::PowerLawDistribution,
        ElectronDistribution, SpeedDistribution,
    },
    error::SzResult,
    io::Verbosity,
    kinematics,
    math::{quadrature, romberg::RombergConfig},
    units::{beta_to_gamma, gamma_to_rapidity, rapidity_to_beta},
};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use std::cell::Cell;

/// Evaluates the integrand over electron speed of the thermal redistribution
/// kernel, `P(s; beta)*f_MJ(beta)`.
pub fn multi_scattering_mj(
    beta: fkr,
    s: fkr,
    distribution: &MaxwellJuttnerDistribution,
    config: &KernelConfig,
) -> SzResult<fkr> {
    Ok(thomson::single_scattering(s, beta, &config.mu_quadrature)?.value
        * distribution.evaluate_beta(beta))
}

/// Evaluates the integrand over electron speed of the power-law
/// redistribution kernel, `P(s; beta)*f_PL(beta)`.
pub fn multi_scattering_pl(
    beta: fkr,
    s: fkr,
    distribution: &PowerLawDistribution,
    config: &KernelConfig,
) -> SzResult<fkr> {
    Ok(thomson::single_scattering(s, beta, &config.mu_quadrature)?.value
        * distribution.evaluate_beta(beta))
}

/// The redistribution kernel `P_1(s)` of photons scattering once off an
/// electron population, obtained by integrating the single-speed kernel over
/// the speed distribution.
#[derive(Clone, Debug)]
pub struct MultipleScatteringKernel {
    distribution: ElectronDistribution,
    config: KernelConfig,
    /// Rapidity of the slowest electrons in the distribution.
    min_rapidity: fkr,
    /// Rapidity of the fastest electrons in the distribution.
    max_rapidity: fkr,
}

impl MultipleScatteringKernel {
    /// Smallest rapidity included in the speed integral. Electrons at rest
    /// do not shift photons.
    pub const MIN_RAPIDITY: fkr = 1e-8;

    /// Creates a new kernel for the given electron distribution.
    pub fn new(distribution: ElectronDistribution, config: KernelConfig) -> Self {
        config.validate();
        let min_rapidity = gamma_to_rapidity(distribution.min_lorentz_factor());
        let max_rapidity = gamma_to_rapidity(fkr::min(
            distribution.max_lorentz_factor(),
            beta_to_gamma(BETA_MAX),
        ));
        Self {
            distribution,
            config,
            min_rapidity,
            max_rapidity,
        }
    }

    /// Creates a kernel for a thermal population at the given temperature [keV].
    pub fn thermal(temperature: fkr, config: KernelConfig) -> SzResult<Self> {
        Ok(Self::new(
            MaxwellJuttnerDistribution::new(temperature)?.into(),
            config,
        ))
    }

    /// Creates a kernel for a power-law population.
    pub fn power_law(
        gamma_min: fkr,
        gamma_max: fkr,
        alpha: fkr,
        config: KernelConfig,
    ) -> SzResult<Self> {
        Ok(Self::new(
            PowerLawDistribution::new(gamma_min, gamma_max, alpha)?.into(),
            config,
        ))
    }

    /// Returns the electron distribution of the kernel.
    pub fn distribution(&self) -> &ElectronDistribution {
        &self.distribution
    }

    /// Returns the largest shift that the fastest electrons can produce.
    pub fn max_shift(&self) -> fkr {
        2.0 * self.max_rapidity
    }

    /// Evaluates `P_1(s)`.
    ///
    /// The speed integral runs from the slowest electrons able to produce
    /// the shift to the fastest electrons in the distribution. It is carried
    /// out over the rapidity `eta = atanh(beta)`, where
    /// `dbeta/deta = 1/cosh(eta)^2`, which resolves both the slow and the
    /// ultra-relativistic end of the distribution.
    pub fn evaluate(&self, s: fkr) -> KernelValue {
        let start = fkr::max(self.min_rapidity, kinematics::min_rapidity(s))
            .max(Self::MIN_RAPIDITY);
        let end = self.max_rapidity;
        if !(start < end) {
            return KernelValue::ZERO;
        }

        let inner_converged = Cell::new(true);
        let estimate = quadrature::estimate_eval_count(
            |rapidity| {
                let beta = rapidity_to_beta(rapidity);
                let density = self.distribution.evaluate_beta(beta);
                if density == 0.0 {
                    return 0.0;
                }
                let kernel =
                    thomson::single_scattering_unchecked(s, beta, &self.config.mu_quadrature);
                if !kernel.converged {
                    inner_converged.set(false);
                }
                let cosh = fkr::cosh(rapidity);
                kernel.value * density / (cosh * cosh)
            },
            start,
            end,
            &self.config.beta_quadrature,
        );

        KernelValue {
            value: fkr::max(estimate.value, 0.0),
            converged: estimate.converged && inner_converged.get(),
        }
    }

    /// Evaluates `P_1(s)` for each of the given shifts in parallel.
    ///
    /// A single warning summarizes any evaluations that did not converge.
    pub fn evaluate_all(&self, shifts: &[fkr], verbosity: &Verbosity) -> Vec<KernelValue> {
        let values: Vec<_> = shifts
            .par_iter()
            .progress_with(verbosity.create_progress_bar(shifts.len()))
            .map(|&s| self.evaluate(s))
            .collect();
        let n_unconverged = values.iter().filter(|value| !value.converged).count();
        if n_unconverged > 0 {
            tracing::warn!(
                "{} of {} kernel evaluations did not reach the requested accuracy",
                n_unconverged,
                values.len()
            );
        }
        values
    }

    /// Tabulates `P_1(s)` over all accessible shifts.
    pub fn tabulate(&self, config: &RombergConfig) -> KernelTable {
        let s_max = self.max_shift();
        KernelTable::tabulate(|s| self.evaluate(s), -s_max, s_max, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::quadrature::integrate;
    use approx::assert_relative_eq;

    #[test]
    fn thermal_kernel_is_normalized() {
        let kernel = MultipleScatteringKernel::thermal(10.0, KernelConfig::default()).unwrap();
        let s_max = kernel.max_shift();
        let total = integrate(|s| kernel.evaluate(s).value, -s_max, s_max, 801).unwrap();
        assert_relative_eq!(total, 1.0, max_relative = 2e-3);
    }

    #[test]
    fn thermal_kernel_table_is_normalized() {
        let kernel = MultipleScatteringKernel::thermal(5.0, KernelConfig::default()).unwrap();
        let table = kernel.tabulate(&RombergConfig {
            relative_tolerance: 1e-4,
            max_rows: 10,
            ..RombergConfig::default()
        });
        assert_relative_eq!(table.total(), 1.0, max_relative = 2e-3);
        assert!(table.sorted_nodes().iter().all(|&(_, value)| value >= 0.0));
    }

    #[test]
    fn hotter_gas_broadens_kernel() {
        let cool = MultipleScatteringKernel::thermal(2.0, KernelConfig::default()).unwrap();
        let hot = MultipleScatteringKernel::thermal(20.0, KernelConfig::default()).unwrap();
        assert!(hot.max_shift() > cool.max_shift());
        assert!(cool.evaluate(0.0).value > hot.evaluate(0.0).value);
        assert!(hot.evaluate(0.5).value > cool.evaluate(0.5).value);
    }

    #[test]
    fn parallel_evaluation_matches_serial() {
        let kernel = MultipleScatteringKernel::thermal(8.0, KernelConfig::default()).unwrap();
        let shifts = [-0.3, 0.0, 0.05, 0.4];
        let values = kernel.evaluate_all(&shifts, &Verbosity::Quiet);
        for (&s, value) in shifts.iter().zip(values.iter()) {
            assert_eq!(*value, kernel.evaluate(s));
        }
    }

    #[test]
    fn power_law_kernel_is_normalized() {
        let kernel =
            MultipleScatteringKernel::power_law(1.0, 10.0, 2.5, KernelConfig::default()).unwrap();
        let s_max = kernel.max_shift();
        let total = integrate(|s| kernel.evaluate(s).value, -s_max, s_max, 1601).unwrap();
        assert_relative_eq!(total, 1.0, max_relative = 5e-3);
    }

    #[test]
    fn integrands_combine_single_kernel_and_density() {
        let config = KernelConfig::default();
        let distribution = MaxwellJuttnerDistribution::new(5.0).unwrap();
        let beta = 0.2;
        let s = 0.1;
        let expected = thomson::single_scattering(s, beta, &config.mu_quadrature)
            .unwrap()
            .value
            * distribution.evaluate_beta(beta);
        assert_eq!(
            multi_scattering_mj(beta, s, &distribution, &config).unwrap(),
            expected
        );

        let distribution = PowerLawDistribution::new(1.0, 10.0, 2.0).unwrap();
        assert!(multi_scattering_pl(0.9, 1.0, &distribution, &config).unwrap() > 0.0);
        assert_eq!(multi_scattering_pl(0.01, 1.0, &distribution, &config).unwrap(), 0.0);
        assert!(multi_scattering_pl(1.5, 1.0, &distribution, &config).is_err());
    }

    #[test]
    fn narrow_power_law_reduces_to_single_speed_kernel() {
        let config = KernelConfig::default();
        let gamma_min = 1.5;
        let gamma_max = gamma_min * (1.0 + 1e-4);
        let kernel =
            MultipleScatteringKernel::power_law(gamma_min, gamma_max, 2.0, config.clone()).unwrap();
        let beta = crate::units::gamma_to_beta(0.5 * (gamma_min + gamma_max));
        let s_max = kinematics::max_shift(beta);
        for idx in 0..=16 {
            let s = 0.8 * s_max * (idx as fkr / 8.0 - 1.0);
            let expected = thomson::single_scattering(s, beta, &config.mu_quadrature)
                .unwrap()
                .value;
            assert_relative_eq!(kernel.evaluate(s).value, expected, max_relative = 1e-3);
        }
    }

    #[test]
    fn cold_thermal_kernel_concentrates_at_zero_shift() {
        let kernel = MultipleScatteringKernel::thermal(0.01, KernelConfig::default()).unwrap();
        let s_max = kernel.max_shift();
        assert!(s_max < 0.1);
        assert_eq!(kernel.evaluate(0.2).value, 0.0);

        let total = integrate(|s| kernel.evaluate(s).value, -s_max, s_max, 801).unwrap();
        assert_relative_eq!(total, 1.0, max_relative = 5e-3);
        let central = integrate(|s| kernel.evaluate(s).value, -0.03, 0.03, 241).unwrap();
        assert!(central > 0.95 * total);
    }
}
