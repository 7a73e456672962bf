//! Photon redistribution kernels for Compton scattering off electrons.

pub mod multiple;
pub mod thomson;

use crate::math::{
    quadrature::QuadratureConfig,
    romberg::{RombergConfig, RombergTable},
};
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Floating-point precision to use for scattering kernels.
#[allow(non_camel_case_types)]
pub type fkr = f64;

/// Configuration parameters for scattering kernel evaluation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct KernelConfig {
    /// Quadrature parameters for the integral over incoming photon directions.
    pub mu_quadrature: QuadratureConfig,
    /// Quadrature parameters for the integral over electron speeds.
    pub beta_quadrature: QuadratureConfig,
}

impl KernelConfig {
    pub const DEFAULT_MU_RELATIVE_TOLERANCE: fkr = 1e-6;
    pub const DEFAULT_MU_MAX_REFINEMENTS: u32 = 12;
    pub const DEFAULT_BETA_RELATIVE_TOLERANCE: fkr = 1e-5;
    pub const DEFAULT_BETA_MIN_REFINEMENTS: u32 = 4;
    pub const DEFAULT_BETA_MAX_REFINEMENTS: u32 = 12;

    /// Panics if any of the configuration parameter values are invalid.
    pub fn validate(&self) {
        self.mu_quadrature.validate();
        self.beta_quadrature.validate();
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            mu_quadrature: QuadratureConfig::with_tolerance(
                Self::DEFAULT_MU_RELATIVE_TOLERANCE,
                Self::DEFAULT_MU_MAX_REFINEMENTS,
            ),
            beta_quadrature: QuadratureConfig {
                min_refinements: Self::DEFAULT_BETA_MIN_REFINEMENTS,
                ..QuadratureConfig::with_tolerance(
                    Self::DEFAULT_BETA_RELATIVE_TOLERANCE,
                    Self::DEFAULT_BETA_MAX_REFINEMENTS,
                )
            },
        }
    }
}

/// Value of a redistribution kernel together with whether every quadrature
/// that went into it converged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelValue {
    pub value: fkr,
    pub converged: bool,
}

impl KernelValue {
    /// Exactly vanishing kernel value.
    pub const ZERO: Self = Self {
        value: 0.0,
        converged: true,
    };
}

/// A redistribution kernel tabulated over logarithmic frequency shifts,
/// ready to be integrated against different spectral weights.
#[derive(Clone, Debug)]
pub struct KernelTable {
    table: RombergTable,
    n_unconverged: usize,
}

impl KernelTable {
    /// Tabulates the given kernel over `[s_min, s_max]`.
    ///
    /// Kernel evaluations whose quadratures did not converge are counted and
    /// reported in a single warning.
    pub fn tabulate<K>(evaluate_kernel: K, s_min: fkr, s_max: fkr, config: &RombergConfig) -> Self
    where
        K: Fn(fkr) -> KernelValue + Sync,
    {
        let n_unconverged = AtomicUsize::new(0);
        let table = RombergTable::tabulate(
            |s| {
                let kernel_value = evaluate_kernel(s);
                if !kernel_value.converged {
                    n_unconverged.fetch_add(1, Ordering::Relaxed);
                }
                kernel_value.value
            },
            s_min,
            s_max,
            config,
        );
        let n_unconverged = n_unconverged.into_inner();

        tracing::info!(
            "Tabulated kernel over s in [{:.3}, {:.3}] with {} nodes ({} Romberg rows)",
            s_min,
            s_max,
            table.n_evaluations(),
            table.n_rows()
        );
        if n_unconverged > 0 {
            tracing::warn!(
                "{} of {} kernel evaluations did not reach the requested accuracy",
                n_unconverged,
                table.n_evaluations()
            );
        }
        if !table.converged() {
            tracing::warn!(
                "Kernel integral did not converge within {} Romberg rows",
                table.n_rows()
            );
        }

        Self {
            table,
            n_unconverged,
        }
    }

    /// Returns the integral of the kernel over the tabulated shifts.
    pub fn total(&self) -> fkr {
        self.table.integral()
    }

    /// Integrates the kernel multiplied by the given weight over the
    /// tabulated shifts.
    pub fn integrate_weighted<W>(&self, weight: W) -> fkr
    where
        W: Fn(fkr) -> fkr,
    {
        self.table.integrate_weighted(weight)
    }

    /// Returns the tabulated shifts and kernel values sorted by shift.
    pub fn sorted_nodes(&self) -> Vec<(fkr, fkr)> {
        self.table.sorted_nodes()
    }

    /// Returns the number of tabulated kernel values.
    pub fn n_evaluations(&self) -> usize {
        self.table.n_evaluations()
    }

    /// Returns the number of kernel evaluations that did not converge.
    pub fn n_unconverged(&self) -> usize {
        self.n_unconverged
    }

    /// Whether the tabulation and every kernel evaluation converged.
    pub fn converged(&self) -> bool {
        self.table.converged() && self.n_unconverged == 0
    }
}
