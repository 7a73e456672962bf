//! Adaptive one-dimensional quadrature with bounded refinement.

use super::fin;
use crate::error::{SzError, SzResult};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Configuration parameters for adaptive quadrature.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadratureConfig {
    /// Successive estimates must agree to within this fraction of their magnitude.
    pub relative_tolerance: fin,
    /// Additional absolute tolerance, to terminate for integrals that vanish.
    pub absolute_tolerance: fin,
    /// Number of interval halvings always performed before testing for convergence.
    pub min_refinements: u32,
    /// Number of interval halvings after which the best estimate is returned
    /// even if it has not converged.
    pub max_refinements: u32,
}

/// Result of an adaptive quadrature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadratureEstimate {
    /// Best available estimate of the integral.
    pub value: fin,
    /// Absolute difference between the two last estimates.
    pub error_estimate: fin,
    /// Number of integrand evaluations (quadrature nodes) used.
    pub n_evaluations: usize,
    /// Number of interval halvings performed.
    pub refinements: u32,
    /// Whether the tolerance was met before the refinement limit.
    pub converged: bool,
}

impl QuadratureConfig {
    pub const DEFAULT_RELATIVE_TOLERANCE: fin = 1e-6;
    pub const DEFAULT_ABSOLUTE_TOLERANCE: fin = 1e-12;
    pub const DEFAULT_MIN_REFINEMENTS: u32 = 2;
    pub const DEFAULT_MAX_REFINEMENTS: u32 = 16;

    /// Largest number of refinements that can be requested.
    pub const REFINEMENT_LIMIT: u32 = 24;

    /// Creates a configuration with the given tolerance and refinement limit,
    /// using defaults for the remaining parameters.
    pub fn with_tolerance(relative_tolerance: fin, max_refinements: u32) -> Self {
        Self {
            relative_tolerance,
            max_refinements,
            ..Self::default()
        }
    }

    /// Largest number of integrand evaluations a quadrature with this
    /// configuration can perform.
    pub fn max_evaluations(&self) -> usize {
        (1 << self.max_refinements) + 1
    }

    /// Panics if any of the configuration parameter values are invalid.
    pub fn validate(&self) {
        assert!(
            self.relative_tolerance >= 0.0 && self.absolute_tolerance >= 0.0,
            "Quadrature tolerances must be larger than or equal to zero."
        );
        assert!(
            self.relative_tolerance > 0.0 || self.absolute_tolerance > 0.0,
            "At least one quadrature tolerance must be larger than zero."
        );
        assert!(
            self.min_refinements <= self.max_refinements,
            "Minimum number of refinements must not exceed maximum number of refinements."
        );
        assert!(
            self.max_refinements >= 2 && self.max_refinements <= Self::REFINEMENT_LIMIT,
            "Maximum number of refinements must be in the range [2, {}].",
            Self::REFINEMENT_LIMIT
        );
    }
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        QuadratureConfig {
            relative_tolerance: Self::DEFAULT_RELATIVE_TOLERANCE,
            absolute_tolerance: Self::DEFAULT_ABSOLUTE_TOLERANCE,
            min_refinements: Self::DEFAULT_MIN_REFINEMENTS,
            max_refinements: Self::DEFAULT_MAX_REFINEMENTS,
        }
    }
}

/// Determines how many quadrature nodes are needed to integrate the given
/// function over the given interval to the configured accuracy, and returns
/// the corresponding integral estimate.
///
/// The interval is repeatedly halved, reusing every earlier node, and
/// consecutive trapezoid estimates are combined into Simpson estimates.
/// Refinement stops when two successive Simpson estimates agree within the
/// tolerance, or when the refinement limit is reached. In the latter case
/// the best estimate is returned with `converged` set to `false`.
pub fn estimate_eval_count<E>(
    evaluate_integrand: E,
    start: fin,
    end: fin,
    config: &QuadratureConfig,
) -> QuadratureEstimate
where
    E: Fn(fin) -> fin,
{
    debug_assert!(
        config.max_refinements <= QuadratureConfig::REFINEMENT_LIMIT,
        "Refinement limit exceeded"
    );

    if end == start {
        return QuadratureEstimate {
            value: 0.0,
            error_estimate: 0.0,
            n_evaluations: 1,
            refinements: 0,
            converged: true,
        };
    }

    let width = end - start;
    let mut trapezoid = 0.5 * width * (evaluate_integrand(start) + evaluate_integrand(end));
    let mut n_intervals: usize = 1;
    let mut simpson = trapezoid;
    let mut error_estimate = fin::INFINITY;

    for refinement in 1..=config.max_refinements {
        let step = width / (n_intervals as fin);
        let midpoint_sum: fin = (0..n_intervals)
            .map(|idx| evaluate_integrand(start + (idx as fin + 0.5) * step))
            .sum();
        let refined_trapezoid = 0.5 * (trapezoid + step * midpoint_sum);
        n_intervals *= 2;

        let refined_simpson = (4.0 * refined_trapezoid - trapezoid) / 3.0;
        trapezoid = refined_trapezoid;

        if refinement >= 2 {
            error_estimate = fin::abs(refined_simpson - simpson);
            if refinement >= config.min_refinements
                && error_estimate
                    <= config.relative_tolerance * fin::abs(refined_simpson)
                        + config.absolute_tolerance
            {
                return QuadratureEstimate {
                    value: refined_simpson,
                    error_estimate,
                    n_evaluations: n_intervals + 1,
                    refinements: refinement,
                    converged: true,
                };
            }
        }
        simpson = refined_simpson;
    }

    tracing::debug!(
        "Quadrature over [{:e}, {:e}] did not converge after {} refinements (estimate {:e}, error {:e})",
        start,
        end,
        config.max_refinements,
        simpson,
        error_estimate
    );

    QuadratureEstimate {
        value: simpson,
        error_estimate,
        n_evaluations: n_intervals + 1,
        refinements: config.max_refinements,
        converged: false,
    }
}

/// Estimates the integral of the given function over the given interval
/// using a composite Simpson rule with the given number of nodes.
///
/// An even number of nodes is raised by one, since the rule needs an even
/// number of subintervals.
pub fn integrate<E>(evaluate_integrand: E, start: fin, end: fin, n_nodes: usize) -> SzResult<fin>
where
    E: Fn(fin) -> fin,
{
    if n_nodes < 3 {
        return Err(SzError::InvalidArgument(format!(
            "Simpson quadrature requires at least 3 nodes, got {}",
            n_nodes
        )));
    }
    if !(start.is_finite() && end.is_finite()) {
        return Err(SzError::InvalidArgument(format!(
            "Integration limits must be finite, got [{}, {}]",
            start, end
        )));
    }
    let n_intervals = if n_nodes % 2 == 0 {
        n_nodes
    } else {
        n_nodes - 1
    };
    let step = (end - start) / (n_intervals as fin);

    let interior_sum: fin = (1..n_intervals)
        .map(|idx| {
            let weight = if idx % 2 == 1 { 4.0 } else { 2.0 };
            weight * evaluate_integrand(start + (idx as fin) * step)
        })
        .sum();

    Ok(step * (evaluate_integrand(start) + interior_sum + evaluate_integrand(end)) / 3.0)
}
