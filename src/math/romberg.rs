//! Romberg integration with tabulated integrand values that can be reused
//! for integrating the same function against different weights.

use super::fin;
use rayon::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Configuration parameters for Romberg tabulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct RombergConfig {
    /// Relative tolerance on successive diagonal entries of the Romberg table.
    pub relative_tolerance: fin,
    /// Absolute tolerance on successive diagonal entries of the Romberg table.
    pub absolute_tolerance: fin,
    /// Number of table rows always computed before testing for convergence.
    pub min_rows: usize,
    /// Maximum number of table rows.
    pub max_rows: usize,
}

impl RombergConfig {
    pub const DEFAULT_RELATIVE_TOLERANCE: fin = 1e-6;
    pub const DEFAULT_ABSOLUTE_TOLERANCE: fin = 1e-12;
    pub const DEFAULT_MIN_ROWS: usize = 5;
    pub const DEFAULT_MAX_ROWS: usize = 14;

    /// Panics if any of the configuration parameter values are invalid.
    pub fn validate(&self) {
        assert!(
            self.relative_tolerance >= 0.0 && self.absolute_tolerance >= 0.0,
            "Romberg tolerances must be larger than or equal to zero."
        );
        assert!(
            self.min_rows >= 2,
            "Minimum number of Romberg rows must be at least 2."
        );
        assert!(
            self.min_rows <= self.max_rows && self.max_rows <= 24,
            "Maximum number of Romberg rows must be in the range [min_rows, 24]."
        );
    }
}

impl Default for RombergConfig {
    fn default() -> Self {
        RombergConfig {
            relative_tolerance: Self::DEFAULT_RELATIVE_TOLERANCE,
            absolute_tolerance: Self::DEFAULT_ABSOLUTE_TOLERANCE,
            min_rows: Self::DEFAULT_MIN_ROWS,
            max_rows: Self::DEFAULT_MAX_ROWS,
        }
    }
}

/// Integrand values tabulated on the dyadic nodes of a Romberg integration.
///
/// Values are stored in the order they are generated: the two end points,
/// followed by the new odd-indexed nodes of each successive row.
#[derive(Clone, Debug)]
pub struct RombergTable {
    start: fin,
    end: fin,
    values: Vec<fin>,
    n_rows: usize,
    integral: fin,
    converged: bool,
}

impl RombergTable {
    /// Tabulates the given function on successively refined dyadic nodes over
    /// `[start, end]` until the Romberg diagonal converges.
    ///
    /// The new nodes of each row are evaluated in parallel.
    pub fn tabulate<E>(evaluate: E, start: fin, end: fin, config: &RombergConfig) -> Self
    where
        E: Fn(fin) -> fin + Sync,
    {
        config.validate();

        let mut values = vec![evaluate(start), evaluate(end)];
        let mut step = end - start;

        let mut previous_row = vec![0.5 * step * (values[0] + values[1])];
        let mut n_rows = 1;
        let mut converged = false;

        for row_idx in 1..config.max_rows {
            step *= 0.5;
            let n_new_nodes = 1_usize << (row_idx - 1);

            let new_values: Vec<fin> = (0..n_new_nodes)
                .into_par_iter()
                .map(|idx| evaluate(start + ((2 * idx + 1) as fin) * step))
                .collect();
            let new_sum: fin = new_values.iter().sum();
            values.extend(new_values);

            let current_row = extrapolated_row(&previous_row, 0.5 * previous_row[0] + step * new_sum);
            n_rows += 1;

            let difference = fin::abs(current_row[row_idx] - previous_row[row_idx - 1]);
            let is_converged = difference
                <= config.relative_tolerance * fin::abs(current_row[row_idx])
                    + config.absolute_tolerance;
            previous_row = current_row;

            if n_rows >= config.min_rows && is_converged {
                converged = true;
                break;
            }
        }

        let integral = previous_row[n_rows - 1];

        if !converged {
            tracing::debug!(
                "Romberg tabulation over [{:e}, {:e}] did not converge in {} rows",
                start,
                end,
                n_rows
            );
        }

        RombergTable {
            start,
            end,
            values,
            n_rows,
            integral,
            converged,
        }
    }

    /// Returns the start of the integration interval.
    pub fn start(&self) -> fin {
        self.start
    }

    /// Returns the end of the integration interval.
    pub fn end(&self) -> fin {
        self.end
    }

    /// Returns the number of Romberg rows that were computed.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of tabulated integrand values.
    pub fn n_evaluations(&self) -> usize {
        self.values.len()
    }

    /// Whether the Romberg diagonal converged before the row limit.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Returns the Romberg estimate of the integral of the tabulated function.
    pub fn integral(&self) -> fin {
        self.integral
    }

    /// Returns the coordinate of the node with the given storage index.
    fn node_coordinate(&self, storage_idx: usize) -> fin {
        match storage_idx {
            0 => self.start,
            1 => self.end,
            _ => {
                // Row r (r >= 1) stores 2^(r-1) nodes starting at index 2^(r-1) + 1
                let offset = storage_idx - 1;
                let row_idx = (usize::BITS - offset.leading_zeros()) as usize;
                let first_in_row = 1_usize << (row_idx - 1);
                let idx_in_row = offset - first_in_row;
                let step = (self.end - self.start) / ((1_usize << row_idx) as fin);
                self.start + ((2 * idx_in_row + 1) as fin) * step
            }
        }
    }

    /// Returns the tabulated nodes and values sorted by coordinate.
    pub fn sorted_nodes(&self) -> Vec<(fin, fin)> {
        let mut nodes: Vec<(fin, fin)> = self
            .values
            .iter()
            .enumerate()
            .map(|(idx, &value)| (self.node_coordinate(idx), value))
            .collect();
        nodes.sort_by(|a, b| a.0.total_cmp(&b.0));
        nodes
    }

    /// Computes the Romberg estimate of the integral of the tabulated function
    /// multiplied by the given weight, reusing the tabulated values.
    ///
    /// The same rows as in the tabulation are used, so no new evaluations of
    /// the tabulated function are made.
    pub fn integrate_weighted<W>(&self, weight: W) -> fin
    where
        W: Fn(fin) -> fin,
    {
        let mut step = self.end - self.start;
        let mut previous_row = vec![
            0.5 * step * (self.values[0] * weight(self.start) + self.values[1] * weight(self.end)),
        ];

        let mut storage_idx = 2;
        for row_idx in 1..self.n_rows {
            step *= 0.5;
            let n_new_nodes = 1_usize << (row_idx - 1);
            let new_sum: fin = self.values[storage_idx..storage_idx + n_new_nodes]
                .iter()
                .enumerate()
                .map(|(idx, &value)| value * weight(self.start + ((2 * idx + 1) as fin) * step))
                .sum();
            storage_idx += n_new_nodes;
            previous_row = extrapolated_row(&previous_row, 0.5 * previous_row[0] + step * new_sum);
        }
        previous_row[self.n_rows - 1]
    }
}

/// Builds the next row of the Romberg table from the previous row and the
/// refined trapezoid estimate.
fn extrapolated_row(previous_row: &[fin], trapezoid: fin) -> Vec<fin> {
    let mut row = Vec::with_capacity(previous_row.len() + 1);
    row.push(trapezoid);
    let mut factor = 1.0;
    for (col_idx, &previous) in previous_row.iter().enumerate() {
        factor *= 4.0;
        let current = row[col_idx];
        row.push((factor * current - previous) / (factor - 1.0));
    }
    row
}
