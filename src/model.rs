//! Gas models of galaxy clusters.

pub mod iso_beta;

use crate::error::{SzError, SzResult};
use std::{fmt, str::FromStr};

/// Floating-point precision to use for cluster models.
#[allow(non_camel_case_types)]
pub type fmo = f64;

/// Arrangement of azimuth and elevation samples on the sky.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleLayout {
    /// Every combination of the azimuth and elevation samples, giving an
    /// output of shape `(n_az, n_el)`.
    Grid,
    /// Azimuth and elevation samples paired element by element, giving one
    /// output value per pair.
    Trace,
}

impl SampleLayout {
    /// Returns the shape of the output for the given numbers of azimuth and
    /// elevation samples, after checking that they are compatible with the layout.
    pub fn output_shape(&self, n_az: usize, n_el: usize) -> SzResult<Vec<usize>> {
        if n_az == 0 || n_el == 0 {
            return Err(SzError::InvalidArgument(format!(
                "Numbers of azimuth and elevation samples must be positive, got {} and {}",
                n_az, n_el
            )));
        }
        match self {
            Self::Grid => Ok(vec![n_az, n_el]),
            Self::Trace => {
                if n_az == n_el {
                    Ok(vec![n_az])
                } else {
                    Err(SzError::InvalidArgument(format!(
                        "Traced azimuth and elevation samples must have equal lengths, got {} and {}",
                        n_az, n_el
                    )))
                }
            }
        }
    }
}

impl FromStr for SampleLayout {
    type Err = SzError;

    fn from_str(s: &str) -> SzResult<Self> {
        match s {
            "grid" => Ok(Self::Grid),
            "trace" => Ok(Self::Trace),
            _ => Err(SzError::InvalidArgument(format!(
                "Unknown sample layout: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for SampleLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Grid => "grid",
                Self::Trace => "trace",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_shape_follows_layout() {
        assert_eq!(SampleLayout::Grid.output_shape(3, 4), Ok(vec![3, 4]));
        assert_eq!(SampleLayout::Trace.output_shape(5, 5), Ok(vec![5]));
        assert!(SampleLayout::Trace
            .output_shape(5, 4)
            .unwrap_err()
            .is_invalid_argument());
        assert!(SampleLayout::Grid.output_shape(0, 4).is_err());
    }
}
