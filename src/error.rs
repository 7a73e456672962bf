//! Error handling.

use thiserror::Error;

/// Errors that can occur while computing scattering kernels and signals.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SzError {
    #[error("Frequency shift s = {shift} is not accessible for electron speed beta = {beta}")]
    InaccessibleShift { shift: f64, beta: f64 },
    #[error("Electron speed beta = {0} is outside [0, 1)")]
    InvalidSpeed(f64),
    #[error("Electron temperature must be positive and finite, got {0} keV")]
    NonPositiveTemperature(f64),
    #[error("Lower Lorentz factor cut-off {lower} must be at least 1 and smaller than upper cut-off {upper}")]
    InvalidLorentzFactorRange { lower: f64, upper: f64 },
    #[error("{0}")]
    Domain(String),
    #[error("{0}")]
    InvalidArgument(String),
}

impl SzError {
    /// Whether the error stems from physically invalid input values.
    pub fn is_domain_error(&self) -> bool {
        !self.is_invalid_argument()
    }

    /// Whether the error stems from malformed array shapes or sizes.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SzError::InvalidArgument(_))
    }
}

pub type SzResult<T> = Result<T, SzError>;

#[cfg(not(feature = "for-testing"))]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        eprintln!($($print_arg)*);
        quit::with_code(1);
    }};
}

#[cfg(feature = "for-testing")]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        panic!($($print_arg)*);
    }};
}

#[macro_export]
macro_rules! exit_on_error {
    ($result:expr, $($print_arg:tt)*) => {
        match $result {
            Ok(value) => value,
            Err(err) => {
                $crate::exit_with_error!($($print_arg)*, err)
            }
        }
    };
}

#[macro_export]
macro_rules! exit_on_false {
    ($logic:expr, $($print_arg:tt)*) => {
        if $logic {
            true
        } else {
            $crate::exit_with_error!($($print_arg)*)
        }
    };
}

#[macro_export]
macro_rules! exit_on_none {
    ($option:expr, $($print_arg:tt)*) => {
        $option.unwrap_or_else(|| $crate::exit_with_error!($($print_arg)*))
    };
}
