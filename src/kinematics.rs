//! Kinematics of photons scattering off electrons moving at a given speed.
//!
//! A photon scattered by an electron with speed `beta` has its frequency
//! shifted by the logarithmic amount `s = ln(nu_out/nu_in)`. Only shifts with
//! `|s| <= ln((1 + beta)/(1 - beta))` are kinematically accessible, and for an
//! accessible shift only a range `[mu1, mu2]` of cosines of the angle between
//! the incoming photon and the electron velocity can produce it.

use crate::error::{SzError, SzResult};

/// Floating-point precision to use for scattering kinematics.
#[allow(non_camel_case_types)]
pub type fsc = f64;

/// Range of incoming direction cosines that can produce a given shift.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatteringLimits {
    /// Lower direction cosine.
    pub mu1: fsc,
    /// Upper direction cosine.
    pub mu2: fsc,
}

impl ScatteringLimits {
    /// Full range of direction cosines.
    pub const FULL: Self = Self {
        mu1: -1.0,
        mu2: 1.0,
    };

    /// Returns the length of the direction cosine range.
    pub fn width(&self) -> fsc {
        self.mu2 - self.mu1
    }
}

/// Computes the largest logarithmic frequency shift that an electron with
/// the given speed can produce.
pub fn max_shift(beta: fsc) -> fsc {
    fsc::ln_1p(beta) - fsc::ln_1p(-beta)
}

/// Computes the smallest electron speed that can produce the given
/// logarithmic frequency shift.
pub fn min_beta(s: fsc) -> fsc {
    fsc::tanh(0.5 * fsc::abs(s))
}

/// Computes the smallest electron Lorentz factor that can produce the given
/// logarithmic frequency shift.
pub fn min_lorentz_factor(s: fsc) -> fsc {
    fsc::cosh(0.5 * s)
}

/// Computes the smallest electron rapidity `atanh(beta)` that can produce the
/// given logarithmic frequency shift.
pub fn min_rapidity(s: fsc) -> fsc {
    0.5 * fsc::abs(s)
}

/// Computes the range of direction cosines for which an electron with speed
/// `beta` shifts a photon by the logarithmic amount `s`.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains the scattering limits, with `-1 <= mu1 <= mu2 <= 1`.
/// - `Err`: Contains an error if `beta` is not in `[0, 1)` or the shift is
///   not accessible for the given speed.
pub fn scattering_limits(s: fsc, beta: fsc) -> SzResult<ScatteringLimits> {
    if !(beta.is_finite() && (0.0..1.0).contains(&beta)) {
        return Err(SzError::InvalidSpeed(beta));
    }
    if !s.is_finite() {
        return Err(SzError::Domain(format!(
            "Frequency shift must be finite, got {}",
            s
        )));
    }
    if beta == 0.0 {
        return if s == 0.0 {
            Ok(ScatteringLimits::FULL)
        } else {
            Err(SzError::InaccessibleShift { shift: s, beta })
        };
    }
    if fsc::abs(s) > max_shift(beta) {
        return Err(SzError::InaccessibleShift { shift: s, beta });
    }

    let exp_neg_s = fsc::exp(-s);
    let one_minus_exp_neg_s = -fsc::exp_m1(-s);

    let limits = if s >= 0.0 {
        ScatteringLimits {
            mu1: one_minus_exp_neg_s / beta - exp_neg_s,
            mu2: 1.0,
        }
    } else {
        ScatteringLimits {
            mu1: -1.0,
            mu2: one_minus_exp_neg_s / beta + exp_neg_s,
        }
    };
    Ok(ScatteringLimits {
        mu1: limits.mu1.clamp(-1.0, 1.0),
        mu2: limits.mu2.clamp(-1.0, 1.0),
    })
}
