//! The cosmic microwave background.

use super::fsg;
use crate::constants::{CLIGHT, HPLANCK, KBOLTZMANN, T_CMB};
use ndarray::Array1;

/// Computes the dimensionless frequency `x = h*nu/(k_B*T_CMB)` for the given
/// frequency [Hz].
pub fn dimensionless_frequency(frequency: fsg) -> fsg {
    HPLANCK * frequency / (KBOLTZMANN * T_CMB)
}

/// Computes the specific intensity [W/(m^2 Hz sr)] of the CMB blackbody at
/// the given frequency [Hz].
pub fn cmb_intensity(frequency: fsg) -> fsg {
    if frequency <= 0.0 {
        return 0.0;
    }
    2.0 * HPLANCK * frequency * frequency * frequency
        / (CLIGHT * CLIGHT * fsg::exp_m1(dimensionless_frequency(frequency)))
}

/// Computes the CMB specific intensity [W/(m^2 Hz sr)] at each of the given
/// frequencies [Hz].
pub fn cmb_intensities(frequencies: &[fsg]) -> Array1<fsg> {
    frequencies.iter().map(|&frequency| cmb_intensity(frequency)).collect()
}
