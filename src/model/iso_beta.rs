//! Isothermal-beta model of the cluster gas.

use super::{fmo, SampleLayout};
use crate::{
    constants::{PER_CM3_TO_PER_M3, PI, SIGMA_THOMSON},
    distribution::power_law::PowerLawDistribution,
    error::{SzError, SzResult},
    kernel::multiple::MultipleScatteringKernel,
    math,
    signal::{
        background::cmb_intensities,
        pointing::{ksz_signal, scattered_signal},
        validate_frequencies, SignalConfig,
    },
    units::{arcsec_to_radian, megaparsec_to_meter},
};
use ndarray::{Array1, ArrayD, ArrayView1, ArrayViewMut1, ArrayViewMut2, Axis, IxDyn, Zip};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Parameters of an isothermal-beta gas density profile
/// `n_e(r) = n_e0*(1 + (r/r_c)^2)^(-3*beta/2)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct IsoBetaParameters {
    /// Slope index of the profile.
    pub beta: fmo,
    /// Central electron number density [1/cm^3].
    pub central_density: fmo,
    /// Angular core radius [arcsec].
    pub core_radius: fmo,
    /// Angular diameter distance to the cluster [Mpc].
    pub angular_diameter_distance: fmo,
}

impl IsoBetaParameters {
    /// Checks that the parameters describe a profile with finite optical depth.
    pub fn validate(&self) -> SzResult<()> {
        if !(self.beta.is_finite() && self.beta > 1.0 / 3.0) {
            return Err(SzError::Domain(format!(
                "Isothermal-beta slope index must exceed 1/3 for a finite optical depth, got {}",
                self.beta
            )));
        }
        for (name, value) in [
            ("Central density", self.central_density),
            ("Core radius", self.core_radius),
            ("Angular diameter distance", self.angular_diameter_distance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SzError::Domain(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Computes the optical depth through the center of the cluster,
    /// `tau_0 = n_e0*sigma_T*r_c*sqrt(pi)*Gamma(3*beta/2 - 1/2)/Gamma(3*beta/2)`.
    pub fn central_optical_depth(&self) -> fmo {
        let core_radius = arcsec_to_radian(self.core_radius)
            * megaparsec_to_meter(self.angular_diameter_distance);
        self.central_density
            * PER_CM3_TO_PER_M3
            * SIGMA_THOMSON
            * core_radius
            * fmo::sqrt(PI)
            * math::gamma_ratio(1.5 * self.beta - 0.5, 1.5 * self.beta)
    }

    /// Computes the optical depth along the line of sight at the given
    /// angular offset [arcsec] from the cluster center.
    fn optical_depth(&self, central_optical_depth: fmo, offset: fmo) -> fmo {
        let scaled_offset = offset / self.core_radius;
        central_optical_depth * fmo::powf(1.0 + scaled_offset * scaled_offset, 0.5 - 1.5 * self.beta)
    }
}

/// Computes the line-of-sight optical depth of an isothermal-beta cluster at
/// the given azimuth and elevation offsets [arcsec] from its center.
///
/// The output has shape `(n_az, n_el)` for [`SampleLayout::Grid`] and one
/// value per sample pair for [`SampleLayout::Trace`].
pub fn iso_beta_optical_depths(
    azimuths: &[fmo],
    elevations: &[fmo],
    parameters: &IsoBetaParameters,
    layout: SampleLayout,
) -> SzResult<ArrayD<fmo>> {
    let shape = layout.output_shape(azimuths.len(), elevations.len())?;
    let mut optical_depths = ArrayD::zeros(IxDyn(&shape));
    let output = optical_depths.as_slice_mut().ok_or_else(|| {
        SzError::InvalidArgument("Optical depth array is not contiguous".to_string())
    })?;
    write_iso_beta_optical_depths(azimuths, elevations, parameters, layout, output)?;
    Ok(optical_depths)
}

/// Writes the line-of-sight optical depths of an isothermal-beta cluster
/// into the given buffer, in row-major order for [`SampleLayout::Grid`].
///
/// All inputs are validated before anything is written, so the buffer is
/// left untouched if an error is returned.
pub fn write_iso_beta_optical_depths(
    azimuths: &[fmo],
    elevations: &[fmo],
    parameters: &IsoBetaParameters,
    layout: SampleLayout,
    output: &mut [fmo],
) -> SzResult<()> {
    let shape = layout.output_shape(azimuths.len(), elevations.len())?;
    let n_values: usize = shape.iter().product();
    if output.len() != n_values {
        return Err(SzError::InvalidArgument(format!(
            "Output buffer has length {} but {} values are required",
            output.len(),
            n_values
        )));
    }
    parameters.validate()?;

    let central_optical_depth = parameters.central_optical_depth();
    let optical_depth_at =
        |az: fmo, el: fmo| parameters.optical_depth(central_optical_depth, fmo::hypot(az, el));

    match layout {
        SampleLayout::Grid => {
            let output = ArrayViewMut2::from_shape((shape[0], shape[1]), output)
                .map_err(|err| SzError::InvalidArgument(err.to_string()))?;
            Zip::indexed(output).par_for_each(|(i, j), tau| {
                *tau = optical_depth_at(azimuths[i], elevations[j]);
            });
        }
        SampleLayout::Trace => {
            Zip::from(ArrayViewMut1::from(output))
                .and(ArrayView1::from(azimuths))
                .and(ArrayView1::from(elevations))
                .par_for_each(|tau, &az, &el| {
                    *tau = optical_depth_at(az, el);
                });
        }
    }
    Ok(())
}

/// An isothermal cluster with an isothermal-beta gas profile and a bulk
/// peculiar velocity.
#[derive(Clone, Debug)]
pub struct IsoBetaModel {
    /// Electron temperature [keV].
    temperature: fmo,
    /// Line-of-sight peculiar velocity [km/s], positive when receding.
    velocity: fmo,
    parameters: IsoBetaParameters,
    config: SignalConfig,
}

impl IsoBetaModel {
    /// Creates a new cluster model.
    pub fn new(
        temperature: fmo,
        velocity: fmo,
        parameters: IsoBetaParameters,
        config: SignalConfig,
    ) -> SzResult<Self> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(SzError::NonPositiveTemperature(temperature));
        }
        parameters.validate()?;
        config.validate();
        Ok(Self {
            temperature,
            velocity,
            parameters,
            config,
        })
    }

    /// Returns the gas profile parameters.
    pub fn parameters(&self) -> &IsoBetaParameters {
        &self.parameters
    }

    /// Computes the optical depths at the given azimuth and elevation offsets [arcsec].
    pub fn optical_depths(
        &self,
        azimuths: &[fmo],
        elevations: &[fmo],
        layout: SampleLayout,
    ) -> SzResult<ArrayD<fmo>> {
        iso_beta_optical_depths(azimuths, elevations, &self.parameters, layout)
    }

    /// Computes the thermal SZ map, with the frequency [Hz] along the last axis.
    pub fn tsz_map(
        &self,
        azimuths: &[fmo],
        elevations: &[fmo],
        layout: SampleLayout,
        frequencies: &[fmo],
    ) -> SzResult<ArrayD<fmo>> {
        validate_frequencies(frequencies)?;
        let optical_depths = self.optical_depths(azimuths, elevations, layout)?;
        let kernel =
            MultipleScatteringKernel::thermal(self.temperature, self.config.kernel.clone())?;
        let table = kernel.tabulate(&self.config.romberg);
        let unit_spectrum = scattered_signal(&table, frequencies, 1.0, false);
        Ok(self.scale_spectrum(&optical_depths, &unit_spectrum, frequencies))
    }

    /// Computes the kinematic SZ map, with the frequency [Hz] along the last axis.
    pub fn ksz_map(
        &self,
        azimuths: &[fmo],
        elevations: &[fmo],
        layout: SampleLayout,
        frequencies: &[fmo],
    ) -> SzResult<ArrayD<fmo>> {
        let optical_depths = self.optical_depths(azimuths, elevations, layout)?;
        let unit_config = SignalConfig {
            include_cmb: false,
            ..self.config.clone()
        };
        let unit_spectrum = ksz_signal(frequencies, self.velocity, 1.0, &unit_config)?;
        Ok(self.scale_spectrum(&optical_depths, &unit_spectrum, frequencies))
    }

    /// Computes the non-thermal SZ map of a power-law electron population
    /// sharing the gas profile, with the frequency [Hz] along the last axis.
    pub fn ntsz_map(
        &self,
        azimuths: &[fmo],
        elevations: &[fmo],
        layout: SampleLayout,
        frequencies: &[fmo],
        power_law: &PowerLawDistribution,
    ) -> SzResult<ArrayD<fmo>> {
        validate_frequencies(frequencies)?;
        let optical_depths = self.optical_depths(azimuths, elevations, layout)?;
        let kernel =
            MultipleScatteringKernel::new(power_law.clone().into(), self.config.kernel.clone());
        let table = kernel.tabulate(&self.config.romberg);
        let unit_spectrum = scattered_signal(&table, frequencies, 1.0, false);
        Ok(self.scale_spectrum(&optical_depths, &unit_spectrum, frequencies))
    }

    /// Multiplies the spectrum for unit optical depth by the optical depth of
    /// each pixel, adding the CMB if configured.
    fn scale_spectrum(
        &self,
        optical_depths: &ArrayD<fmo>,
        unit_spectrum: &Array1<fmo>,
        frequencies: &[fmo],
    ) -> ArrayD<fmo> {
        let background = if self.config.include_cmb {
            cmb_intensities(frequencies)
        } else {
            Array1::zeros(frequencies.len())
        };
        let n_pixel_dims = optical_depths.ndim();
        let mut shape = optical_depths.shape().to_vec();
        shape.push(unit_spectrum.len());

        let mut map = ArrayD::zeros(IxDyn(&shape));
        Zip::from(map.lanes_mut(Axis(n_pixel_dims)))
            .and(optical_depths)
            .par_for_each(|mut spectrum, &tau| {
                Zip::from(&mut spectrum)
                    .and(&background)
                    .and(unit_spectrum)
                    .for_each(|value, &cmb, &unit| *value = cmb + tau * unit);
            });
        map
    }
}
