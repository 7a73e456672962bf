//! Command line interface for computing SZ maps of isothermal-beta clusters.

use super::signal::{add_spectrum_arguments, convert_intensity, intensity_unit_from_arguments};
use crate::{
    cli::utils,
    constants::GHZ_TO_HZ,
    distribution::power_law::PowerLawDistribution,
    exit_on_error, exit_on_false, exit_on_none, exit_with_error,
    model::{
        fmo,
        iso_beta::{IsoBetaModel, IsoBetaParameters},
        SampleLayout,
    },
};
use clap::{Arg, ArgMatches, Command};
use ndarray::{Array1, ArrayD, Axis, Dimension};

#[cfg(feature = "json")]
use serde::Serialize;

/// Builds a representation of the `map` command line subcommand.
pub fn create_map_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    let command_name = "map";

    let command = Command::new(command_name)
        .about("Compute SZ maps of an isothermal cluster with an isothermal-beta gas profile")
        .long_about(
            "Compute SZ maps of an isothermal cluster with an isothermal-beta gas profile.\n\
             Offsets are sampled evenly over the given azimuth and elevation ranges, either\n\
             on a grid of every combination or along a trace pairing them element by element.",
        )
        .arg(
            Arg::new("az-range")
                .long("az-range")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .allow_hyphen_values(true)
                .value_names(&["LOW", "HIGH"])
                .help("Lower and upper azimuth offset from the cluster center [arcsec]")
                .takes_value(true)
                .number_of_values(2)
                .required(true),
        )
        .arg(
            Arg::new("el-range")
                .long("el-range")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .allow_hyphen_values(true)
                .value_names(&["LOW", "HIGH"])
                .help("Lower and upper elevation offset from the cluster center [arcsec]")
                .takes_value(true)
                .number_of_values(2)
                .required(true),
        )
        .arg(
            Arg::new("shape")
                .short('s')
                .long("shape")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .value_names(&["N_AZ", "N_EL"])
                .help("Number of azimuth and elevation samples")
                .takes_value(true)
                .number_of_values(2)
                .required(true),
        )
        .arg(
            Arg::new("layout")
                .long("layout")
                .require_equals(true)
                .value_name("LAYOUT")
                .help("Arrangement of the samples (trace requires equal sample numbers)")
                .takes_value(true)
                .possible_values(&["grid", "trace"])
                .default_value("grid"),
        )
        .arg(
            Arg::new("quantity")
                .short('q')
                .long("quantity")
                .require_equals(true)
                .value_name("NAME")
                .help("Quantity to map")
                .takes_value(true)
                .possible_values(&["tsz", "ksz", "ntsz", "optical_depth"])
                .default_value("tsz"),
        )
        .arg(
            Arg::new("beta")
                .short('b')
                .long("beta")
                .require_equals(true)
                .value_name("VALUE")
                .help("Slope index of the isothermal-beta profile")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("central-density")
                .long("central-density")
                .require_equals(true)
                .value_name("VALUE")
                .help("Central electron number density [1/cm^3]")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("core-radius")
                .long("core-radius")
                .require_equals(true)
                .value_name("ARCSEC")
                .help("Angular core radius [arcsec]")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("distance")
                .long("distance")
                .require_equals(true)
                .value_name("MPC")
                .help("Angular diameter distance to the cluster [Mpc]")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("temperature")
                .short('T')
                .long("temperature")
                .require_equals(true)
                .value_name("KEV")
                .help("Electron temperature of the cluster [keV]")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("velocity")
                .long("velocity")
                .require_equals(true)
                .allow_hyphen_values(true)
                .value_name("KM_PER_S")
                .help("Line-of-sight peculiar velocity of the cluster [km/s], positive when receding")
                .takes_value(true)
                .default_value("0"),
        )
        .arg(
            Arg::new("alpha")
                .short('a')
                .long("alpha")
                .require_equals(true)
                .allow_hyphen_values(true)
                .value_name("EXPONENT")
                .help("Power-law exponent of the non-thermal electrons (required for ntsz)")
                .takes_value(true),
        )
        .arg(
            Arg::new("gamma-range")
                .short('g')
                .long("gamma-range")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .value_names(&["MIN", "MAX"])
                .help("Lorentz factor cut-offs of the non-thermal electrons (required for ntsz)")
                .takes_value(true)
                .number_of_values(2)
                .requires("alpha"),
        )
        .arg(
            Arg::new("approximation")
                .long("approximation")
                .require_equals(true)
                .value_name("NAME")
                .help("Treatment of the Doppler shift for ksz")
                .takes_value(true)
                .possible_values(&["first_order", "angular"])
                .default_value("first_order"),
        );

    // Optical depths need no frequencies
    let command = add_spectrum_arguments(command)
        .mut_arg("frequency-range", |arg| arg.required(false));

    utils::add_output_arguments(utils::add_tabulation_arguments(
        utils::add_kernel_accuracy_arguments(command),
    ))
}

/// Runs the actions for the `map` subcommand using the given arguments.
pub fn run_map_subcommand(arguments: &ArgMatches) {
    let (az_low, az_high) =
        utils::parse_limits::<fmo>(arguments, "az-range", utils::AllowSameValue::Yes);
    let (el_low, el_high) =
        utils::parse_limits::<fmo>(arguments, "el-range", utils::AllowSameValue::Yes);
    let shape: Vec<usize> = utils::get_values_from_required_parseable_argument(arguments, "shape");
    exit_on_false!(
        shape.len() == 2 && shape.iter().all(|&n| n > 0),
        "Error: shape must consist of two positive numbers"
    );
    let layout: SampleLayout = utils::get_value_from_required_parseable_argument(arguments, "layout");

    let azimuths = evenly_spaced(az_low, az_high, shape[0]);
    let elevations = evenly_spaced(el_low, el_high, shape[1]);

    let parameters = IsoBetaParameters {
        beta: utils::get_finite_float_value_from_required_parseable_argument(arguments, "beta"),
        central_density: utils::get_finite_float_value_from_required_parseable_argument(
            arguments,
            "central-density",
        ),
        core_radius: utils::get_finite_float_value_from_required_parseable_argument(
            arguments,
            "core-radius",
        ),
        angular_diameter_distance: utils::get_finite_float_value_from_required_parseable_argument(
            arguments, "distance",
        ),
    };
    let temperature: fmo =
        utils::get_finite_float_value_from_required_parseable_argument(arguments, "temperature");
    let velocity: fmo =
        utils::get_finite_float_value_from_required_parseable_argument(arguments, "velocity");

    let mut config = utils::configure_signal_from_arguments(arguments);
    config.kinematic_approximation =
        utils::get_value_from_required_parseable_argument(arguments, "approximation");

    let model = exit_on_error!(
        IsoBetaModel::new(temperature, velocity, parameters, config),
        "Error: Invalid cluster model: {}"
    );

    let verbosity = utils::parse_verbosity(arguments, false);
    if verbosity.print_messages() {
        println!(
            "Central optical depth of cluster: {:e}",
            model.parameters().central_optical_depth()
        );
    }

    let quantity = arguments
        .value_of("quantity")
        .expect("No value for argument with default");

    if quantity == "optical_depth" {
        let optical_depths = exit_on_error!(
            model.optical_depths(&azimuths, &elevations, layout),
            "Error: Could not compute optical depths: {}"
        );
        write_map_to_output(arguments, layout, &azimuths, &elevations, None, &optical_depths);
        return;
    }

    exit_on_false!(
        arguments.is_present("frequency-range"),
        "Error: frequency-range is required for {}",
        quantity
    );
    let unit = intensity_unit_from_arguments(arguments);
    let frequencies_ghz = utils::parse_sample_values(arguments, "frequency-range", "n-frequencies");
    let frequencies = (&frequencies_ghz * GHZ_TO_HZ).to_vec();

    let mut map = exit_on_error!(
        match quantity {
            "tsz" => model.tsz_map(&azimuths, &elevations, layout, &frequencies),
            "ksz" => model.ksz_map(&azimuths, &elevations, layout, &frequencies),
            "ntsz" => {
                let alpha = exit_on_none!(
                    utils::get_finite_float_value_from_parseable_argument(arguments, "alpha"),
                    "Error: alpha is required for ntsz"
                );
                exit_on_false!(
                    arguments.is_present("gamma-range"),
                    "Error: gamma-range is required for ntsz"
                );
                let (gamma_min, gamma_max) =
                    utils::parse_limits(arguments, "gamma-range", utils::AllowSameValue::No);
                let power_law = exit_on_error!(
                    PowerLawDistribution::new(gamma_min, gamma_max, alpha),
                    "Error: Could not create power-law distribution: {}"
                );
                model.ntsz_map(&azimuths, &elevations, layout, &frequencies, &power_law)
            }
            _ => exit_with_error!("Error: Unknown quantity {}", quantity),
        },
        "Error: Could not compute map: {}"
    );

    let frequency_axis = Axis(map.ndim() - 1);
    for mut spectrum in map.lanes_mut(frequency_axis) {
        spectrum
            .iter_mut()
            .zip(frequencies.iter())
            .for_each(|(value, &frequency)| *value = convert_intensity(unit, *value, frequency));
    }

    write_map_to_output(
        arguments,
        layout,
        &azimuths,
        &elevations,
        Some(frequencies_ghz.as_slice().expect("Contiguous array")),
        &map,
    );
}

fn evenly_spaced(lower: fmo, upper: fmo, n_values: usize) -> Vec<fmo> {
    if n_values == 1 {
        vec![0.5 * (lower + upper)]
    } else {
        Array1::linspace(lower, upper, n_values).to_vec()
    }
}

#[cfg(feature = "json")]
#[derive(Serialize)]
struct MapOutput<'a> {
    layout: String,
    azimuths: &'a [fmo],
    elevations: &'a [fmo],
    frequencies: Option<&'a [fmo]>,
    values: &'a ArrayD<fmo>,
}

fn write_map_to_output(
    arguments: &ArgMatches,
    layout: SampleLayout,
    azimuths: &[fmo],
    elevations: &[fmo],
    frequencies: Option<&[fmo]>,
    values: &ArrayD<fmo>,
) {
    #[cfg(feature = "json")]
    if let Some(output_file_path) = utils::output_file_path_from_arguments(arguments) {
        if utils::OutputType::from_path(&output_file_path) == utils::OutputType::Json {
            exit_on_error!(
                crate::io::utils::save_data_as_json(
                    &output_file_path,
                    &MapOutput {
                        layout: layout.to_string(),
                        azimuths,
                        elevations,
                        frequencies,
                        values,
                    },
                    utils::overwrite_mode_from_arguments(arguments),
                ),
                "Error: Could not save output data: {}"
            );
            return;
        }
    }

    let n_pixel_dims = match frequencies {
        Some(_) => values.ndim() - 1,
        None => values.ndim(),
    };
    let mut az_column = Vec::with_capacity(values.len());
    let mut el_column = Vec::with_capacity(values.len());
    let mut frequency_column = Vec::with_capacity(values.len());
    let mut value_column = Vec::with_capacity(values.len());

    for (idx, &value) in values.indexed_iter() {
        let idx = idx.slice();
        let (az_idx, el_idx) = match layout {
            SampleLayout::Grid => (idx[0], idx[1]),
            SampleLayout::Trace => (idx[0], idx[0]),
        };
        az_column.push(azimuths[az_idx]);
        el_column.push(elevations[el_idx]);
        if let Some(frequencies) = frequencies {
            frequency_column.push(frequencies[idx[n_pixel_dims]]);
        }
        value_column.push(value);
    }

    if frequencies.is_some() {
        utils::write_columns_to_output(
            arguments,
            &["azimuth", "elevation", "frequency", "intensity"],
            &[&az_column, &el_column, &frequency_column, &value_column],
        );
    } else {
        utils::write_columns_to_output(
            arguments,
            &["azimuth", "elevation", "optical_depth"],
            &[&az_column, &el_column, &value_column],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUSTER: [&str; 5] = [
        "--beta=0.7",
        "--central-density=1e-2",
        "--core-radius=30",
        "--distance=1000",
        "--temperature=5",
    ];

    #[test]
    fn optical_depth_map_needs_no_frequencies() {
        let arguments = create_map_subcommand("mocksz")
            .no_binary_name(true)
            .try_get_matches_from(
                [
                    "--quantity=optical_depth",
                    "--az-range=-10,10",
                    "--el-range=-10,10",
                    "--shape=2,2",
                ]
                .into_iter()
                .chain(CLUSTER),
            )
            .unwrap();
        assert!(!arguments.is_present("frequency-range"));
        assert_eq!(arguments.value_of("quantity"), Some("optical_depth"));
    }

    #[test]
    fn single_sample_is_range_midpoint() {
        assert_eq!(evenly_spaced(10.0, 30.0, 1), vec![20.0]);
        assert_eq!(evenly_spaced(-60.0, 60.0, 3), vec![-60.0, 0.0, 60.0]);
    }
}
