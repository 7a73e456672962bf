//! Command line interface for computing SZ spectra along a single line of sight.

use crate::{
    cli::utils,
    constants::GHZ_TO_HZ,
    exit_on_error, exit_on_false,
    signal::{
        fsg,
        pointing::{ksz_signal, ntsz_signal, tsz_signal},
        KinematicApproximation, SignalConfig,
    },
    units::{intensity_to_cmb_temperature_change, si_to_jansky_per_steradian},
};
use clap::{Arg, ArgMatches, Command};
use ndarray::Array1;

/// Builds a representation of the `signal` command line subcommand.
pub fn create_signal_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    let command_name = "signal";

    Command::new(command_name)
        .about("Compute the SZ distortion of the CMB spectrum along a line of sight")
        .subcommand_required(true)
        .subcommand(create_tsz_subcommand(command_name))
        .subcommand(create_ksz_subcommand(command_name))
        .subcommand(create_ntsz_subcommand(command_name))
}

/// Adds the arguments for the observed frequencies and output units.
pub fn add_spectrum_arguments(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("frequency-range")
                .short('f')
                .long("frequency-range")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .value_names(&["LOW", "HIGH"])
                .help("Lower and upper frequency [GHz]")
                .takes_value(true)
                .number_of_values(2)
                .required(true),
        )
        .arg(
            Arg::new("n-frequencies")
                .short('n')
                .long("n-frequencies")
                .require_equals(true)
                .value_name("NUMBER")
                .help("Number of evenly spaced frequencies")
                .takes_value(true)
                .default_value("100"),
        )
        .arg(
            Arg::new("include-cmb")
                .long("include-cmb")
                .help("Add the unscattered CMB to the distortion"),
        )
        .arg(
            Arg::new("unit")
                .short('u')
                .long("unit")
                .require_equals(true)
                .value_name("UNIT")
                .help(
                    "Unit of the output intensity\n\
                     (si: W/(m^2 Hz sr), jy: Jy/sr, k_cmb: CMB temperature change in K)",
                )
                .takes_value(true)
                .possible_values(&["si", "jy", "k_cmb"])
                .default_value("si"),
        )
}

fn add_signal_arguments(command: Command<'static>) -> Command<'static> {
    utils::add_output_arguments(utils::add_kernel_accuracy_arguments(add_spectrum_arguments(
        command.arg(
            Arg::new("optical-depth")
                .long("optical-depth")
                .require_equals(true)
                .value_name("TAU")
                .help("Optical depth of the electrons along the line of sight")
                .takes_value(true)
                .required(true),
        ),
    )))
}

fn create_tsz_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    utils::add_tabulation_arguments(add_signal_arguments(
        Command::new("tsz")
            .about("Compute the thermal SZ distortion")
            .arg(
                Arg::new("temperature")
                    .short('T')
                    .long("temperature")
                    .require_equals(true)
                    .value_name("KEV")
                    .help("Electron temperature [keV]")
                    .takes_value(true)
                    .required(true),
            ),
    ))
}

fn create_ksz_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    add_signal_arguments(
        Command::new("ksz")
            .about("Compute the kinematic SZ distortion")
            .arg(
                Arg::new("velocity")
                    .long("velocity")
                    .require_equals(true)
                    .allow_hyphen_values(true)
                    .value_name("KM_PER_S")
                    .help("Line-of-sight peculiar velocity [km/s], positive when receding")
                    .takes_value(true)
                    .required(true),
            )
            .arg(
                Arg::new("approximation")
                    .long("approximation")
                    .require_equals(true)
                    .value_name("NAME")
                    .help("Treatment of the Doppler shift")
                    .takes_value(true)
                    .possible_values(&["first_order", "angular"])
                    .default_value("first_order"),
            ),
    )
}

fn create_ntsz_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    utils::add_tabulation_arguments(add_signal_arguments(
        Command::new("ntsz")
            .about("Compute the non-thermal SZ distortion of a power-law electron population")
            .arg(
                Arg::new("alpha")
                    .short('a')
                    .long("alpha")
                    .require_equals(true)
                    .allow_hyphen_values(true)
                    .value_name("EXPONENT")
                    .help("Power-law exponent of the distribution")
                    .takes_value(true)
                    .required(true),
            )
            .arg(
                Arg::new("gamma-range")
                    .short('g')
                    .long("gamma-range")
                    .require_equals(true)
                    .use_value_delimiter(true)
                    .require_value_delimiter(true)
                    .value_names(&["MIN", "MAX"])
                    .help("Lower and upper Lorentz factor cut-off")
                    .takes_value(true)
                    .number_of_values(2)
                    .required(true),
            ),
    ))
}

/// Runs the actions for the `signal` subcommand using the given arguments.
pub fn run_signal_subcommand(arguments: &ArgMatches) {
    if let Some(tsz_arguments) = arguments.subcommand_matches("tsz") {
        let temperature: fsg =
            utils::get_finite_float_value_from_required_parseable_argument(tsz_arguments, "temperature");
        let config = utils::configure_signal_from_arguments(tsz_arguments);
        run_with_signal_computer(tsz_arguments, |frequencies, optical_depth| {
            tsz_signal(frequencies, temperature, optical_depth, &config)
        });
    }
    if let Some(ksz_arguments) = arguments.subcommand_matches("ksz") {
        let velocity: fsg =
            utils::get_finite_float_value_from_required_parseable_argument(ksz_arguments, "velocity");
        let mut config = SignalConfig {
            kinematic_approximation: utils::get_value_from_required_parseable_argument::<
                KinematicApproximation,
            >(ksz_arguments, "approximation"),
            include_cmb: ksz_arguments.is_present("include-cmb"),
            ..SignalConfig::default()
        };
        utils::configure_quadrature_from_arguments(ksz_arguments, &mut config.kinematic_quadrature);
        run_with_signal_computer(ksz_arguments, |frequencies, optical_depth| {
            ksz_signal(frequencies, velocity, optical_depth, &config)
        });
    }
    if let Some(ntsz_arguments) = arguments.subcommand_matches("ntsz") {
        let alpha: fsg =
            utils::get_finite_float_value_from_required_parseable_argument(ntsz_arguments, "alpha");
        let (gamma_min, gamma_max) =
            utils::parse_limits(ntsz_arguments, "gamma-range", utils::AllowSameValue::No);
        let config = utils::configure_signal_from_arguments(ntsz_arguments);
        run_with_signal_computer(ntsz_arguments, |frequencies, optical_depth| {
            ntsz_signal(frequencies, gamma_min, gamma_max, alpha, optical_depth, &config)
        });
    }
}

fn run_with_signal_computer<C, E>(arguments: &ArgMatches, compute_signal: C)
where
    C: Fn(&[fsg], fsg) -> Result<Array1<fsg>, E>,
    E: std::fmt::Display,
{
    let frequencies_ghz = utils::parse_sample_values(arguments, "frequency-range", "n-frequencies");
    exit_on_false!(
        frequencies_ghz.iter().all(|&frequency| frequency > 0.0),
        "Error: Frequencies must be larger than zero"
    );
    let frequencies = &frequencies_ghz * GHZ_TO_HZ;

    let optical_depth: fsg =
        utils::get_finite_float_value_from_required_parseable_argument(arguments, "optical-depth");
    let unit = intensity_unit_from_arguments(arguments);

    let verbosity = utils::parse_verbosity(arguments, false);
    if verbosity.print_messages() {
        println!("Computing signal at {} frequencies", frequencies.len());
    }

    let frequencies = frequencies.as_slice().expect("Contiguous array");
    let mut intensities = exit_on_error!(
        compute_signal(frequencies, optical_depth),
        "Error: Could not compute signal: {}"
    );
    intensities
        .iter_mut()
        .zip(frequencies.iter())
        .for_each(|(intensity, &frequency)| {
            *intensity = convert_intensity(unit, *intensity, frequency)
        });

    utils::write_columns_to_output(
        arguments,
        &["frequency", "intensity"],
        &[
            frequencies_ghz.as_slice().expect("Contiguous array"),
            intensities.as_slice().expect("Contiguous array"),
        ],
    );
}

/// Returns the name of the output intensity unit specified in the arguments.
pub fn intensity_unit_from_arguments(arguments: &ArgMatches) -> &str {
    let unit = arguments
        .value_of("unit")
        .expect("No value for argument with default");
    exit_on_false!(
        !(unit == "k_cmb" && arguments.is_present("include-cmb")),
        "Error: Unit k_cmb can only be used for distortions without the CMB"
    );
    unit
}

/// Converts the given intensity [W/(m^2 Hz sr)] at the given frequency [Hz]
/// to the given unit.
pub fn convert_intensity(unit: &str, intensity: fsg, frequency: fsg) -> fsg {
    match unit {
        "jy" => si_to_jansky_per_steradian(intensity),
        "k_cmb" => intensity_to_cmb_temperature_change(intensity, frequency),
        _ => intensity,
    }
}
