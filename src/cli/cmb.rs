//! Command line interface for computing the CMB spectrum.

use crate::{
    cli::utils,
    constants::GHZ_TO_HZ,
    signal::background::cmb_intensities,
    units::{intensity_to_brightness_temperature, si_to_jansky_per_steradian},
};
use clap::{Arg, ArgMatches, Command};

/// Builds a representation of the `cmb` command line subcommand.
pub fn create_cmb_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    let command_name = "cmb";

    let command = Command::new(command_name)
        .about("Compute the specific intensity of the cosmic microwave background")
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
            Arg::new("unit")
                .short('u')
                .long("unit")
                .require_equals(true)
                .value_name("UNIT")
                .help(
                    "Unit of the output intensity\n\
                     (si: W/(m^2 Hz sr), jy: Jy/sr, k_b: brightness temperature in K)",
                )
                .takes_value(true)
                .possible_values(&["si", "jy", "k_b"])
                .default_value("si"),
        );
    utils::add_output_arguments(command)
}

/// Runs the actions for the `cmb` subcommand using the given arguments.
pub fn run_cmb_subcommand(arguments: &ArgMatches) {
    let frequencies_ghz = utils::parse_sample_values(arguments, "frequency-range", "n-frequencies");
    let frequencies = &frequencies_ghz * GHZ_TO_HZ;
    let mut intensities = cmb_intensities(frequencies.as_slice().expect("Contiguous array"));

    match arguments
        .value_of("unit")
        .expect("No value for argument with default")
    {
        "jy" => intensities.mapv_inplace(si_to_jansky_per_steradian),
        "k_b" => intensities
            .iter_mut()
            .zip(frequencies.iter())
            .for_each(|(intensity, &frequency)| {
                *intensity = intensity_to_brightness_temperature(*intensity, frequency)
            }),
        _ => {}
    }

    utils::write_columns_to_output(
        arguments,
        &["frequency", "intensity"],
        &[
            frequencies_ghz.as_slice().expect("Contiguous array"),
            intensities.as_slice().expect("Contiguous array"),
        ],
    );
}
