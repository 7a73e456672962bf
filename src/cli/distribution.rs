//! Command line interface for evaluating electron distributions.

use crate::{
    cli::utils,
    distribution::{
        fel, maxwell_juttner::MaxwellJuttnerDistribution, power_law::PowerLawDistribution,
        SpeedDistribution,
    },
    exit_on_error, exit_on_false,
};
use clap::{Arg, ArgMatches, Command};

/// Builds a representation of the `distribution` command line subcommand.
pub fn create_distribution_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    let command_name = "distribution";

    Command::new(command_name)
        .about("Evaluate an electron distribution")
        .subcommand_required(true)
        .subcommand(create_maxwell_juttner_subcommand(command_name))
        .subcommand(create_power_law_subcommand(command_name))
}

fn create_maxwell_juttner_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    let command = Command::new("maxwell_juttner")
        .about("Evaluate the relativistic thermal distribution over electron speed")
        .arg(
            Arg::new("temperature")
                .short('T')
                .long("temperature")
                .require_equals(true)
                .value_name("KEV")
                .help("Electron temperature [keV]")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("n-betas")
                .short('n')
                .long("n-betas")
                .require_equals(true)
                .value_name("NUMBER")
                .help("Number of evenly spaced speeds in [0, 1)")
                .takes_value(true)
                .default_value("100"),
        );
    utils::add_output_arguments(command)
}

fn create_power_law_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    let command = Command::new("power_law")
        .about("Evaluate the power-law distribution over Lorentz factor")
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
        )
        .arg(
            Arg::new("n-gammas")
                .short('n')
                .long("n-gammas")
                .require_equals(true)
                .value_name("NUMBER")
                .help("Number of logarithmically spaced Lorentz factors between the cut-offs")
                .takes_value(true)
                .default_value("100"),
        );
    utils::add_output_arguments(command)
}

/// Runs the actions for the `distribution` subcommand using the given arguments.
pub fn run_distribution_subcommand(arguments: &ArgMatches) {
    if let Some(maxwell_juttner_arguments) = arguments.subcommand_matches("maxwell_juttner") {
        run_maxwell_juttner_subcommand(maxwell_juttner_arguments);
    }
    if let Some(power_law_arguments) = arguments.subcommand_matches("power_law") {
        run_power_law_subcommand(power_law_arguments);
    }
}

fn run_maxwell_juttner_subcommand(arguments: &ArgMatches) {
    let temperature: fel =
        utils::get_finite_float_value_from_required_parseable_argument(arguments, "temperature");
    let n_betas: usize = utils::get_value_from_required_parseable_argument(arguments, "n-betas");
    exit_on_false!(n_betas > 0, "Error: n-betas must be larger than zero");

    let distribution = exit_on_error!(
        MaxwellJuttnerDistribution::new(temperature),
        "Error: Could not create thermal distribution: {}"
    );
    let betas: Vec<fel> = (0..n_betas)
        .map(|idx| idx as fel / n_betas as fel)
        .collect();
    let densities = distribution.evaluate_all(&betas);

    utils::write_columns_to_output(arguments, &["beta", "density"], &[&betas, &densities]);
}

fn run_power_law_subcommand(arguments: &ArgMatches) {
    let alpha: fel = utils::get_finite_float_value_from_required_parseable_argument(arguments, "alpha");
    let (gamma_min, gamma_max) =
        utils::parse_limits::<fel>(arguments, "gamma-range", utils::AllowSameValue::No);
    let n_gammas: usize = utils::get_value_from_required_parseable_argument(arguments, "n-gammas");
    exit_on_false!(n_gammas > 1, "Error: n-gammas must be larger than one");

    let distribution = exit_on_error!(
        PowerLawDistribution::new(gamma_min, gamma_max, alpha),
        "Error: Could not create power-law distribution: {}"
    );
    let log_step = fel::ln(gamma_max / gamma_min) / (n_gammas - 1) as fel;
    let gammas: Vec<fel> = (0..n_gammas)
        .map(|idx| {
            if idx + 1 == n_gammas {
                gamma_max
            } else {
                gamma_min * fel::exp(log_step * idx as fel)
            }
        })
        .collect();
    let densities: Vec<fel> = gammas
        .iter()
        .map(|&gamma| distribution.evaluate_gamma(gamma))
        .collect();

    utils::write_columns_to_output(arguments, &["gamma", "density"], &[&gammas, &densities]);
}
