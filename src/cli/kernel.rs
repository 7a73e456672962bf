//! Command line interface for evaluating photon redistribution kernels.

use crate::{
    cli::utils,
    exit_on_error, exit_on_false,
    kernel::{
        fkr,
        multiple::MultipleScatteringKernel,
        thomson::single_scattering_all,
        KernelValue,
    },
    kinematics,
};
use clap::{Arg, ArgMatches, Command};
use ndarray::Array1;

/// Builds a representation of the `kernel` command line subcommand.
pub fn create_kernel_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    let command_name = "kernel";

    Command::new(command_name)
        .about("Evaluate the probability distribution of logarithmic frequency shifts")
        .long_about(
            "Evaluate the probability distribution of logarithmic frequency shifts\n\
             s = ln(nu_out/nu_in) for photons scattering once off electrons.",
        )
        .subcommand_required(true)
        .subcommand(create_single_subcommand(command_name))
        .subcommand(create_thermal_subcommand(command_name))
        .subcommand(create_power_law_subcommand(command_name))
}

fn add_shift_arguments(command: Command<'static>) -> Command<'static> {
    let command = command
        .arg(
            Arg::new("shift-range")
                .short('s')
                .long("shift-range")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .allow_hyphen_values(true)
                .value_names(&["LOW", "HIGH"])
                .help("Lower and upper logarithmic frequency shift [default: all accessible shifts]")
                .takes_value(true)
                .number_of_values(2),
        )
        .arg(
            Arg::new("n-shifts")
                .short('n')
                .long("n-shifts")
                .require_equals(true)
                .value_name("NUMBER")
                .help("Number of evenly spaced shifts")
                .takes_value(true)
                .default_value("201"),
        );
    utils::add_output_arguments(utils::add_kernel_accuracy_arguments(command))
}

fn add_population_arguments(command: Command<'static>) -> Command<'static> {
    utils::add_tabulation_arguments(
        command
            .arg(
                Arg::new("progress")
                    .short('p')
                    .long("progress")
                    .help("Show progress bar for the kernel evaluations"),
            )
            .arg(
                Arg::new("table")
                    .long("table")
                    .help(
                        "Output the kernel at the adaptively chosen nodes of the table used\n\
                         for computing signals, instead of at evenly spaced shifts",
                    )
                    .conflicts_with_all(&["shift-range", "progress"]),
            ),
    )
}

fn create_single_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    add_shift_arguments(
        Command::new("single")
            .about("Evaluate the kernel for electrons with a single speed")
            .arg(
                Arg::new("beta")
                    .short('b')
                    .long("beta")
                    .require_equals(true)
                    .value_name("BETA")
                    .help("Electron speed in units of the speed of light")
                    .takes_value(true)
                    .required(true),
            ),
    )
}

fn create_thermal_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    add_population_arguments(add_shift_arguments(
        Command::new("thermal")
            .about("Evaluate the kernel for a thermal electron population")
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

fn create_power_law_subcommand(_parent_command_name: &'static str) -> Command<'static> {
    add_population_arguments(add_shift_arguments(
        Command::new("power_law")
            .about("Evaluate the kernel for a power-law electron population")
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

/// Runs the actions for the `kernel` subcommand using the given arguments.
pub fn run_kernel_subcommand(arguments: &ArgMatches) {
    if let Some(single_arguments) = arguments.subcommand_matches("single") {
        run_single_subcommand(single_arguments);
    }
    if let Some(thermal_arguments) = arguments.subcommand_matches("thermal") {
        let temperature =
            utils::get_finite_float_value_from_required_parseable_argument(thermal_arguments, "temperature");
        let kernel = exit_on_error!(
            MultipleScatteringKernel::thermal(
                temperature,
                utils::configure_kernel_from_arguments(thermal_arguments)
            ),
            "Error: Could not create thermal kernel: {}"
        );
        run_with_multiple_scattering_kernel(thermal_arguments, kernel);
    }
    if let Some(power_law_arguments) = arguments.subcommand_matches("power_law") {
        let alpha =
            utils::get_finite_float_value_from_required_parseable_argument(power_law_arguments, "alpha");
        let (gamma_min, gamma_max) = utils::parse_limits(
            power_law_arguments,
            "gamma-range",
            utils::AllowSameValue::No,
        );
        let kernel = exit_on_error!(
            MultipleScatteringKernel::power_law(
                gamma_min,
                gamma_max,
                alpha,
                utils::configure_kernel_from_arguments(power_law_arguments)
            ),
            "Error: Could not create power-law kernel: {}"
        );
        run_with_multiple_scattering_kernel(power_law_arguments, kernel);
    }
}

fn run_single_subcommand(arguments: &ArgMatches) {
    let beta: fkr = utils::get_finite_float_value_from_required_parseable_argument(arguments, "beta");
    exit_on_false!(
        beta > 0.0 && beta < 1.0,
        "Error: beta must be in the range (0, 1)"
    );
    let config = utils::configure_kernel_from_arguments(arguments);
    let shifts = shifts_from_arguments(arguments, kinematics::max_shift(beta));

    let values = exit_on_error!(
        single_scattering_all(
            shifts.as_slice().expect("Contiguous array"),
            beta,
            &config.mu_quadrature
        ),
        "Error: Could not evaluate kernel: {}"
    );
    write_kernel_values(arguments, &shifts.to_vec(), &values);
}

fn run_with_multiple_scattering_kernel(arguments: &ArgMatches, kernel: MultipleScatteringKernel) {
    let verbosity = utils::parse_verbosity(arguments, true);

    if arguments.is_present("table") {
        let table = kernel.tabulate(&utils::configure_romberg_from_arguments(arguments));
        if verbosity.print_messages() {
            println!(
                "Tabulated kernel for {} with {} evaluations, total probability {}",
                kernel.distribution(),
                table.n_evaluations(),
                table.total()
            );
        }
        let (shifts, values): (Vec<_>, Vec<_>) = table.sorted_nodes().into_iter().unzip();
        utils::write_columns_to_output(arguments, &["shift", "kernel"], &[&shifts, &values]);
    } else {
        let shifts = shifts_from_arguments(arguments, kernel.max_shift());
        if verbosity.print_messages() {
            println!(
                "Evaluating kernel for {} at {} shifts",
                kernel.distribution(),
                shifts.len()
            );
        }
        let values =
            kernel.evaluate_all(shifts.as_slice().expect("Contiguous array"), &verbosity);
        write_kernel_values(arguments, &shifts.to_vec(), &values);
    }
}

fn shifts_from_arguments(arguments: &ArgMatches, max_shift: fkr) -> Array1<fkr> {
    if arguments.is_present("shift-range") {
        utils::parse_sample_values(arguments, "shift-range", "n-shifts")
    } else {
        let n_shifts: usize = utils::get_value_from_required_parseable_argument(arguments, "n-shifts");
        exit_on_false!(n_shifts > 1, "Error: n-shifts must be larger than one");
        Array1::linspace(-max_shift, max_shift, n_shifts)
    }
}

fn write_kernel_values(arguments: &ArgMatches, shifts: &[fkr], values: &[KernelValue]) {
    let kernel_values: Vec<_> = values.iter().map(|value| value.value).collect();
    let converged: Vec<_> = values
        .iter()
        .map(|value| if value.converged { 1.0 } else { 0.0 })
        .collect();
    utils::write_columns_to_output(
        arguments,
        &["shift", "kernel", "converged"],
        &[shifts, &kernel_values, &converged],
    );
}
