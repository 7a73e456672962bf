//! Utilities for creating the command line interface.

use crate::{
    exit_on_error, exit_on_false, exit_with_error,
    io::{utils as io_utils, OverwriteMode, Verbosity},
    kernel::KernelConfig,
    math::{quadrature::QuadratureConfig, romberg::RombergConfig},
    signal::SignalConfig,
};
use clap::{Arg, ArgMatches, Command};
use indicatif::ProgressStyle;
use lazy_static::lazy_static;
use ndarray::Array1;
use num::Float;
use std::{
    fmt,
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

lazy_static! {
    static ref DEFAULT_PROGRESS_STYLE: ProgressStyle =
        ProgressStyle::default_bar().template("Progress: {bar:40}  {percent}% | ETA: {eta}");
}

pub fn parse_value_string<T>(argument_name: &str, value_string: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: fmt::Display,
{
    exit_on_error!(
        value_string.parse(),
        "Error: Could not parse value for {0}: {1}",
        argument_name
    )
}

fn parse_value_strings<'a, 'b, T, I>(argument_name: &'a str, value_strings: I) -> Vec<T>
where
    T: FromStr,
    <T as FromStr>::Err: fmt::Display,
    I: Iterator<Item = &'b str>,
{
    value_strings
        .filter_map(|value_string| {
            if value_string.is_empty() {
                None
            } else {
                Some(parse_value_string(argument_name, value_string))
            }
        })
        .collect()
}

fn verify_finite_float_value<F: Float>(argument_name: &str, value: F) {
    exit_on_false!(value.is_finite(), "Error: {} must be finite", argument_name);
}

fn verify_argument_value_count<T>(argument_name: &str, values: &[T], required_count: usize) {
    let count = values.len();
    exit_on_false!(
        count == required_count,
        "Error: {} must have {} values, got {}",
        argument_name,
        required_count,
        count
    );
}

pub fn get_value_from_required_parseable_argument<T>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> T
where
    T: FromStr,
    <T as FromStr>::Err: fmt::Display,
{
    parse_value_string(
        argument_name,
        arguments
            .value_of(argument_name)
            .expect("No value for required argument"),
    )
}

pub fn get_finite_float_value_from_required_parseable_argument<F>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> F
where
    F: Float + FromStr,
    <F as FromStr>::Err: fmt::Display,
{
    let value: F = get_value_from_required_parseable_argument(arguments, argument_name);
    verify_finite_float_value(argument_name, value);
    value
}

pub fn get_value_from_parseable_argument<T>(arguments: &ArgMatches, argument_name: &str) -> Option<T>
where
    T: FromStr,
    <T as FromStr>::Err: fmt::Display,
{
    arguments
        .value_of(argument_name)
        .map(|value_string| parse_value_string(argument_name, value_string))
}

pub fn get_finite_float_value_from_parseable_argument<F>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Option<F>
where
    F: Float + FromStr,
    <F as FromStr>::Err: fmt::Display,
{
    let value = get_value_from_parseable_argument(arguments, argument_name);
    if let Some(value) = value {
        verify_finite_float_value(argument_name, value);
    }
    value
}

pub fn get_values_from_required_parseable_argument<T>(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Vec<T>
where
    T: FromStr,
    <T as FromStr>::Err: fmt::Display,
{
    parse_value_strings(
        argument_name,
        arguments
            .values_of(argument_name)
            .expect("No values for required argument"),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllowSameValue {
    Yes,
    No,
}

pub fn parse_limits<F>(
    arguments: &ArgMatches,
    argument_name: &str,
    allow_same_value: AllowSameValue,
) -> (F, F)
where
    F: Float + FromStr + fmt::Display,
    <F as FromStr>::Err: fmt::Display,
{
    let limits: Vec<F> = get_values_from_required_parseable_argument(arguments, argument_name);

    verify_argument_value_count(argument_name, &limits, 2);

    let lower_limit = limits[0];
    let upper_limit = limits[1];

    exit_on_false!(
        lower_limit.is_finite() && upper_limit.is_finite(),
        "Error: {} must be finite",
        argument_name
    );

    match allow_same_value {
        AllowSameValue::Yes => exit_on_false!(
            upper_limit >= lower_limit,
            "Error: Second value in {} ({}) must be larger than or equal to first value ({})",
            argument_name,
            upper_limit,
            lower_limit
        ),
        AllowSameValue::No => exit_on_false!(
            upper_limit > lower_limit,
            "Error: Second value in {} ({}) must be larger than first value ({})",
            argument_name,
            upper_limit,
            lower_limit
        ),
    };
    (lower_limit, upper_limit)
}

/// Parses the given limits together with the given number of samples,
/// and returns the evenly spaced sample values.
pub fn parse_sample_values(
    arguments: &ArgMatches,
    limits_argument_name: &str,
    count_argument_name: &str,
) -> Array1<f64> {
    let n_values: usize = get_value_from_required_parseable_argument(arguments, count_argument_name);
    exit_on_false!(
        n_values > 0,
        "Error: {} must be larger than zero",
        count_argument_name
    );
    let (lower, upper) = parse_limits::<f64>(
        arguments,
        limits_argument_name,
        if n_values == 1 {
            AllowSameValue::Yes
        } else {
            AllowSameValue::No
        },
    );
    if n_values == 1 {
        Array1::from_elem(1, lower)
    } else {
        Array1::linspace(lower, upper, n_values)
    }
}

pub fn overwrite_mode_from_arguments(arguments: &ArgMatches) -> OverwriteMode {
    if arguments.is_present("overwrite") {
        OverwriteMode::Always
    } else if arguments.is_present("no-overwrite") {
        OverwriteMode::Never
    } else {
        OverwriteMode::Ask
    }
}

pub fn parse_verbosity(arguments: &ArgMatches, support_progress: bool) -> Verbosity {
    if support_progress && arguments.is_present("progress") {
        Verbosity::Progress(DEFAULT_PROGRESS_STYLE.clone())
    } else if arguments.is_present("verbose") {
        Verbosity::Messages
    } else {
        Verbosity::Quiet
    }
}

/// Adds the arguments for specifying where and how to write output.
pub fn add_output_arguments(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("output-file")
                .short('o')
                .long("output-file")
                .require_equals(true)
                .value_name("OUTPUT_FILE")
                .help(
                    "Path of the file where the output should be saved [default: print to stdout]\n\
                     Writes in the following format based on the file extension:\
                     \n    *.csv: Comma-separated columns with a header line\
                     \n    *.json: Creates a JSON file (requires the json feature)",
                )
                .takes_value(true),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .help("Automatically overwrite any existing files")
                .conflicts_with("no-overwrite"),
        )
        .arg(
            Arg::new("no-overwrite")
                .long("no-overwrite")
                .help("Do not overwrite any existing files")
                .conflicts_with("overwrite"),
        )
}

/// Adds the arguments for controlling the accuracy of the scattering kernel integrals.
pub fn add_kernel_accuracy_arguments(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("relative-tolerance")
                .long("relative-tolerance")
                .require_equals(true)
                .value_name("TOLERANCE")
                .help(
                    "Relative accuracy to aim for in all adaptive integrals\n\
                     [default: 1e-6 over directions, 1e-5 over electron speeds]",
                )
                .takes_value(true),
        )
        .arg(
            Arg::new("max-refinements")
                .long("max-refinements")
                .require_equals(true)
                .value_name("NUMBER")
                .help(
                    "Maximum number of interval halvings in each adaptive integral\n\
                     before giving up on convergence\n\
                     [default: 12 for the kernel integrals, 16 otherwise]",
                )
                .takes_value(true),
        )
}

/// Adds the arguments for controlling the tabulation of scattering kernels.
pub fn add_tabulation_arguments(command: Command<'static>) -> Command<'static> {
    command.arg(
        Arg::new("max-rows")
            .long("max-rows")
            .require_equals(true)
            .value_name("NUMBER")
            .help(
                "Maximum number of Romberg rows when tabulating the kernel over frequency shifts\n\
                 (the table holds at most 2^NUMBER + 1 kernel values)",
            )
            .takes_value(true)
            .default_value("14"),
    )
}

/// Overrides the quadrature configuration with any values given in the arguments.
pub fn configure_quadrature_from_arguments(arguments: &ArgMatches, config: &mut QuadratureConfig) {
    if let Some(relative_tolerance) =
        get_finite_float_value_from_parseable_argument::<f64>(arguments, "relative-tolerance")
    {
        exit_on_false!(
            relative_tolerance > 0.0,
            "Error: relative-tolerance must be larger than zero"
        );
        config.relative_tolerance = relative_tolerance;
    }
    if let Some(max_refinements) =
        get_value_from_parseable_argument::<u32>(arguments, "max-refinements")
    {
        exit_on_false!(
            max_refinements >= config.min_refinements
                && max_refinements <= QuadratureConfig::REFINEMENT_LIMIT,
            "Error: max-refinements must be in the range [{}, {}]",
            config.min_refinements,
            QuadratureConfig::REFINEMENT_LIMIT
        );
        config.max_refinements = max_refinements;
    }
}

/// Creates a kernel configuration from the accuracy arguments.
pub fn configure_kernel_from_arguments(arguments: &ArgMatches) -> KernelConfig {
    let mut config = KernelConfig::default();
    configure_quadrature_from_arguments(arguments, &mut config.mu_quadrature);
    configure_quadrature_from_arguments(arguments, &mut config.beta_quadrature);
    config
}

/// Creates a kernel tabulation configuration from the accuracy and tabulation arguments.
pub fn configure_romberg_from_arguments(arguments: &ArgMatches) -> RombergConfig {
    let mut config = RombergConfig::default();
    if let Some(relative_tolerance) =
        get_finite_float_value_from_parseable_argument::<f64>(arguments, "relative-tolerance")
    {
        config.relative_tolerance = relative_tolerance;
    }
    let max_rows: usize = get_value_from_required_parseable_argument(arguments, "max-rows");
    exit_on_false!(
        max_rows >= config.min_rows && max_rows <= 24,
        "Error: max-rows must be in the range [{}, 24]",
        config.min_rows
    );
    config.max_rows = max_rows;
    config
}

/// Creates a signal configuration from the accuracy, tabulation and
/// background arguments.
pub fn configure_signal_from_arguments(arguments: &ArgMatches) -> SignalConfig {
    let mut config = SignalConfig {
        kernel: configure_kernel_from_arguments(arguments),
        romberg: configure_romberg_from_arguments(arguments),
        include_cmb: arguments.is_present("include-cmb"),
        ..SignalConfig::default()
    };
    configure_quadrature_from_arguments(arguments, &mut config.kinematic_quadrature);
    config
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputType {
    Csv,
    #[cfg(feature = "json")]
    Json,
}

impl OutputType {
    pub fn from_path<P: AsRef<Path>>(file_path: P) -> Self {
        let file_path = file_path.as_ref();
        match file_path.extension().and_then(|extension| extension.to_str()) {
            Some("csv") | Some("txt") => Self::Csv,
            #[cfg(feature = "json")]
            Some("json") => Self::Json,
            _ => exit_with_error!(
                "Error: Unsupported output file extension in {}",
                file_path.display()
            ),
        }
    }
}

/// Returns the path of the output file, if one was specified.
pub fn output_file_path_from_arguments(arguments: &ArgMatches) -> Option<PathBuf> {
    arguments
        .value_of("output-file")
        .map(PathBuf::from)
}

/// Writes the given named columns to the output file specified in the
/// arguments, or to standard output if no file was specified.
pub fn write_columns_to_output(
    arguments: &ArgMatches,
    column_names: &[&str],
    columns: &[&[f64]],
) {
    let verbosity = parse_verbosity(arguments, false);
    match output_file_path_from_arguments(arguments) {
        Some(output_file_path) => {
            let overwrite_mode = overwrite_mode_from_arguments(arguments);
            if verbosity.print_messages() {
                println!("Saving output in {}", output_file_path.display());
            }
            let written = exit_on_error!(
                match OutputType::from_path(&output_file_path) {
                    OutputType::Csv => io_utils::write_columns_to_file(
                        &output_file_path,
                        column_names,
                        columns,
                        overwrite_mode
                    ),
                    #[cfg(feature = "json")]
                    OutputType::Json => io_utils::save_data_as_json(
                        &output_file_path,
                        &column_names
                            .iter()
                            .zip(columns.iter())
                            .collect::<std::collections::BTreeMap<_, _>>(),
                        overwrite_mode
                    ),
                },
                "Error: Could not save output data: {}"
            );
            if !written && verbosity.print_messages() {
                println!("Skipped writing {}", output_file_path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            exit_on_error!(
                io_utils::write_columns(&mut handle, column_names, columns)
                    .and_then(|_| handle.flush()),
                "Error: Could not write output: {}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal_command() -> Command<'static> {
        add_tabulation_arguments(add_kernel_accuracy_arguments(
            Command::new("signal")
                .no_binary_name(true)
                .arg(Arg::new("include-cmb").long("include-cmb")),
        ))
    }

    #[test]
    fn omitted_accuracy_arguments_keep_config_defaults() {
        let arguments = signal_command().try_get_matches_from(["--max-rows=10"]).unwrap();
        let config = configure_signal_from_arguments(&arguments);
        let defaults = SignalConfig::default();
        assert_eq!(
            config.kernel.mu_quadrature.max_refinements,
            defaults.kernel.mu_quadrature.max_refinements
        );
        assert_eq!(
            config.kinematic_quadrature.max_refinements,
            QuadratureConfig::DEFAULT_MAX_REFINEMENTS
        );
        assert_eq!(config.romberg.max_rows, 10);
        assert!(!config.include_cmb);
    }

    #[test]
    fn given_refinement_limit_applies_to_every_quadrature() {
        let arguments = signal_command()
            .try_get_matches_from(["--max-refinements=9", "--include-cmb"])
            .unwrap();
        let config = configure_signal_from_arguments(&arguments);
        assert_eq!(config.kernel.mu_quadrature.max_refinements, 9);
        assert_eq!(config.kernel.beta_quadrature.max_refinements, 9);
        assert_eq!(config.kinematic_quadrature.max_refinements, 9);
        assert!(config.include_cmb);
    }
}
