//! Function for running the command line program.

use super::{
    build, cmb::run_cmb_subcommand, completions::run_completions_subcommand,
    distribution::run_distribution_subcommand, kernel::run_kernel_subcommand,
    map::run_map_subcommand, signal::run_signal_subcommand,
};
use clap::ArgMatches;
use std::{io, time::Instant};
use tracing::Level;

/// Runs the `mocksz` command line program.
pub fn run() {
    run_with_args(build::build().get_matches())
}

/// Runs the `mocksz` command line program with the given parsed arguments.
pub fn run_with_args(arguments: ArgMatches) {
    initialize_logging(arguments.is_present("verbose"));

    let start_instant = Instant::now();

    if let Some(cmb_arguments) = arguments.subcommand_matches("cmb") {
        run_cmb_subcommand(cmb_arguments);
    }
    if let Some(distribution_arguments) = arguments.subcommand_matches("distribution") {
        run_distribution_subcommand(distribution_arguments);
    }
    if let Some(kernel_arguments) = arguments.subcommand_matches("kernel") {
        run_kernel_subcommand(kernel_arguments);
    }
    if let Some(signal_arguments) = arguments.subcommand_matches("signal") {
        run_signal_subcommand(signal_arguments);
    }
    if let Some(map_arguments) = arguments.subcommand_matches("map") {
        run_map_subcommand(map_arguments);
    }
    if let Some(completions_arguments) = arguments.subcommand_matches("completions") {
        run_completions_subcommand(completions_arguments);
    }

    if arguments.is_present("timing") {
        println!("Elapsed time: {} s", start_instant.elapsed().as_secs_f64());
    }
}

/// Installs a subscriber printing library diagnostics to stderr. Only the
/// first call has an effect.
fn initialize_logging(verbose: bool) {
    let max_level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
