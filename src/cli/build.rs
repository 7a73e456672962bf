//! Function for building the command line hierarchy.

use super::{
    cmb::create_cmb_subcommand, completions::create_completions_subcommand,
    distribution::create_distribution_subcommand, kernel::create_kernel_subcommand,
    map::create_map_subcommand, signal::create_signal_subcommand,
};
use clap::{self, Arg, Command};

/// Build the `mocksz` command line hierarchy.
pub fn build() -> Command<'static> {
    let command_name = clap::crate_name!();
    Command::new(command_name)
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about(clap::crate_description!())
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("timing")
                .short('t')
                .long("timing")
                .help("Display elapsed time when done"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .help("Print status messages and diagnostics from the integrators"),
        )
        .subcommand(create_cmb_subcommand(command_name))
        .subcommand(create_distribution_subcommand(command_name))
        .subcommand(create_kernel_subcommand(command_name))
        .subcommand(create_signal_subcommand(command_name))
        .subcommand(create_map_subcommand(command_name))
        .subcommand(create_completions_subcommand(command_name))
}
