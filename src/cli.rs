//! Command line interface.

pub mod build;
pub mod cmb;
pub mod completions;
pub mod distribution;
pub mod kernel;
pub mod map;
pub mod run;
pub mod signal;
pub mod utils;
