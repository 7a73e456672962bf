//! The `mocksz` crate generates mock Sunyaev-Zel'dovich signals from
//! relativistic Compton scattering kernels.

pub mod constants;
pub mod distribution;
pub mod error;
pub mod io;
pub mod kernel;
pub mod kinematics;
pub mod math;
pub mod model;
pub mod signal;
pub mod units;

#[cfg(feature = "cli")]
pub mod cli;
