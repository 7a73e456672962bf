//! Output of computed spectra, kernels and maps.

pub mod utils;

use indicatif::{ProgressBar, ProgressStyle};

/// How much non-critical information to print while computing.
#[derive(Clone, Debug)]
pub enum Verbosity {
    Quiet,
    Messages,
    Progress(ProgressStyle),
}

impl Verbosity {
    /// Whether status messages should be printed.
    pub fn print_messages(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Creates a progress bar for the given number of work items, which is
    /// hidden unless progress should be shown.
    pub fn create_progress_bar(&self, n_items: usize) -> ProgressBar {
        match self {
            Self::Progress(style) => {
                let progress_bar = ProgressBar::new(n_items as u64);
                progress_bar.set_style(style.clone());
                progress_bar
            }
            _ => ProgressBar::hidden(),
        }
    }
}

/// Whether to overwrite existing output files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverwriteMode {
    Always,
    Never,
    Ask,
}

impl From<bool> for OverwriteMode {
    fn from(overwrite: bool) -> Self {
        if overwrite {
            Self::Always
        } else {
            Self::Never
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_verbosity_hides_progress() {
        assert!(!Verbosity::Quiet.print_messages());
        assert!(Verbosity::Messages.print_messages());
        assert!(Verbosity::Messages.create_progress_bar(10).is_hidden());
        assert_eq!(OverwriteMode::from(true), OverwriteMode::Always);
    }
}
