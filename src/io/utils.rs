//! Utilities for input/output.

use super::OverwriteMode;
use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

#[cfg(feature = "json")]
use serde::Serialize;

/// Output file that is written to a temporary location and moved to
/// the target path only once writing has completed.
#[derive(Debug)]
pub struct AtomicOutputFile {
    target_path: PathBuf,
    temporary_file: NamedTempFile,
}

impl AtomicOutputFile {
    /// Creates a temporary file in the directory of the given target path,
    /// creating the directory if required.
    pub fn new<P: AsRef<Path>>(target_path: P) -> io::Result<Self> {
        let target_path = target_path.as_ref().to_path_buf();
        let directory = match target_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&directory)?;
        let temporary_file = NamedTempFile::new_in(&directory)?;
        Ok(Self {
            target_path,
            temporary_file,
        })
    }

    /// Returns the path where the file will end up.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Returns the path of the temporary file.
    pub fn temporary_path(&self) -> &Path {
        self.temporary_file.path()
    }

    /// Returns a mutable reference to the temporary file.
    pub fn file_mut(&mut self) -> &mut fs::File {
        self.temporary_file.as_file_mut()
    }

    /// Moves the temporary file to the target path, replacing any existing file.
    pub fn persist(self) -> io::Result<()> {
        self.temporary_file
            .persist(&self.target_path)
            .map(|_| ())
            .map_err(|err| err.error)
    }
}

/// Asks the user a yes/no question on the terminal and returns the answer.
pub fn user_says_yes(question: &str, default_is_yes: bool) -> io::Result<bool> {
    print!(
        "{} [{}] ",
        question,
        if default_is_yes { "Y/n" } else { "y/N" }
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        "" => default_is_yes,
        _ => false,
    })
}

/// Determines whether the file at the given path may be written, given
/// how existing files should be treated.
pub fn write_allowed<P: AsRef<Path>>(file_path: P, overwrite_mode: OverwriteMode) -> bool {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return true;
    }
    match overwrite_mode {
        OverwriteMode::Always => true,
        OverwriteMode::Never => {
            eprintln!(
                "Warning: {} already exists, not overwriting",
                file_path.display()
            );
            false
        }
        OverwriteMode::Ask => user_says_yes(
            &format!("File {} already exists, overwrite?", file_path.display()),
            true,
        )
        .unwrap_or_else(|err| {
            eprintln!("Warning: Not overwriting due to error: {}", err);
            false
        }),
    }
}

/// Writes the given columns of values as comma-separated text with a header line.
///
/// All columns must have the same length.
pub fn write_columns<W: Write>(
    writer: &mut W,
    column_names: &[&str],
    columns: &[&[f64]],
) -> io::Result<()> {
    assert_eq!(
        column_names.len(),
        columns.len(),
        "Number of column names must match number of columns"
    );
    let n_rows = columns.first().map_or(0, |column| column.len());
    assert!(
        columns.iter().all(|column| column.len() == n_rows),
        "All columns must have the same length"
    );

    writeln!(writer, "{}", column_names.join(","))?;
    for row_idx in 0..n_rows {
        let row: Vec<_> = columns
            .iter()
            .map(|column| format!("{:e}", column[row_idx]))
            .collect();
        writeln!(writer, "{}", row.join(","))?;
    }
    Ok(())
}

/// Writes the given columns of values as comma-separated text to the given
/// file, replacing it atomically.
///
/// Returns whether the file was written.
pub fn write_columns_to_file<P: AsRef<Path>>(
    file_path: P,
    column_names: &[&str],
    columns: &[&[f64]],
    overwrite_mode: OverwriteMode,
) -> io::Result<bool> {
    write_atomically(file_path, overwrite_mode, |writer| {
        write_columns(writer, column_names, columns)
    })
}

/// Serializes the given data as JSON and saves it at the given path,
/// replacing it atomically.
///
/// Returns whether the file was written.
#[cfg(feature = "json")]
pub fn save_data_as_json<P, T>(file_path: P, data: &T, overwrite_mode: OverwriteMode) -> io::Result<bool>
where
    P: AsRef<Path>,
    T: Serialize,
{
    write_atomically(file_path, overwrite_mode, |writer| {
        serde_json::to_writer_pretty(&mut *writer, data)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        writeln!(writer)
    })
}

fn write_atomically<P, W>(
    file_path: P,
    overwrite_mode: OverwriteMode,
    write_contents: W,
) -> io::Result<bool>
where
    P: AsRef<Path>,
    W: FnOnce(&mut BufWriter<&mut fs::File>) -> io::Result<()>,
{
    let file_path = file_path.as_ref();
    if !write_allowed(file_path, overwrite_mode) {
        return Ok(false);
    }
    let mut output_file = AtomicOutputFile::new(file_path)?;
    {
        let mut writer = BufWriter::new(output_file.file_mut());
        write_contents(&mut writer)?;
        writer.flush()?;
    }
    output_file.persist()?;
    Ok(true)
}
