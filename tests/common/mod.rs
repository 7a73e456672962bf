use lazy_static::lazy_static;
use mocksz::cli;
use std::{
    ffi::OsString,
    fs,
    io,
    path::{Path, PathBuf},
};

#[macro_export]
macro_rules! def_test {
    (
        OUT[$($out_ident:ident = $out_str:expr),*]
        fn $name:ident $test_body:expr
    ) => {
        #[test]
        fn $name() {
            let test = common::Test::new(stringify!($name));

            $( let $out_ident = test.output_path($out_str); )*

            let test_body = |$( $out_ident, )*| $test_body;

            test_body(
                $( path_str!($out_ident), )*
            );
        }
    };
}

#[macro_export]
macro_rules! path_str {
    ($path:expr) => {
        $path.to_string_lossy().as_ref()
    };
}

pub fn run<I, T>(args: I)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    cli::run::run_with_args(COMMAND.clone().get_matches_from(args));
}

pub fn assert_file_exists<P: AsRef<Path>>(file_path: P) {
    let file_path = file_path.as_ref();
    let exists = file_path.exists();
    assert!(
        exists,
        "File {} does not exist",
        file_path.to_string_lossy()
    );
}

/// Columns of a CSV file written by the command line program.
#[derive(Debug, Clone)]
pub struct Columns {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl Columns {
    pub fn n_rows(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    pub fn names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    pub fn column(&self, name: &str) -> &[f64] {
        let idx = self
            .names
            .iter()
            .position(|column_name| column_name == name)
            .unwrap_or_else(|| panic!("No column named {}", name));
        &self.values[idx]
    }
}

pub fn read_columns<P: AsRef<Path>>(file_path: P) -> Columns {
    let file_path = file_path.as_ref();
    assert_file_exists(file_path);
    let text = fs::read_to_string(file_path)
        .unwrap_or_else(|err| panic!("Could not read {}: {}", file_path.display(), err));
    let mut lines = text.lines();
    let names: Vec<String> = lines
        .next()
        .expect("Missing header line")
        .split(',')
        .map(String::from)
        .collect();
    let mut values = vec![Vec::new(); names.len()];
    for line in lines.filter(|line| !line.is_empty()) {
        let row: Vec<f64> = line
            .split(',')
            .map(|value| value.parse().expect("Invalid number in output"))
            .collect();
        assert_eq!(row.len(), names.len(), "Ragged row: {}", line);
        for (column, value) in values.iter_mut().zip(row) {
            column.push(value);
        }
    }
    Columns { names, values }
}

#[derive(Debug, Clone)]
pub struct Test {
    output_dir: PathBuf,
}

impl Test {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        let name = name.as_ref();
        let output_dir = CONTEXT.prepared_output_dir(name).unwrap_or_else(|err| {
            panic!("Could not prepare output directory for test {}: {}", name, err)
        });
        Self { output_dir }
    }

    pub fn output_path<S: AsRef<str>>(&self, file_name: S) -> PathBuf {
        self.output_dir.join(file_name.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct TestContext {
    base_output_dir: PathBuf,
}

impl TestContext {
    const BASE_OUTPUT_DIR_PATH_COMPONENTS: [&'static str; 3] = ["tests", "data", "output"];

    fn new() -> Self {
        Self {
            base_output_dir: Self::BASE_OUTPUT_DIR_PATH_COMPONENTS.iter().collect(),
        }
    }

    pub fn output_dir<S: AsRef<str>>(&self, test_name: S) -> PathBuf {
        self.base_output_dir.join(test_name.as_ref())
    }

    pub fn prepared_output_dir<S: AsRef<str>>(&self, test_name: S) -> io::Result<PathBuf> {
        let output_dir = self.output_dir(test_name);
        if output_dir.exists() {
            fs::remove_dir_all(&output_dir)?;
        }
        fs::create_dir_all(&output_dir)?;
        Ok(output_dir)
    }
}

lazy_static! {
    pub static ref CONTEXT: TestContext = TestContext::new();
    static ref COMMAND: clap::Command<'static> = cli::build::build().no_binary_name(true);
}
