//! Fixture naming and loading
//!
//! A test case is a pair of files sharing a numeric index:
//!
//! - `operations_in_NN` - the literal argument passed to the calculator
//! - `operations_out_NN` - the expected standard output
//!
//! `NN` is the index zero-padded to at least two digits, so index 7 lives in `operations_in_07`
//! and index 123 in `operations_in_123`. Mismatches are written to `operations_NN` in the results
//! directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::RunnerConfig;

pub const INPUT_PREFIX: &str = "operations_in_";
pub const EXPECTED_PREFIX: &str = "operations_out_";
pub const RESULT_PREFIX: &str = "operations_";

/// Render an index the way fixture names spell it (two digits minimum).
pub fn format_index(index: u32) -> String {
    format!("{:02}", index)
}

/// Extract the fixture index from a file name such as `operations_in_07`.
///
/// Only the digit run directly after the prefix counts; anything following it is ignored, so
/// `operations_in_07.bak` still names index 7. Returns `None` when there are no digits or the
/// number does not fit in a `u32`.
pub fn parse_input_index(file_name: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(INPUT_PREFIX)?;
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse().ok()
}

/// Paths involved in one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePaths {
    pub input: PathBuf,
    pub expected: PathBuf,
    pub result: PathBuf,
}

impl FixturePaths {
    pub fn resolve(config: &RunnerConfig, index: u32) -> Self {
        let nn = format_index(index);
        Self {
            input: config.tests_dir.join(format!("{INPUT_PREFIX}{nn}")),
            expected: config.tests_dir.join(format!("{EXPECTED_PREFIX}{nn}")),
            result: config.results_dir.join(format!("{RESULT_PREFIX}{nn}")),
        }
    }
}

/// A loaded test case. Both strings are already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub index: u32,
    pub input: String,
    pub expected: String,
}

impl TestCase {
    /// Load both fixture files for `index`.
    ///
    /// The input file is checked before the expected file, so a case missing both reports the
    /// missing input.
    pub fn load(index: u32, paths: &FixturePaths) -> Result<Self, FixtureError> {
        if !paths.input.exists() {
            return Err(FixtureError::MissingInput(paths.input.clone()));
        }
        if !paths.expected.exists() {
            return Err(FixtureError::MissingExpected(paths.expected.clone()));
        }

        let input = read_trimmed(&paths.input)?;
        let expected = read_trimmed(&paths.expected)?;

        Ok(Self { index, input, expected })
    }

    pub fn name(&self) -> String {
        format_index(self.index)
    }
}

/// Why a test case could not be loaded
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("input file {} not found", .0.display())]
    MissingInput(PathBuf),

    #[error("expected output file {} not found", .0.display())]
    MissingExpected(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Unreadable(PathBuf, #[source] io::Error),
}

fn read_trimmed(path: &Path) -> Result<String, FixtureError> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| FixtureError::Unreadable(path.to_path_buf(), e))
}
