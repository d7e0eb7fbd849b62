//! Mismatch artifacts
//!
//! Each failed comparison leaves a three-line file in the results directory so the failure can
//! be inspected after the run. Files are overwritten on every run, never appended to.

use std::fs;
use std::path::Path;

use crate::cli::test_interfaces::TestError;
use crate::fixtures::TestCase;

/// Create the results directory if it does not exist yet.
pub fn prepare_results_dir(dir: &Path) -> Result<(), TestError> {
    fs::create_dir_all(dir).map_err(|source| TestError::Artifact {
        path: dir.to_path_buf(),
        source,
    })
}

/// Render the artifact body for a mismatch.
pub fn render_mismatch(input: &str, expected: &str, actual: &str) -> String {
    format!("Input: {input}\nExpected: {expected}\nGot: {actual}\n")
}

/// Write the artifact for `case` to `path`, replacing any previous content.
#[tracing::instrument(skip_all, fields(case = case.index, path = %path.display()))]
pub fn write_mismatch(path: &Path, case: &TestCase, actual: &str) -> Result<(), TestError> {
    let body = render_mismatch(&case.input, &case.expected, actual);
    fs::write(path, body).map_err(|source| TestError::Artifact {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("wrote mismatch artifact");
    Ok(())
}
