//! Runner configuration
//!
//! Defaults reproduce the fixed layout the harness has always used: fixtures in `tests/`,
//! the calculator at `bin/calc`, artifacts in `test_results/` and a five second timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default fixtures directory
pub const DEFAULT_TESTS_DIR: &str = "tests";
/// Default results directory
pub const DEFAULT_RESULTS_DIR: &str = "test_results";
/// Default per-case timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default target executable path for the current platform
#[cfg(windows)]
pub const DEFAULT_BIN: &str = "bin/calc.exe";
/// Default target executable path for the current platform
#[cfg(not(windows))]
pub const DEFAULT_BIN: &str = "bin/calc";

/// How the run is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable progress on stdout
    #[default]
    Console,
    /// A single JSON document on stdout once the run completes
    Json,
}

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Executable under test
    pub bin: PathBuf,
    /// Directory holding `operations_in_NN` / `operations_out_NN`
    pub tests_dir: PathBuf,
    /// Directory receiving mismatch artifacts
    pub results_dir: PathBuf,
    /// Wall-clock limit for one invocation
    pub timeout: Duration,
    /// Emit ANSI colors in console output
    pub color: bool,
    /// Console log or JSON document
    pub format: ReportFormat,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            bin: PathBuf::from(DEFAULT_BIN),
            tests_dir: PathBuf::from(DEFAULT_TESTS_DIR),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            color: true,
            format: ReportFormat::Console,
        }
    }
}

impl RunnerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the executable under test
    ///
    /// A bare name such as `calc` is turned into `./calc`, so the existence check and the
    /// spawned process both look in the current directory instead of `$PATH`.
    pub fn with_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.bin = explicit_program_path(bin.into());
        self
    }

    /// Set the fixtures directory
    pub fn with_tests_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tests_dir = dir.into();
        self
    }

    /// Set the results directory
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Set the per-case timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable ANSI colors
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Set the report format
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Resolve every path against `root`. Absolute paths are left untouched.
    pub fn rooted_at(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        self.bin = root.join(&self.bin);
        self.tests_dir = root.join(&self.tests_dir);
        self.results_dir = root.join(&self.results_dir);
        self
    }
}

fn explicit_program_path(bin: PathBuf) -> PathBuf {
    if bin.is_relative() && bin.parent() == Some(Path::new("")) {
        Path::new(".").join(bin)
    } else {
        bin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_layout() {
        let config = RunnerConfig::default();
        assert_eq!(config.tests_dir, PathBuf::from("tests"));
        assert_eq!(config.results_dir, PathBuf::from("test_results"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.format, ReportFormat::Console);
        assert!(config.color);
        #[cfg(not(windows))]
        assert_eq!(config.bin, PathBuf::from("bin/calc"));
    }

    #[test]
    #[cfg(unix)]
    fn test_rooted_at_keeps_absolute_paths() {
        let config = RunnerConfig::new()
            .with_bin("/usr/local/bin/calc")
            .rooted_at("/work");
        assert_eq!(config.bin, PathBuf::from("/usr/local/bin/calc"));
        assert_eq!(config.tests_dir, PathBuf::from("/work/tests"));
        assert_eq!(config.results_dir, PathBuf::from("/work/test_results"));
    }

    #[test]
    fn test_bare_bin_name_is_made_explicit() {
        let config = RunnerConfig::new().with_bin("calc");
        assert_eq!(config.bin, Path::new(".").join("calc"));

        let config = RunnerConfig::new().with_bin("build/calc");
        assert_eq!(config.bin, PathBuf::from("build/calc"));
    }
}
