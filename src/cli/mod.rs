//! CLI module for calctest
//!
//! Running `calctest` with no arguments executes every fixture in `tests/` against `bin/calc`
//! and exits 0 only if all of them pass. The flags below only relocate inputs or change the
//! report format; the defaults are the fixed layout.
//!
//! ## Modules
//!
//! - `test_interfaces` - I/O boundaries (discovery, process execution) and `TestError`
//! - `test_runner` - Orchestration, outcomes and reporters
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod test_interfaces;
pub mod test_runner;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{
    DEFAULT_BIN, DEFAULT_RESULTS_DIR, DEFAULT_TESTS_DIR, DEFAULT_TIMEOUT_SECS, ReportFormat, RunnerConfig,
};
use crate::version::CALCTEST_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
/// An empty message means the report already explained the failure.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run numbered input/output fixtures against a calculator binary
#[derive(Parser, Debug)]
#[command(name = "calctest")]
#[command(version = CALCTEST_VERSION)]
#[command(about = "Run numbered input/output fixtures against a calculator binary", long_about = None)]
pub struct Cli {
    /// Program under test, invoked with one argument per case
    #[arg(long = "bin", value_name = "PATH", default_value = DEFAULT_BIN)]
    pub bin: PathBuf,

    /// Directory holding operations_in_NN / operations_out_NN
    #[arg(long = "tests-dir", value_name = "DIR", default_value = DEFAULT_TESTS_DIR)]
    pub tests_dir: PathBuf,

    /// Directory receiving mismatch reports
    #[arg(long = "results-dir", value_name = "DIR", default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,

    /// Per-case timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Disable ANSI colors
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Console)]
    pub format: Format,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Console,
    Json,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Console => ReportFormat::Console,
            Format::Json => ReportFormat::Json,
        }
    }
}

impl Cli {
    /// Map parsed arguments onto a runner configuration.
    pub fn to_config(&self) -> RunnerConfig {
        RunnerConfig::new()
            .with_bin(&self.bin)
            .with_tests_dir(&self.tests_dir)
            .with_results_dir(&self.results_dir)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_color(!self.no_color)
            .with_format(self.format.into())
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.to_config();
    tracing::debug!(?config, "resolved configuration");
    test_runner::run_tests(&config)
}

// ============================================================================
// Tests
// ============================================================================
