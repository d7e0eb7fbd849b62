#![forbid(unsafe_code)]
//! calctest - fixture-driven test runner for a command-line calculator
//!
//! The runner discovers numbered fixture pairs (`tests/operations_in_NN`,
//! `tests/operations_out_NN`), invokes the program under test once per pair with the input as its
//! single argument, and compares trimmed stdout against the expected text.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli`
//!   module enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod fixtures;
pub mod version;

pub use cli::test_interfaces::{FilesystemDiscovery, ProcessExecutor, TestDiscovery, TestError, TestExecutor};
pub use cli::test_runner::{
    CaseOutcome, ConsoleReporter, FailureKind, JsonReporter, TestReporter, TestSummary, run_tests, run_with,
};
pub use config::{ReportFormat, RunnerConfig};
pub use fixtures::{FixturePaths, TestCase};
