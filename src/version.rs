//! calctest version information.
//!
//! The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time so the CLI
//! `--version` output and the JSON report agree on it.

/// The calctest version string (for example, `0.1.0`).
pub const CALCTEST_VERSION: &str = env!("CARGO_PKG_VERSION");
