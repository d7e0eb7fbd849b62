//! Test runner I/O boundary interfaces
//!
//! This module defines trait-based abstractions for the two operations that touch the outside
//! world:
//! - Test discovery (scan the fixtures directory for case indices)
//! - Test execution (spawn the calculator with one argument + capture stdout)
//!
//! The runner is generic over both, so orchestration can be exercised with fakes while the
//! default implementations talk to the real filesystem and process table.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Errors that occur during test operations
#[derive(Debug, Error)]
pub enum TestError {
    #[error("program {} not found", .0.display())]
    MissingExecutable(PathBuf),

    #[error("{} directory not found", .0.display())]
    MissingFixturesDir(PathBuf),

    #[error("no tests found in {} directory", .0.display())]
    NoTests(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for program: {0}")]
    Wait(#[source] std::io::Error),

    #[error("program timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("failed to start process runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

// ============================================================================
// Test Discovery Interface
// ============================================================================

/// Find the case indices present in a fixtures directory.
pub trait TestDiscovery {
    /// Return the distinct indices named by `operations_in_*` files, ascending.
    fn discover(&self, tests_dir: &Path) -> Result<Vec<u32>, TestError>;
}

// ============================================================================
// Test Executor Interface
// ============================================================================

/// Run the program under test once and capture its standard output.
pub trait TestExecutor {
    /// Invoke `program` with `arg` as its only argument.
    ///
    /// Returns the raw (untrimmed) stdout. Exceeding `timeout` yields [`TestError::Timeout`].
    fn execute(&self, program: &Path, arg: &str, timeout: Duration) -> Result<String, TestError>;
}

// ============================================================================
// Default Implementations
// ============================================================================

/// Directory scan of the fixtures directory.
pub struct FilesystemDiscovery;

impl TestDiscovery for FilesystemDiscovery {
    fn discover(&self, tests_dir: &Path) -> Result<Vec<u32>, TestError> {
        use super::test_runner::discover_indices;
        discover_indices(tests_dir)
    }
}

/// Spawns a real child process per case on a current-thread tokio runtime.
pub struct ProcessExecutor {
    runtime: tokio::runtime::Runtime,
}

impl ProcessExecutor {
    pub fn new() -> Result<Self, TestError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TestError::Runtime)?;
        Ok(Self { runtime })
    }
}

impl TestExecutor for ProcessExecutor {
    fn execute(&self, program: &Path, arg: &str, timeout: Duration) -> Result<String, TestError> {
        self.runtime.block_on(run_with_timeout(program, arg, timeout))
    }
}

#[tracing::instrument(skip_all, fields(program = %program.display(), arg_len = arg.len()))]
async fn run_with_timeout(program: &Path, arg: &str, timeout: Duration) -> Result<String, TestError> {
    // No shell is involved: `arg` reaches the program as exactly one argv entry.
    let child = Command::new(program)
        .arg(arg)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| TestError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;
    tracing::debug!(pid = child.id(), "spawned");

    // Dropping the wait future on timeout drops the child, which kills it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            tracing::debug!(status = ?output.status, stdout_len = output.stdout.len(), "exited");
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(Err(e)) => Err(TestError::Wait(e)),
        Err(_) => {
            tracing::warn!(?timeout, "timed out, killing child");
            Err(TestError::Timeout(timeout))
        }
    }
}
