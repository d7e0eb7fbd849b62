//! Test runner implementation
//!
//! ## Flow
//!
//! 1. Pre-flight: the program under test and the fixtures directory must exist, and at least one
//!    `operations_in_NN` file must be present. Any of these failing aborts the run before a single
//!    case executes.
//! 2. Each discovered index runs in ascending order, one child process at a time.
//! 3. Output mismatches leave an artifact in the results directory.
//!
//! Per-case problems (missing files, timeouts, spawn errors, mismatches) never abort the run; they
//! become a [`FailureKind`] on the case's [`CaseOutcome`].
//!
//! ## TestReporter Trait
//!
//! Reporting is separated from execution by the `TestReporter` trait. `ConsoleReporter` prints
//! the human-readable progress log, `JsonReporter` emits one machine-readable document.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::json;

use super::test_interfaces::{FilesystemDiscovery, ProcessExecutor, TestDiscovery, TestError, TestExecutor};
use super::{CliError, CliResult, ExitCode};
use crate::artifacts::{prepare_results_dir, write_mismatch};
use crate::config::{ReportFormat, RunnerConfig};
use crate::fixtures::{FixtureError, FixturePaths, TestCase, format_index, parse_input_index};
use crate::version::CALCTEST_VERSION;

// ============================================================================
// Results
// ============================================================================

/// Why a case failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    MissingInput(PathBuf),
    MissingExpected(PathBuf),
    Mismatch,
    Timeout(Duration),
    Exception(String),
}

impl FailureKind {
    /// Short stable label, used in machine-readable output
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::MissingInput(_) => "missing input",
            FailureKind::MissingExpected(_) => "missing expected output",
            FailureKind::Mismatch => "output mismatch",
            FailureKind::Timeout(_) => "timeout",
            FailureKind::Exception(_) => "exception",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MissingInput(p) => write!(f, "Input file {} not found", p.display()),
            FailureKind::MissingExpected(p) => {
                write!(f, "Expected output file {} not found", p.display())
            }
            FailureKind::Mismatch => write!(f, "Output mismatch"),
            FailureKind::Timeout(_) => write!(f, "Program timed out"),
            FailureKind::Exception(msg) => write!(f, "Exception: {}", msg),
        }
    }
}

impl From<FixtureError> for FailureKind {
    fn from(err: FixtureError) -> Self {
        match err {
            FixtureError::MissingInput(p) => FailureKind::MissingInput(p),
            FixtureError::MissingExpected(p) => FailureKind::MissingExpected(p),
            unreadable @ FixtureError::Unreadable(..) => FailureKind::Exception(unreadable.to_string()),
        }
    }
}

/// Result of running a single case
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub index: u32,
    /// `None` when the fixtures could not be loaded
    pub input: Option<String>,
    pub expected: Option<String>,
    /// Trimmed stdout; `None` when the program produced no result (timeout, spawn error)
    pub actual: Option<String>,
    pub failure: Option<FailureKind>,
    pub duration: Duration,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn name(&self) -> String {
        format_index(self.index)
    }

    fn unloaded(index: u32, failure: FailureKind, duration: Duration) -> Self {
        Self {
            index,
            input: None,
            expected: None,
            actual: None,
            failure: Some(failure),
            duration,
        }
    }
}

/// Summary of test run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl TestSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.passed == self.total
    }
}

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting test execution results.
pub trait TestReporter {
    /// Called before any pre-flight check
    fn on_run_start(&mut self, _config: &RunnerConfig) {}

    /// Called when the run aborts: a failed pre-flight check, or an artifact that cannot be written
    fn on_setup_error(&mut self, error: &TestError);

    /// Called once discovery found at least one case
    fn on_collection_complete(&mut self, test_count: usize);

    /// Called when a case's fixtures loaded and the program is about to run
    fn on_test_start(&mut self, case: &TestCase);

    /// Called for every case, including those whose fixtures failed to load
    fn on_test_complete(&mut self, outcome: &CaseOutcome);

    /// Called when all cases have completed
    fn on_run_complete(&mut self, summary: &TestSummary);
}

const RED: &str = "\x1b[0;31m";
const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[1;33m";
const BLUE: &str = "\x1b[0;34m";
const RESET: &str = "\x1b[0m";
const RULE: &str = "================================";

/// Default console reporter
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
    color: bool,
    results_dir: PathBuf,
}

impl ConsoleReporter {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            results_dir: PathBuf::from(crate::config::DEFAULT_RESULTS_DIR),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Write errors on the report stream are not actionable mid-run.
    fn line(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", text.as_ref());
    }

    fn colored(&mut self, color: &str, text: impl AsRef<str>) {
        if self.color {
            let _ = writeln!(self.out, "{}{}{}", color, text.as_ref(), RESET);
        } else {
            self.line(text);
        }
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_run_start(&mut self, config: &RunnerConfig) {
        self.results_dir = config.results_dir.clone();
        self.colored(YELLOW, "🚀 Starting Calculator Tests");
        self.line(RULE);
    }

    fn on_setup_error(&mut self, error: &TestError) {
        match error {
            TestError::NoTests(dir) => {
                self.colored(
                    YELLOW,
                    format!("⚠️  No tests found in {}/ directory", dir.display()),
                );
                self.line("Test files should be named: operations_in_01, operations_in_02, etc.");
                self.line("With corresponding: operations_out_01, operations_out_02, etc.");
            }
            other => self.colored(RED, format!("❌ Error: {}", other)),
        }
    }

    fn on_collection_complete(&mut self, test_count: usize) {
        self.colored(BLUE, format!("📋 Found {} test(s)", test_count));
        self.line("");
    }

    fn on_test_start(&mut self, case: &TestCase) {
        self.colored(BLUE, format!("🔍 Running Test {}:", case.name()));
        self.line(format!("   Input:    {}", case.input));
        self.line(format!("   Expected: {}", case.expected));
    }

    fn on_test_complete(&mut self, outcome: &CaseOutcome) {
        let name = outcome.name();
        if let Some(actual) = &outcome.actual {
            self.line(format!("   Got:      '{}'", actual));
        }
        match &outcome.failure {
            None => self.colored(GREEN, format!("✅ Test {} PASSED", name)),
            Some(kind @ (FailureKind::MissingInput(_) | FailureKind::MissingExpected(_))) => {
                self.colored(RED, format!("❌ Test {}: {}", name, kind))
            }
            Some(kind) => self.colored(RED, format!("❌ Test {} FAILED - {}", name, kind)),
        }
        self.line("");
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        self.line(RULE);
        self.colored(YELLOW, "📊 TEST SUMMARY");
        self.line(format!("Total Tests: {}", summary.total));
        self.colored(GREEN, format!("Passed: {}", summary.passed));

        if summary.failed > 0 {
            self.colored(RED, format!("Failed: {}", summary.failed));
            let hint = format!(
                "Check {}/ directory for failed test details",
                self.results_dir.display()
            );
            self.colored(BLUE, hint);
        } else {
            self.colored(GREEN, "🎉 All tests passed!");
        }
        let _ = self.out.flush();
    }
}

/// Machine-readable reporter: one JSON document per run
pub struct JsonReporter<W: Write = io::Stdout> {
    out: W,
    cases: Vec<serde_json::Value>,
}

impl JsonReporter {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, cases: Vec::new() }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, doc: serde_json::Value) {
        let _ = writeln!(self.out, "{:#}", doc);
        let _ = self.out.flush();
    }
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_setup_error(&mut self, error: &TestError) {
        self.emit(json!({
            "version": CALCTEST_VERSION,
            "error": error.to_string(),
        }));
    }

    fn on_collection_complete(&mut self, test_count: usize) {
        self.cases.reserve(test_count);
    }

    fn on_test_start(&mut self, _case: &TestCase) {}

    fn on_test_complete(&mut self, outcome: &CaseOutcome) {
        self.cases.push(json!({
            "index": outcome.index,
            "name": outcome.name(),
            "passed": outcome.passed(),
            "input": outcome.input,
            "expected": outcome.expected,
            "actual": outcome.actual,
            "reason": outcome.failure.as_ref().map(FailureKind::label),
            "detail": outcome.failure.as_ref().map(ToString::to_string),
            "duration_ms": outcome.duration.as_millis() as u64,
        }));
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        let cases = std::mem::take(&mut self.cases);
        self.emit(json!({
            "version": CALCTEST_VERSION,
            "summary": {
                "total": summary.total,
                "passed": summary.passed,
                "failed": summary.failed,
            },
            "cases": cases,
        }));
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Run every fixture against the configured program.
///
/// This is the CLI entry: it wires up the filesystem discovery, the process executor and the
/// reporter selected by `config.format`.
pub fn run_tests(config: &RunnerConfig) -> CliResult<ExitCode> {
    let mut reporter: Box<dyn TestReporter> = match config.format {
        ReportFormat::Console => Box::new(ConsoleReporter::stdout(config.color)),
        ReportFormat::Json => Box::new(JsonReporter::stdout()),
    };

    let executor = match ProcessExecutor::new() {
        Ok(executor) => executor,
        Err(e) => {
            reporter.on_setup_error(&e);
            return Err(CliError::new("", ExitCode::FAILURE));
        }
    };

    let summary = run_with(config, &FilesystemDiscovery, &executor, reporter.as_mut())
        .map_err(|_| CliError::new("", ExitCode::FAILURE))?;

    if summary.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Summary already printed
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

/// Run the suite with explicit discovery, execution and reporting strategies.
///
/// Setup errors are reported through `reporter` and returned; per-case failures are folded into
/// the returned summary.
pub fn run_with<D, E, R>(
    config: &RunnerConfig,
    discovery: &D,
    executor: &E,
    reporter: &mut R,
) -> Result<TestSummary, TestError>
where
    D: TestDiscovery + ?Sized,
    E: TestExecutor + ?Sized,
    R: TestReporter + ?Sized,
{
    reporter.on_run_start(config);
    let result = run_suite(config, discovery, executor, reporter);
    if let Err(e) = &result {
        tracing::error!(error = %e, "run aborted");
        reporter.on_setup_error(e);
    }
    result
}

fn preflight<D>(config: &RunnerConfig, discovery: &D) -> Result<Vec<u32>, TestError>
where
    D: TestDiscovery + ?Sized,
{
    if !config.bin.exists() {
        return Err(TestError::MissingExecutable(config.bin.clone()));
    }
    if !config.tests_dir.exists() {
        return Err(TestError::MissingFixturesDir(config.tests_dir.clone()));
    }

    let indices = discovery.discover(&config.tests_dir)?;
    if indices.is_empty() {
        return Err(TestError::NoTests(config.tests_dir.clone()));
    }
    Ok(indices)
}

#[tracing::instrument(skip_all, fields(bin = %config.bin.display(), tests_dir = %config.tests_dir.display()))]
fn run_suite<D, E, R>(
    config: &RunnerConfig,
    discovery: &D,
    executor: &E,
    reporter: &mut R,
) -> Result<TestSummary, TestError>
where
    D: TestDiscovery + ?Sized,
    E: TestExecutor + ?Sized,
    R: TestReporter + ?Sized,
{
    let start_time = Instant::now();

    let indices = preflight(config, discovery)?;
    prepare_results_dir(&config.results_dir)?;

    tracing::info!(count = indices.len(), "collected cases");
    reporter.on_collection_complete(indices.len());

    let mut summary = TestSummary {
        total: indices.len(),
        ..TestSummary::default()
    };

    for index in indices {
        let outcome = run_case(config, executor, reporter, index)?;
        if outcome.passed() {
            summary.passed += 1;
        } else {
            summary.failed += 1;
        }
    }

    summary.duration = start_time.elapsed();
    tracing::info!(
        passed = summary.passed,
        failed = summary.failed,
        elapsed_ms = summary.duration.as_millis() as u64,
        "run complete"
    );
    reporter.on_run_complete(&summary);
    Ok(summary)
}

/// Run a single case.
///
/// Only a failure to write the mismatch artifact is returned as an error, and only after the case
/// itself has been reported.
fn run_case<E, R>(
    config: &RunnerConfig,
    executor: &E,
    reporter: &mut R,
    index: u32,
) -> Result<CaseOutcome, TestError>
where
    E: TestExecutor + ?Sized,
    R: TestReporter + ?Sized,
{
    let start = Instant::now();
    let paths = FixturePaths::resolve(config, index);

    let case = match TestCase::load(index, &paths) {
        Ok(case) => case,
        Err(e) => {
            let outcome = CaseOutcome::unloaded(index, e.into(), start.elapsed());
            reporter.on_test_complete(&outcome);
            return Ok(outcome);
        }
    };

    reporter.on_test_start(&case);

    let mut artifact_error = None;
    let (actual, failure) = match executor.execute(&config.bin, &case.input, config.timeout) {
        Ok(stdout) => {
            let actual = stdout.trim().to_string();
            if actual == case.expected {
                (Some(actual), None)
            } else {
                artifact_error = write_mismatch(&paths.result, &case, &actual).err();
                (Some(actual), Some(FailureKind::Mismatch))
            }
        }
        Err(TestError::Timeout(limit)) => (None, Some(FailureKind::Timeout(limit))),
        Err(e) => (None, Some(FailureKind::Exception(e.to_string()))),
    };

    let outcome = CaseOutcome {
        index,
        input: Some(case.input),
        expected: Some(case.expected),
        actual,
        failure,
        duration: start.elapsed(),
    };
    reporter.on_test_complete(&outcome);

    match artifact_error {
        Some(e) => Err(e),
        None => Ok(outcome),
    }
}

/// Collect the distinct indices of `operations_in_*` files in `dir`, ascending.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn discover_indices(dir: &Path) -> Result<Vec<u32>, TestError> {
    let entries = fs::read_dir(dir).map_err(|source| TestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    collect_indices(dir, entries.map(|entry| entry.map(|e| e.file_name())))
}

fn collect_indices<I>(dir: &Path, names: I) -> Result<Vec<u32>, TestError>
where
    I: IntoIterator<Item = io::Result<OsString>>,
{
    let mut indices = BTreeSet::new();
    for name in names {
        let name = name.map_err(|source| TestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if let Some(index) = parse_input_index(&name.to_string_lossy()) {
            indices.insert(index);
        }
    }

    tracing::debug!(found = indices.len(), "discovered fixture indices");
    Ok(indices.into_iter().collect())
}
