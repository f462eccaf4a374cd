use std::time::Duration;

use thiserror::Error;

use documenter_utils::{exit::ExitCode, results::TestResult};

pub mod classify;
pub mod faulty_lines;
pub mod output;

/// Final tallies of a completed run.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedSummary {
    /// Every result seen, whatever its outcome.
    pub num_tests: u64,
    pub num_errors: u64,
    pub num_failures: u64,
    pub num_skips: u64,
    pub elapsed: Duration,
}

impl CompletedSummary {
    pub fn num_passed(&self) -> u64 {
        self.num_tests - self.num_errors - self.num_failures - self.num_skips
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::for_run(self.num_errors > 0 || self.num_failures > 0)
    }
}

#[derive(Debug, Error)]
pub enum ReportingError {
    /// A caller broke the `start -> result* -> finish` lifecycle.
    #[error("reporter lifecycle violated: {0}")]
    ContractViolation(String),
    #[error("failed to write a report to an output buffer")]
    FailedToWrite,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// A [`Reporter`] consumes test results as they complete.
///
/// A reporter is allowed to be side-effectful. Constructing a reporter starts a run; calls to
/// [Self::push_result] arrive one at a time, in completion order.
pub trait Reporter: Send {
    /// Consume the next test result.
    fn push_result(&mut self, result: &TestResult) -> Result<(), ReportingError>;

    /// Consume the reporter, and perform any needed finalization steps.
    ///
    /// This method is only called when all test results for a run have been consumed.
    fn finish(self: Box<Self>) -> Result<CompletedSummary, ReportingError>;
}
