//! Classification of a test result into the outcome categories reported on.
//!
//! The pass/fail decision is made upstream; classification only reads it.

use documenter_utils::results::{Exception, Outcome, TestResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Passed,
    Skipped,
    FailedAssertion,
    Errored,
}

impl OutcomeKind {
    pub fn is_passed(self) -> bool {
        matches!(self, OutcomeKind::Passed)
    }

    /// Whether the outcome counts against the run.
    pub fn is_fail_like(self) -> bool {
        matches!(self, OutcomeKind::FailedAssertion | OutcomeKind::Errored)
    }
}

/// What went wrong in a failing test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDetail<'a> {
    Assertion { message: &'a str },
    Error { exception: &'a Exception },
}

pub fn classify(result: &TestResult) -> OutcomeKind {
    match result.outcome {
        Outcome::Passed => OutcomeKind::Passed,
        Outcome::Skipped { .. } => OutcomeKind::Skipped,
        Outcome::FailedAssertion { .. } => OutcomeKind::FailedAssertion,
        Outcome::Errored { .. } => OutcomeKind::Errored,
    }
}

pub fn failure_detail(result: &TestResult) -> Option<FailureDetail<'_>> {
    match &result.outcome {
        Outcome::Passed | Outcome::Skipped { .. } => None,
        Outcome::FailedAssertion { message } => Some(FailureDetail::Assertion { message }),
        Outcome::Errored { exception } => Some(FailureDetail::Error { exception }),
    }
}
