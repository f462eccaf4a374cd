//! Test results as handed off by a test-execution engine.
//!
//! A result's [Outcome] decides exactly which failure details it carries, so a result whose
//! outcome disagrees with its fields cannot be built. At the wire boundary, such a result is
//! rejected during deserialization.

use serde_derive::{Deserialize, Serialize};

/// One completed test execution.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    /// The enclosing test group, e.g. a suite or class name.
    pub group: String,
    /// The test case, conventionally `"<verb>_<description words>"` or
    /// `"<verb> <description words>"`.
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl TestResult {
    pub fn new(group: impl Into<String>, name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            outcome,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// An explicit test success.
    Passed,
    /// A test that was explicitly skipped.
    Skipped {
        #[serde(default)]
        reason: Option<String>,
    },
    /// An explicit test failure, from an assertion.
    FailedAssertion { message: String },
    /// An erroring execution of a test.
    Errored { exception: Exception },
}

/// An unexpected exception raised while running a test.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    pub type_name: String,
    pub message: String,
    /// Raw stack frames, innermost first.
    #[serde(default)]
    pub backtrace: Vec<String>,
}
