use documenter_utils::results::{Exception, Outcome, TestResult};
use regex::Regex;

pub mod color_writer;

/// Replaces the wall-clock time of a run summary, which differs on every run.
pub fn redact_elapsed(output: &str) -> String {
    let re = Regex::new(r"(tests run in (?:<bold>)?)\d+\.\d{2}").unwrap();
    re.replace_all(output, "${1}[elapsed]").into_owned()
}

pub fn passed(group: &str, name: &str) -> TestResult {
    TestResult::new(group, name, Outcome::Passed)
}

pub fn skipped(group: &str, name: &str, reason: Option<&str>) -> TestResult {
    TestResult::new(
        group,
        name,
        Outcome::Skipped {
            reason: reason.map(ToOwned::to_owned),
        },
    )
}

pub fn failed(group: &str, name: &str, message: &str) -> TestResult {
    TestResult::new(
        group,
        name,
        Outcome::FailedAssertion {
            message: message.to_owned(),
        },
    )
}

pub fn errored(
    group: &str,
    name: &str,
    type_name: &str,
    message: &str,
    backtrace: &[&str],
) -> TestResult {
    TestResult::new(
        group,
        name,
        Outcome::Errored {
            exception: Exception {
                type_name: type_name.to_owned(),
                message: message.to_owned(),
                backtrace: backtrace.iter().map(|s| s.to_string()).collect(),
            },
        },
    )
}
