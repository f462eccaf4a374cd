//! Replays the lifecycle of a test run, as reported by a test-execution engine, into a
//! [Reporter].

use std::io::BufRead;

use anyhow::Context;
use documenter_reporting::{CompletedSummary, Reporter, ReportingError};
use documenter_utils::results::TestResult;
use serde_derive::{Deserialize, Serialize};

/// One line of an event stream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Start,
    Result(TestResult),
    Finish,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Result(_) => "result",
            Event::Finish => "finish",
        }
    }
}

enum Lifecycle<F> {
    NotStarted(F),
    Running(Box<dyn Reporter>),
    Finished(CompletedSummary),
}

impl<F> Lifecycle<F>
where
    F: FnOnce() -> Result<Box<dyn Reporter>, ReportingError>,
{
    fn describe(&self) -> &'static str {
        match self {
            Lifecycle::NotStarted(_) => "before the run started",
            Lifecycle::Running(_) => "while the run is in progress",
            Lifecycle::Finished(_) => "after the run finished",
        }
    }

    fn advance(self, event: Event) -> Result<Self, ReportingError> {
        match (self, event) {
            (Lifecycle::NotStarted(start), Event::Start) => Ok(Lifecycle::Running(start()?)),
            (Lifecycle::Running(mut reporter), Event::Result(result)) => {
                reporter.push_result(&result)?;
                Ok(Lifecycle::Running(reporter))
            }
            (Lifecycle::Running(reporter), Event::Finish) => {
                Ok(Lifecycle::Finished(reporter.finish()?))
            }
            (lifecycle, event) => Err(ReportingError::ContractViolation(format!(
                "`{}` event received {}",
                event.name(),
                lifecycle.describe()
            ))),
        }
    }
}

/// Feeds every event of `input` to the reporter built by `start`.
///
/// The stream must hold exactly one `start`, then any number of `result`s, then exactly one
/// `finish`. Blank lines are skipped.
pub fn replay<F>(input: impl BufRead, start: F) -> anyhow::Result<CompletedSummary>
where
    F: FnOnce() -> Result<Box<dyn Reporter>, ReportingError>,
{
    let mut lifecycle = Lifecycle::NotStarted(start);

    for (i, line) in input.lines().enumerate() {
        let line_number = i + 1;
        let line = line.with_context(|| format!("failed to read line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let event: Event = serde_json::from_str(&line)
            .with_context(|| format!("malformed event on line {line_number}"))?;
        tracing::debug!(line_number, event = event.name(), "replaying event");

        lifecycle = lifecycle
            .advance(event)
            .with_context(|| format!("unexpected event on line {line_number}"))?;
    }

    match lifecycle {
        Lifecycle::Finished(summary) => Ok(summary),
        unfinished => Err(ReportingError::ContractViolation(format!(
            "event stream ended {}",
            unfinished.describe()
        ))
        .into()),
    }
}

#[cfg(test)]
mod test {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use documenter_reporting::{CompletedSummary, Reporter, ReportingError};
    use documenter_test_utils::{errored, passed};
    use documenter_utils::results::TestResult;
    use indoc::indoc;

    use super::{replay, Event};

    #[derive(Default)]
    struct Recorded {
        started: bool,
        results: Vec<TestResult>,
        finished: bool,
    }

    struct RecordingReporter(Arc<Mutex<Recorded>>);

    impl Reporter for RecordingReporter {
        fn push_result(&mut self, result: &TestResult) -> Result<(), ReportingError> {
            self.0.lock().unwrap().results.push(result.clone());
            Ok(())
        }

        fn finish(self: Box<Self>) -> Result<CompletedSummary, ReportingError> {
            let mut recorded = self.0.lock().unwrap();
            recorded.finished = true;
            Ok(CompletedSummary {
                num_tests: recorded.results.len() as u64,
                num_errors: 0,
                num_failures: 0,
                num_skips: 0,
                elapsed: Duration::ZERO,
            })
        }
    }

    fn replay_recorded(input: &str) -> (anyhow::Result<CompletedSummary>, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let handle = Arc::clone(&recorded);
        let result = replay(input.as_bytes(), move || {
            handle.lock().unwrap().started = true;
            Ok(Box::new(RecordingReporter(handle.clone())) as Box<dyn Reporter>)
        });
        (result, recorded)
    }

    fn error_chain(error: anyhow::Error) -> String {
        format!("{error:#}")
    }

    #[test]
    fn parse_result_event() {
        let event: Event = serde_json::from_str(
            r#"{"event": "result", "group": "Calc", "name": "test_adds numbers", "status": "passed"}"#,
        )
        .unwrap();

        assert_eq!(event, Event::Result(passed("Calc", "test_adds numbers")));
    }

    #[test]
    fn parse_errored_result_event() {
        let event: Event = serde_json::from_str(indoc! {r#"
            {"event": "result", "group": "Calc", "name": "test_divides by zero", "status": "errored",
             "exception": {"type_name": "ZeroDivisionError", "message": "divided by 0",
                           "backtrace": ["calc.src:42:in 'divide'"]}}
        "#})
        .unwrap();

        assert_eq!(
            event,
            Event::Result(errored(
                "Calc",
                "test_divides by zero",
                "ZeroDivisionError",
                "divided by 0",
                &["calc.src:42:in 'divide'"],
            ))
        );
    }

    #[test]
    fn replay_full_lifecycle() {
        let (result, recorded) = replay_recorded(indoc! {r#"
            {"event": "start"}
            {"event": "result", "group": "Calc", "name": "test_a", "status": "passed"}

            {"event": "result", "group": "Calc", "name": "test_b", "status": "passed"}
            {"event": "finish"}
        "#});

        let summary = result.unwrap();
        assert_eq!(summary.num_tests, 2);

        let recorded = recorded.lock().unwrap();
        assert!(recorded.started);
        assert!(recorded.finished);
        assert_eq!(
            recorded.results,
            vec![passed("Calc", "test_a"), passed("Calc", "test_b")]
        );
    }

    #[test]
    fn replay_run_without_results() {
        let (result, recorded) = replay_recorded(indoc! {r#"
            {"event": "start"}
            {"event": "finish"}
        "#});

        assert_eq!(result.unwrap().num_tests, 0);
        assert!(recorded.lock().unwrap().finished);
    }

    #[test]
    fn result_before_start_is_a_violation() {
        let (result, recorded) = replay_recorded(indoc! {r#"
            {"event": "result", "group": "Calc", "name": "test_a", "status": "passed"}
        "#});

        insta::assert_snapshot!(
            error_chain(result.unwrap_err()),
            @"unexpected event on line 1: reporter lifecycle violated: `result` event received before the run started"
        );
        assert!(!recorded.lock().unwrap().started);
    }

    #[test]
    fn second_start_is_a_violation() {
        let (result, _) = replay_recorded(indoc! {r#"
            {"event": "start"}
            {"event": "start"}
        "#});

        insta::assert_snapshot!(
            error_chain(result.unwrap_err()),
            @"unexpected event on line 2: reporter lifecycle violated: `start` event received while the run is in progress"
        );
    }

    #[test]
    fn result_after_finish_is_a_violation() {
        let (result, recorded) = replay_recorded(indoc! {r#"
            {"event": "start"}
            {"event": "finish"}
            {"event": "result", "group": "Calc", "name": "test_a", "status": "passed"}
        "#});

        insta::assert_snapshot!(
            error_chain(result.unwrap_err()),
            @"unexpected event on line 3: reporter lifecycle violated: `result` event received after the run finished"
        );
        assert!(recorded.lock().unwrap().results.is_empty());
    }

    #[test]
    fn stream_ending_before_finish_is_a_violation() {
        let (result, recorded) = replay_recorded(indoc! {r#"
            {"event": "start"}
            {"event": "result", "group": "Calc", "name": "test_a", "status": "passed"}
        "#});

        insta::assert_snapshot!(
            error_chain(result.unwrap_err()),
            @"reporter lifecycle violated: event stream ended while the run is in progress"
        );
        assert!(!recorded.lock().unwrap().finished);
    }

    #[test]
    fn malformed_result_is_fatal() {
        let (result, _) = replay_recorded(indoc! {r#"
            {"event": "start"}
            {"event": "result", "group": "Calc", "name": "test_a", "status": "failed_assertion"}
            {"event": "finish"}
        "#});

        let error = error_chain(result.unwrap_err());
        assert!(
            error.starts_with("malformed event on line 2: "),
            "unexpected error: {error}"
        );
    }
}
