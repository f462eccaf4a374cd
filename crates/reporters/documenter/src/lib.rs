use std::{io, time::Instant};

use documenter_reporting::{
    classify::{classify, failure_detail, FailureDetail, OutcomeKind},
    faulty_lines::FaultyLines,
    output::{
        display_group, format_error_detail, format_faulty_lines, format_group_header,
        format_message_detail, format_result_line, format_run_summary,
    },
    CompletedSummary, Reporter, ReportingError,
};
use documenter_utils::{
    backtrace::BacktraceFilter,
    results::{Outcome, TestResult},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReporterOptions {
    /// Print the reason a test was skipped beneath its status line.
    pub render_skip_reasons: bool,
}

struct RunState {
    start_time: Instant,
    /// Every result seen so far.
    count: u64,
    /// Results that did not pass, in arrival order.
    non_passing: Vec<TestResult>,
    last_rendered_group: Option<String>,
}

impl RunState {
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            count: 0,
            non_passing: Vec::new(),
            last_rendered_group: None,
        }
    }

    fn summarize(&self) -> CompletedSummary {
        let mut summary = CompletedSummary {
            num_tests: self.count,
            num_errors: 0,
            num_failures: 0,
            num_skips: 0,
            elapsed: self.start_time.elapsed(),
        };
        for result in &self.non_passing {
            match classify(result) {
                OutcomeKind::Errored => summary.num_errors += 1,
                OutcomeKind::FailedAssertion => summary.num_failures += 1,
                OutcomeKind::Skipped => summary.num_skips += 1,
                OutcomeKind::Passed => debug_assert!(false, "passing results are never retained"),
            }
        }
        summary
    }
}

/// Documents test results as they arrive: one header per group, one line per test, and the
/// details of every failure. Once all results are in, prints the run totals and the source lines
/// that failures most often trace back to.
pub struct DocumenterReporter {
    /// The output buffer.
    buffer: Box<dyn termcolor::WriteColor + Send>,

    /// Decides which backtrace frames belong to the code under test.
    backtrace_filter: Box<dyn BacktraceFilter>,

    options: ReporterOptions,

    state: RunState,

    faulty_lines: FaultyLines,
}

impl DocumenterReporter {
    /// Starts a test run, reporting to `buffer`.
    pub fn start(
        mut buffer: Box<dyn termcolor::WriteColor + Send>,
        backtrace_filter: Box<dyn BacktraceFilter>,
        options: ReporterOptions,
    ) -> Result<Self, ReportingError> {
        writeln!(buffer)?;
        tracing::debug!(?options, "test run started");

        Ok(Self {
            buffer,
            backtrace_filter,
            options,
            state: RunState::new(),
            faulty_lines: FaultyLines::new(),
        })
    }

    fn render(&mut self, result: &TestResult, kind: OutcomeKind) -> io::Result<()> {
        let header = display_group(&result.group);
        if self.state.last_rendered_group.as_deref() != Some(header.as_str()) {
            format_group_header(&mut self.buffer, &header)?;
            self.state.last_rendered_group = Some(header);
        }

        format_result_line(&mut self.buffer, result, kind)?;

        match failure_detail(result) {
            Some(FailureDetail::Error { exception }) => {
                let frames = self.backtrace_filter.filter(&exception.backtrace);
                let local_frame = self.faulty_lines.record(&frames);

                writeln!(self.buffer)?;
                format_error_detail(&mut self.buffer, exception, &frames, local_frame)?;
                writeln!(self.buffer)?;
            }
            Some(FailureDetail::Assertion { message }) => {
                writeln!(self.buffer)?;
                format_message_detail(&mut self.buffer, message)?;
                writeln!(self.buffer)?;
            }
            None => {
                if let Outcome::Skipped { reason } = &result.outcome {
                    writeln!(self.buffer)?;
                    if let (Some(reason), true) = (reason, self.options.render_skip_reasons) {
                        format_message_detail(&mut self.buffer, reason)?;
                        writeln!(self.buffer)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Reporter for DocumenterReporter {
    fn push_result(&mut self, result: &TestResult) -> Result<(), ReportingError> {
        let kind = classify(result);
        tracing::debug!(group = %result.group, name = %result.name, outcome = ?kind, "reporting test result");

        self.render(result, kind)?;

        self.state.count += 1;
        if !kind.is_passed() {
            self.state.non_passing.push(result.clone());
        }

        // Results are reported as they complete, never held back.
        self.buffer
            .flush()
            .map_err(|_| ReportingError::FailedToWrite)?;

        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<CompletedSummary, ReportingError> {
        let summary = self.state.summarize();

        writeln!(self.buffer)?;
        format_run_summary(&mut self.buffer, &summary)?;
        writeln!(self.buffer)?;

        if !self.faulty_lines.is_empty() {
            format_faulty_lines(&mut self.buffer, &self.faulty_lines.report())?;
        }

        self.buffer
            .flush()
            .map_err(|_| ReportingError::FailedToWrite)?;

        tracing::debug!(?summary, "test run finished");

        Ok(summary)
    }
}
