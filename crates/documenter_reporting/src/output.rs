use std::{io, sync::OnceLock, time::Duration};

use crate::{classify::OutcomeKind, CompletedSummary};
use documenter_utils::results::{Exception, TestResult};
use regex::Regex;
use termcolor::{Color, ColorSpec, WriteColor};

const INDENT: &str = "  ";

pub const FAULTY_LINES_HEADER: &str = "Top backtrace lines from our code:";

/// Rewrites a nested group path into display punctuation.
///
/// `Calc::.divide` becomes `Calc.divide`, `Calc::#divide` becomes `Calc#divide`,
/// `Calc::(slow)` becomes `Calc (slow)`, and `Calc::when dividing` becomes `Calc when dividing`.
pub fn display_group(group: &str) -> String {
    static NESTED_DESCRIPTION: OnceLock<Regex> = OnceLock::new();
    let nested_description = NESTED_DESCRIPTION
        .get_or_init(|| Regex::new("::([a-z])").expect("nested description pattern is valid"));

    let group = group
        .replace("::.", ".")
        .replace("::#", "#")
        .replace("::(", " (");
    nested_description
        .replace_all(&group, " $1")
        .into_owned()
}

/// Splits a display header before its first `.` or `#`. A separator leading the header never
/// splits it, so the group part is never empty.
pub fn split_header(header: &str) -> (&str, &str) {
    let separator = header
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '.' || c == '#');
    match separator {
        Some((at, _)) => header.split_at(at),
        None => (header, ""),
    }
}

/// Turns a test name like `test_0001_adds numbers` into `adds numbers`.
pub fn test_description(name: &str) -> String {
    let mut words = name.split_whitespace();
    let verb = words
        .next()
        .and_then(|first| first.rsplit('_').find(|segment| !segment.is_empty()))
        .unwrap_or_default();
    let phrase = words.collect::<Vec<_>>().join(" ");

    format!("{verb} {phrase}")
}

/// Formats the header introducing a group, preceded by a blank line.
pub fn format_group_header(writer: &mut impl WriteColor, header: &str) -> io::Result<()> {
    // {bold}Calc{reset}{white}#divide{reset}

    let (group, case) = split_header(header);

    writeln!(writer)?;
    with_color_spec(writer, &bold_spec(), |w| write!(w, "{group}"))?;
    if !case.is_empty() {
        with_color(writer, Color::White, |w| write!(w, "{case}"))?;
    }
    writeln!(writer)
}

/// Formats a test result on a single, indented line.
pub fn format_result_line(
    writer: &mut impl WriteColor,
    result: &TestResult,
    kind: OutcomeKind,
) -> io::Result<()> {
    let color = if kind.is_passed() {
        Color::Green
    } else {
        Color::Red
    };

    write!(writer, "{INDENT}")?;
    with_color(writer, color, |w| {
        write!(w, "{}", test_description(&result.name))
    })?;
    writeln!(writer)
}

/// Formats an unexpected exception and its relevant backtrace.
///
/// The frame at `local_frame`, if any, is highlighted as the innermost frame from the code under
/// test.
pub fn format_error_detail(
    writer: &mut impl WriteColor,
    exception: &Exception,
    frames: &[&str],
    local_frame: Option<usize>,
) -> io::Result<()> {
    write!(writer, "{INDENT}")?;
    with_color_spec(writer, &bold_spec(), |w| {
        write!(w, "{}", exception.type_name)
    })?;
    writeln!(writer)?;

    format_indented_lines(writer, &exception.message)?;

    for (i, frame) in frames.iter().enumerate() {
        write!(writer, "{INDENT}")?;
        if Some(i) == local_frame {
            with_color(writer, Color::White, |w| write!(w, "{frame}"))?;
        } else {
            write!(writer, "{frame}")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Formats a message with every line indented, preserving line breaks.
pub fn format_message_detail(writer: &mut impl WriteColor, message: &str) -> io::Result<()> {
    format_indented_lines(writer, message)
}

fn format_indented_lines(writer: &mut impl io::Write, text: &str) -> io::Result<()> {
    for line in text.lines() {
        writeln!(writer, "{INDENT}{line}")?;
    }
    Ok(())
}

/// Formats the totals of a run.
pub fn format_run_summary(
    writer: &mut impl WriteColor,
    summary: &CompletedSummary,
) -> io::Result<()> {
    // {num_tests} tests run in {elapsed} seconds.
    // Errors: {num_errors} | Failures: {num_failures} | Skips: {num_skips}

    let CompletedSummary {
        num_tests,
        num_errors,
        num_failures,
        num_skips,
        elapsed,
    } = *summary;

    write!(writer, "{num_tests} tests run in ")?;
    with_color_spec(writer, &bold_spec(), |w| {
        format_elapsed_seconds(w, elapsed)
    })?;
    writeln!(writer, " seconds.")?;

    format_counter(writer, "Errors", num_errors, Color::Red)?;
    format_divider(writer)?;
    format_counter(writer, "Failures", num_failures, Color::Red)?;
    format_divider(writer)?;
    format_counter(writer, "Skips", num_skips, Color::Yellow)?;
    writeln!(writer)
}

/// Formats ranked `(location, count)` entries of the faulty-line tally.
pub fn format_faulty_lines(
    writer: &mut impl io::Write,
    ranked: &[(&str, u64)],
) -> io::Result<()> {
    writeln!(writer, "{FAULTY_LINES_HEADER}")?;
    for (location, count) in ranked {
        writeln!(writer, "{count}:\t{location}")?;
    }
    Ok(())
}

fn format_counter(
    writer: &mut impl WriteColor,
    label: &str,
    count: u64,
    nonzero_color: Color,
) -> io::Result<()> {
    with_color_spec(writer, &counter_spec(count, nonzero_color), |w| {
        write!(w, "{label}: {count}")
    })
}

fn format_divider(writer: &mut impl WriteColor) -> io::Result<()> {
    with_color_spec(writer, &white_bold_spec(), |w| write!(w, " | "))
}

const MILLIS_IN_SECOND: u64 = 1000;

pub fn format_elapsed_seconds(writer: &mut impl io::Write, duration: Duration) -> io::Result<()> {
    let millis = duration.as_millis() as f64;
    let seconds = millis / (MILLIS_IN_SECOND as f64);
    write!(writer, "{seconds:.2}")
}

#[inline]
fn bold_spec() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_bold(true);
    spec
}

#[inline]
fn white_bold_spec() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::White)).set_bold(true);
    spec
}

#[inline]
fn counter_spec(count: u64, nonzero_color: Color) -> ColorSpec {
    let color = if count > 0 { nonzero_color } else { Color::White };
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(true);
    spec
}

#[inline]
fn with_color<W>(
    writer: &mut W,
    color: Color,
    f: impl FnOnce(&mut W) -> io::Result<()>,
) -> io::Result<()>
where
    W: WriteColor,
{
    with_color_spec(writer, ColorSpec::new().set_fg(Some(color)), f)
}

#[inline]
fn with_color_spec<W>(
    writer: &mut W,
    color_spec: &ColorSpec,
    f: impl FnOnce(&mut W) -> io::Result<()>,
) -> io::Result<()>
where
    W: WriteColor,
{
    writer.set_color(color_spec)?;
    f(writer)?;
    writer.reset()
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use documenter_test_utils::{color_writer::TestColorWriter, errored, failed, passed, skipped};
    use documenter_utils::results::Exception;

    use crate::{classify::OutcomeKind, CompletedSummary};

    use super::{
        display_group, format_elapsed_seconds, format_error_detail, format_faulty_lines,
        format_group_header, format_message_detail, format_result_line, format_run_summary,
        split_header, test_description,
    };

    macro_rules! test_format {
        ($name:ident, $fn:ident, $($item:expr),+ ; @$expect_colored:literal) => {
            #[test]
            fn $name() {
                // Test colored output
                let mut buf = TestColorWriter::new(vec![]);
                $fn(&mut buf, $($item),+).unwrap();
                let formatted = String::from_utf8(buf.into_inner()).unwrap();
                insta::assert_snapshot!(formatted, @$expect_colored);
            }
        };
        // Leading whitespace is significant, so compare exactly.
        ($name:ident, $fn:ident, $($item:expr),+ ; == $expect_colored:expr) => {
            #[test]
            fn $name() {
                let mut buf = TestColorWriter::new(vec![]);
                $fn(&mut buf, $($item),+).unwrap();
                let formatted = String::from_utf8(buf.into_inner()).unwrap();
                assert_eq!(formatted, $expect_colored);
            }
        };
    }

    fn exception(message: &str) -> Exception {
        Exception {
            type_name: "ZeroDivisionError".to_owned(),
            message: message.to_owned(),
            backtrace: vec![],
        }
    }

    fn summary(num_errors: u64, num_failures: u64, num_skips: u64) -> CompletedSummary {
        CompletedSummary {
            num_tests: 12,
            num_errors,
            num_failures,
            num_skips,
            elapsed: Duration::from_millis(1_500),
        }
    }

    #[test]
    fn display_group_collapses_nested_markers() {
        assert_eq!(display_group("Calc"), "Calc");
        assert_eq!(display_group("Calc::.divide"), "Calc.divide");
        assert_eq!(display_group("Calc::#divide"), "Calc#divide");
        assert_eq!(display_group("Calc::(slow)"), "Calc (slow)");
        assert_eq!(display_group("Calc::when dividing"), "Calc when dividing");
        assert_eq!(display_group("Math::Calc"), "Math::Calc");
        assert_eq!(
            display_group("Calc::when dividing::#by zero"),
            "Calc when dividing#by zero"
        );
    }

    #[test]
    fn split_header_at_first_separator() {
        assert_eq!(split_header("Calc"), ("Calc", ""));
        assert_eq!(split_header("Calc.divide"), ("Calc", ".divide"));
        assert_eq!(split_header("Calc#divide.by"), ("Calc", "#divide.by"));
        assert_eq!(split_header("Calc when x.y#z"), ("Calc when x", ".y#z"));
        assert_eq!(split_header(".lead"), (".lead", ""));
        assert_eq!(split_header("#divide.by"), ("#divide", ".by"));
    }

    #[test]
    fn test_description_from_name() {
        assert_eq!(test_description("test_adds numbers"), "adds numbers");
        assert_eq!(test_description("test_0001_adds two numbers"), "adds two numbers");
        assert_eq!(test_description("it  works   fine"), "it works fine");
        assert_eq!(test_description("test_adds_numbers"), "numbers ");
        assert_eq!(test_description("test_ends_with_"), "with ");
        assert_eq!(test_description(""), " ");
    }

    test_format!(
        format_header_without_separator, format_group_header,
        "Calc";
        == "\n<bold>Calc<reset>\n"
    );

    test_format!(
        format_header_with_case, format_group_header,
        "Calc#divide";
        == "\n<bold>Calc<reset><white>#divide<reset>\n"
    );

    test_format!(
        format_header_with_leading_separator, format_group_header,
        ".lead";
        == "\n<bold>.lead<reset>\n"
    );

    test_format!(
        format_line_passed, format_result_line,
        &passed("Calc", "test_adds numbers"), OutcomeKind::Passed;
        == "  <green>adds numbers<reset>\n"
    );

    test_format!(
        format_line_failed, format_result_line,
        &failed("Calc", "test_adds numbers", "1 != 2"), OutcomeKind::FailedAssertion;
        == "  <red>adds numbers<reset>\n"
    );

    test_format!(
        format_line_skipped, format_result_line,
        &skipped("Calc", "test_0002_adds numbers", None), OutcomeKind::Skipped;
        == "  <red>adds numbers<reset>\n"
    );

    test_format!(
        format_line_errored, format_result_line,
        &errored("Calc", "test_divides by zero", "ZeroDivisionError", "divided by 0", &[]),
        OutcomeKind::Errored;
        == "  <red>divides by zero<reset>\n"
    );

    test_format!(
        format_error_highlighting_local_frame, format_error_detail,
        &exception("divided by 0"),
        &["calc.src:42:in 'divide'", "runner.src:10:in 'run'"],
        Some(0);
        == concat!(
            "  <bold>ZeroDivisionError<reset>\n",
            "  divided by 0\n",
            "  <white>calc.src:42:in 'divide'<reset>\n",
            "  runner.src:10:in 'run'\n",
        )
    );

    test_format!(
        format_error_without_local_frame, format_error_detail,
        &exception("divided by 0"),
        &["<internal>"],
        None;
        == concat!(
            "  <bold>ZeroDivisionError<reset>\n",
            "  divided by 0\n",
            "  <internal>\n",
        )
    );

    test_format!(
        format_error_multiline_message, format_error_detail,
        &exception("divided by 0\nwhile computing totals"),
        &[],
        None;
        == concat!(
            "  <bold>ZeroDivisionError<reset>\n",
            "  divided by 0\n",
            "  while computing totals\n",
        )
    );

    test_format!(
        format_message_preserves_lines, format_message_detail,
        "Expected: 3\n  Actual: 4\n";
        == "  Expected: 3\n    Actual: 4\n"
    );

    test_format!(
        format_empty_message, format_message_detail,
        "";
        == ""
    );

    test_format!(
        format_summary_all_zero, format_run_summary,
        &summary(0, 0, 0);
        @r###"
    12 tests run in <bold>1.50<reset> seconds.
    <bold-white>Errors: 0<reset><bold-white> | <reset><bold-white>Failures: 0<reset><bold-white> | <reset><bold-white>Skips: 0<reset>
    "###
    );

    test_format!(
        format_summary_nonzero, format_run_summary,
        &summary(1, 2, 3);
        @r###"
    12 tests run in <bold>1.50<reset> seconds.
    <bold-red>Errors: 1<reset><bold-white> | <reset><bold-red>Failures: 2<reset><bold-white> | <reset><bold-yellow>Skips: 3<reset>
    "###
    );

    test_format!(
        format_ranked_faulty_lines, format_faulty_lines,
        &[("a:1", 3), ("a:2", 3), ("b:5", 1)];
        @r###"
    Top backtrace lines from our code:
    3:	a:1
    3:	a:2
    1:	b:5
    "###
    );

    test_format!(
        format_elapsed_subsecond, format_elapsed_seconds,
        Duration::from_millis(35);
        @"0.04"
    );

    test_format!(
        format_elapsed_minutes, format_elapsed_seconds,
        Duration::from_millis(6 * 60 * 1000 + 52 * 1000 + 35);
        @"412.04"
    );
}
