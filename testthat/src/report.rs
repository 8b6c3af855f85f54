//! Console report of a run
//!
//! The text format prints one line per failure followed by a count line:
//!
//! ```text
//! FAIL src/main.rs:12: [Sample unit tests] two plus two equals four: expect_true(2 + 2 == 5)
//! FAIL [Sample unit tests] broken: fatal: panicked: boom
//! 0 passed, 2 failed.
//! ```
use std::borrow::Cow;
use std::io::Write;

use clap::ValueEnum;
use error_stack::{Result, ResultExt};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::registry::Registry;
use crate::runner::{Failure, FailureKind, RunSummary};

/// Output format of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// One line per failure and a final count line
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Write the report of a run in the given format
pub fn write_report(
    out: &mut impl Write,
    summary: &RunSummary,
    format: Format,
) -> Result<(), Error> {
    match format {
        Format::Text => write_text(out, summary).change_context(Error::Report),
        Format::Json => write_json(out, summary).change_context(Error::Report),
    }
}

pub fn write_text(out: &mut impl Write, summary: &RunSummary) -> std::io::Result<()> {
    for failure in &summary.failures {
        writeln!(out, "{}", failure_line(failure))?;
    }
    writeln!(out, "{} passed, {} failed.", summary.passed, summary.failed)?;
    out.flush()
}

pub fn write_json(out: &mut impl Write, summary: &RunSummary) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out).map_err(serde_json::Error::io)
}

/// Write `<context>/<test>` for every registered test case
pub fn write_list(out: &mut impl Write, registry: &Registry) -> std::io::Result<()> {
    for context in registry.contexts() {
        for case in context.cases() {
            writeln!(out, "{}/{}", context.name(), case.name())?;
        }
    }
    out.flush()
}

/// Format a failure as a single report line
pub fn failure_line(failure: &Failure) -> String {
    let context = single_line(&failure.context);
    let test = single_line(&failure.test);
    match &failure.kind {
        FailureKind::Assertion {
            assertion,
            expression,
            location,
        } => format!(
            "FAIL {}: [{}] {}: {}({})",
            location,
            context,
            test,
            assertion,
            single_line(expression)
        ),
        FailureKind::Fatal { message } => {
            format!("FAIL [{}] {}: fatal: {}", context, test, single_line(message))
        }
    }
}

/// Escape line breaks so every failure stays on one line
fn single_line(s: &str) -> Cow<'_, str> {
    if s.contains(|c: char| c == '\n' || c == '\r') {
        Cow::Owned(s.replace('\r', "\\r").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{AssertionKind, Location};

    fn assertion_failure(expression: &str) -> Failure {
        Failure {
            context: "Sample unit tests".to_string(),
            test: "two plus two equals four".to_string(),
            kind: FailureKind::Assertion {
                assertion: AssertionKind::ExpectTrue,
                expression: expression.to_string(),
                location: Location {
                    file: "src/main.rs".to_string(),
                    line: 12,
                    column: 9,
                },
            },
        }
    }

    fn summary() -> RunSummary {
        RunSummary {
            total: 2,
            passed: 0,
            failed: 2,
            skipped: 0,
            failures: vec![
                assertion_failure("2 + 2 == 5"),
                Failure {
                    context: "Sample unit tests".to_string(),
                    test: "broken".to_string(),
                    kind: FailureKind::Fatal {
                        message: "panicked: boom".to_string(),
                    },
                },
            ],
            cases: vec![],
        }
    }

    #[test]
    fn text_report() {
        let mut out = Vec::new();
        write_text(&mut out, &summary()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "FAIL src/main.rs:12: [Sample unit tests] two plus two equals four: expect_true(2 + 2 == 5)\n\
             FAIL [Sample unit tests] broken: fatal: panicked: boom\n\
             0 passed, 2 failed.\n"
        );
    }

    #[test]
    fn text_report_all_passed() {
        let summary = RunSummary {
            total: 1,
            passed: 1,
            ..Default::default()
        };
        let mut out = Vec::new();
        write_text(&mut out, &summary).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 passed, 0 failed.\n");
    }

    #[test]
    fn failure_line_escapes_newlines() {
        let line = failure_line(&assertion_failure("a ==\nb"));
        assert!(line.ends_with("expect_true(a ==\\nb)"), "{}", line);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn json_report() {
        let mut out = Vec::new();
        write_report(&mut out, &summary(), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["failed"], 2);
        assert_eq!(value["failures"][0]["type"], "assertion");
        assert_eq!(value["failures"][0]["assertion"], "expect_true");
        assert_eq!(value["failures"][0]["location"]["line"], 12);
        assert_eq!(value["failures"][1]["type"], "fatal");
        assert_eq!(value["failures"][1]["message"], "panicked: boom");
    }

    #[test]
    fn list_registered_cases() {
        let mut registry = Registry::new();
        registry.declare_context("a").unwrap();
        registry.declare_test_case("a", "one", |_| {}).unwrap();
        registry.declare_test_case("a", "two", |_| {}).unwrap();
        let mut out = Vec::new();
        write_list(&mut out, &registry).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a/one\na/two\n");
    }
}
