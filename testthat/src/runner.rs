//! Sequential execution of registered test cases
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use error_stack::{Result, ResultExt};
use regex::Regex;
use serde::Serialize;
use testthat_common::{errorln, infoln, verboseln};

use crate::assertion::{AssertionKind, AssertionResult, Execution, Location};
use crate::error::Error;
use crate::registry::{Registry, Status, TestCase};

/// Which test cases a run should execute
///
/// Patterns are matched against the path `<context>/<test>`.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    filter: Option<Regex>,
    skip: Vec<Regex>,
}

impl Selection {
    /// Select every test case
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a selection from a filter regex and skip regexes
    pub fn new(filter: Option<&str>, skip: &[String]) -> Result<Self, Error> {
        let filter = filter.map(compile).transpose()?;
        let skip = skip
            .iter()
            .map(|s| compile(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { filter, skip })
    }

    /// Check if the test case should run
    pub fn is_selected(&self, context: &str, test: &str) -> bool {
        let path = format!("{}/{}", context, test);
        if let Some(filter) = &self.filter {
            if !filter.is_match(&path) {
                return false;
            }
        }
        !self.skip.iter().any(|s| s.is_match(&path))
    }
}

fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).change_context_lazy(|| Error::Filter(pattern.to_string()))
}

/// Runs test cases of a [`Registry`] on the calling thread
#[derive(Debug, Clone, Default)]
pub struct Runner {
    selection: Selection,
}

impl Runner {
    pub fn new(selection: Selection) -> Self {
        Self { selection }
    }

    /// Run every selected test case, in registration order
    ///
    /// Never stops early. Assertion failures, panics and errors returned
    /// from a body only fail the test case they happen in.
    pub fn run(&self, registry: &mut Registry) -> RunSummary {
        let mut summary = RunSummary::default();
        for context in registry.contexts_mut() {
            infoln!("Running", "{}", context.name);
            for case in &mut context.cases {
                if !self.selection.is_selected(&context.name, &case.name) {
                    verboseln!("skipping [{}] {}", context.name, case.name);
                    case.status = Status::NotRun;
                    summary.skipped += 1;
                    summary.cases.push(CaseOutcome {
                        context: context.name.clone(),
                        test: case.name.clone(),
                        status: Status::NotRun,
                        assertions: vec![],
                        fatal: None,
                    });
                    continue;
                }
                let outcome = run_case(&context.name, case);
                summary.record(outcome);
            }
        }
        summary
    }
}

impl Registry {
    /// Run every registered test case. See [`Runner::run`]
    pub fn run_all(&mut self) -> RunSummary {
        Runner::default().run(self)
    }
}

fn run_case(context: &str, case: &mut TestCase) -> CaseOutcome {
    verboseln!("running [{}] {}", context, case.name);
    let mut execution = Execution::new();
    let body = &case.body;
    let fatal = match panic::catch_unwind(AssertUnwindSafe(|| body(&mut execution))) {
        Ok(fatal) => fatal,
        Err(payload) => Some(panic_message(payload.as_ref())),
    };
    let assertions = execution.into_results();

    let status = if fatal.is_some() || assertions.iter().any(|a| !a.passed) {
        Status::Failed
    } else {
        Status::Passed
    };
    case.status = status;
    match status {
        Status::Failed => errorln!("Failed", "[{}] {}", context, case.name),
        _ => verboseln!("passed [{}] {}", context, case.name),
    }

    CaseOutcome {
        context: context.to_string(),
        test: case.name.clone(),
        status,
        assertions,
        fatal,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));
    match message {
        Some(message) => format!("panicked: {}", message),
        None => "panicked with a non-string payload".to_string(),
    }
}

/// Record of one test case from a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseOutcome {
    pub context: String,
    pub test: String,
    pub status: Status,
    pub assertions: Vec<AssertionResult>,
    /// Message if the body panicked or returned an error
    pub fatal: Option<String>,
}

/// A single failure to report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub context: String,
    pub test: String,
    #[serde(flatten)]
    pub kind: FailureKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureKind {
    /// An assertion evaluated to the unexpected value
    Assertion {
        assertion: AssertionKind,
        expression: String,
        location: Location,
    },
    /// The test case body panicked or returned an error
    Fatal { message: String },
}

/// Aggregated result of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of test cases executed
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Number of test cases not selected for the run
    pub skipped: usize,
    /// One entry per failed assertion or fatal error, in execution order
    pub failures: Vec<Failure>,
    /// Every test case visited, in execution order
    pub cases: Vec<CaseOutcome>,
}

impl RunSummary {
    /// True if no test case failed
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, outcome: CaseOutcome) {
        self.total += 1;
        match outcome.status {
            Status::Passed => self.passed += 1,
            _ => self.failed += 1,
        }
        for assertion in outcome.assertions.iter().filter(|a| !a.passed) {
            self.failures.push(Failure {
                context: outcome.context.clone(),
                test: outcome.test.clone(),
                kind: FailureKind::Assertion {
                    assertion: assertion.kind,
                    expression: assertion.expression.clone(),
                    location: assertion.location.clone(),
                },
            });
        }
        if let Some(message) = &outcome.fatal {
            self.failures.push(Failure {
                context: outcome.context.clone(),
                test: outcome.test.clone(),
                kind: FailureKind::Fatal {
                    message: message.clone(),
                },
            });
        }
        self.cases.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::{expect_false, expect_true};

    fn two_plus_two() -> i32 {
        2 + 2
    }

    #[test]
    fn sample_passes() {
        let mut registry = Registry::new();
        registry.declare_context("Sample unit tests").unwrap();
        registry
            .declare_test_case("Sample unit tests", "two plus two equals four", |t| {
                expect_true!(t, two_plus_two() == 4);
            })
            .unwrap();

        let summary = registry.run_all();
        assert_eq!((summary.total, summary.passed, summary.failed), (1, 1, 0));
        assert!(summary.failures.is_empty());
        assert!(summary.is_success());
        let case = &registry.find("Sample unit tests").unwrap().cases()[0];
        assert_eq!(case.status(), Status::Passed);
    }

    #[test]
    fn sample_fails() {
        let mut registry = Registry::new();
        registry.declare_context("Sample unit tests").unwrap();
        registry
            .declare_test_case("Sample unit tests", "two plus two equals four", |t| {
                expect_true!(t, 2 + 2 == 5);
            })
            .unwrap();

        let summary = registry.run_all();
        assert_eq!((summary.total, summary.passed, summary.failed), (1, 0, 1));
        assert!(!summary.is_success());
        assert_eq!(summary.failures.len(), 1);
        let failure = &summary.failures[0];
        assert_eq!(failure.context, "Sample unit tests");
        assert_eq!(failure.test, "two plus two equals four");
        match &failure.kind {
            FailureKind::Assertion {
                assertion,
                expression,
                location,
            } => {
                assert_eq!(*assertion, AssertionKind::ExpectTrue);
                assert_eq!(expression, "2 + 2 == 5");
                assert!(location.file.ends_with("runner.rs"), "{}", location.file);
            }
            other => panic!("unexpected failure kind: {:?}", other),
        }
    }

    #[test]
    fn runs_every_case_once_in_order() {
        let order = Rc::new(RefCell::new(vec![]));
        let mut registry = Registry::new();
        for context in ["a", "b"] {
            registry.declare_context(context).unwrap();
            for test in ["1", "2", "3"] {
                let order = Rc::clone(&order);
                let path = format!("{}/{}", context, test);
                registry
                    .declare_test_case(context, test, move |_| {
                        order.borrow_mut().push(path.clone());
                    })
                    .unwrap();
            }
        }

        let summary = registry.run_all();
        assert_eq!(summary.total, 6);
        assert_eq!(
            *order.borrow(),
            vec!["a/1", "a/2", "a/3", "b/1", "b/2", "b/3"]
        );
        let visited: Vec<_> = summary
            .cases
            .iter()
            .map(|c| format!("{}/{}", c.context, c.test))
            .collect();
        assert_eq!(visited, *order.borrow());
    }

    #[test]
    fn one_failure_entry_per_failed_assertion() {
        let mut registry = Registry::new();
        registry.declare_context("ctx").unwrap();
        registry
            .declare_test_case("ctx", "many", |t| {
                expect_true!(t, 1 > 2);
                expect_true!(t, 1 < 2);
                expect_false!(t, 1 < 2);
            })
            .unwrap();
        registry
            .declare_test_case("ctx", "after", |t| {
                expect_true!(t, true);
            })
            .unwrap();

        let summary = registry.run_all();
        assert_eq!((summary.total, summary.passed, summary.failed), (2, 1, 1));
        assert_eq!(summary.failures.len(), 2);
        assert!(summary.failures.iter().all(|f| f.test == "many"));
        assert_eq!(summary.cases[0].assertions.len(), 3);
    }

    #[test]
    fn fatal_errors_are_isolated() {
        let mut registry = Registry::new();
        registry.declare_context("first").unwrap();
        registry.declare_context("second").unwrap();
        registry
            .declare_test_case("first", "panics", |t| -> () {
                expect_true!(t, false);
                panic!("boom");
            })
            .unwrap();
        registry
            .declare_test_case("first", "returns error", |_| -> std::result::Result<(), String> {
                Err("nope".to_string())
            })
            .unwrap();
        registry
            .declare_test_case("first", "after", |t| {
                expect_true!(t, true);
            })
            .unwrap();
        registry
            .declare_test_case("second", "later", |t| {
                expect_false!(t, false);
            })
            .unwrap();

        let summary = registry.run_all();
        assert_eq!((summary.total, summary.passed, summary.failed), (4, 2, 2));

        let kinds: Vec<_> = summary.failures.iter().map(|f| &f.kind).collect();
        assert_eq!(kinds.len(), 3);
        assert!(matches!(kinds[0], FailureKind::Assertion { .. }));
        assert_eq!(
            kinds[1],
            &FailureKind::Fatal {
                message: "panicked: boom".to_string()
            }
        );
        assert_eq!(
            kinds[2],
            &FailureKind::Fatal {
                message: "returned error: \"nope\"".to_string()
            }
        );
        let statuses: Vec<_> = summary.cases.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![Status::Failed, Status::Failed, Status::Passed, Status::Passed]
        );
    }

    #[test]
    fn non_string_panic_payload() {
        let mut registry = Registry::new();
        registry.declare_context("c").unwrap();
        registry
            .declare_test_case("c", "p", |_| -> () { panic::panic_any(42_u8) })
            .unwrap();

        let summary = registry.run_all();
        assert_eq!((summary.total, summary.failed), (1, 1));
        assert_eq!(
            summary.failures[0].kind,
            FailureKind::Fatal {
                message: "panicked with a non-string payload".to_string()
            }
        );
        assert_eq!(
            crate::report::failure_line(&summary.failures[0]),
            "FAIL [c] p: fatal: panicked with a non-string payload"
        );
    }

    #[test]
    fn case_without_assertions_passes() {
        let mut registry = Registry::new();
        registry.declare_context("ctx").unwrap();
        registry.declare_test_case("ctx", "empty", |_| {}).unwrap();
        let summary = registry.run_all();
        assert_eq!(summary.passed, 1);
    }

    #[test]
    fn selection_skips_cases() {
        let ran = Rc::new(RefCell::new(vec![]));
        let mut registry = Registry::new();
        registry.declare_context("math").unwrap();
        for test in ["adds", "subtracts", "slow divides"] {
            let ran = Rc::clone(&ran);
            registry
                .declare_test_case("math", test, move |_| ran.borrow_mut().push(test))
                .unwrap();
        }

        let selection = Selection::new(Some("^math/"), &["slow".to_string()]).unwrap();
        let summary = Runner::new(selection).run(&mut registry);
        assert_eq!(*ran.borrow(), vec!["adds", "subtracts"]);
        assert_eq!((summary.total, summary.skipped), (2, 1));
        assert_eq!(summary.cases[2].status, Status::NotRun);
        assert_eq!(
            registry.find("math").unwrap().cases()[2].status(),
            Status::NotRun
        );
    }

    #[test]
    fn selection_rejects_bad_pattern() {
        let err = Selection::new(Some("("), &[]).unwrap_err();
        assert!(matches!(err.current_context(), Error::Filter(p) if p == "("));
    }

    #[test]
    fn rerun_refreshes_status() {
        let mut registry = Registry::new();
        registry.declare_context("ctx").unwrap();
        registry.declare_test_case("ctx", "case", |_| {}).unwrap();
        registry.run_all();
        let summary = registry.run_all();
        assert_eq!(summary.total, 1);
        assert_eq!(registry.contexts()[0].cases()[0].status(), Status::Passed);
    }
}
