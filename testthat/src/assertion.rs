//! Assertion primitives
//!
//! Assertions never unwind. Each one records an [`AssertionResult`]
//! on the [`Execution`] of the test case that is currently running,
//! so a failing assertion does not stop the assertions after it.
use std::fmt::{self, Display};

use serde::Serialize;

/// The kind of assertion that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    ExpectTrue,
    ExpectFalse,
}

impl AssertionKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::ExpectTrue => "expect_true",
            Self::ExpectFalse => "expect_false",
        }
    }
}

impl Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source location of an assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl From<&std::panic::Location<'_>> for Location {
    fn from(location: &std::panic::Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Outcome of one evaluated assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionResult {
    pub passed: bool,
    pub kind: AssertionKind,
    /// Source text of the asserted expression
    pub expression: String,
    pub location: Location,
}

/// Handle to the test case that is currently executing
///
/// A fresh one is passed to every test case body.
#[derive(Debug, Default)]
pub struct Execution {
    results: Vec<AssertionResult>,
}

impl Execution {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record that `condition` should be true
    ///
    /// Returns `condition`
    #[track_caller]
    pub fn expect_true(&mut self, condition: bool, expression: &str) -> bool {
        self.record(AssertionKind::ExpectTrue, condition, expression);
        condition
    }

    /// Record that `condition` should be false
    ///
    /// Returns `!condition`, i.e. whether the assertion passed
    #[track_caller]
    pub fn expect_false(&mut self, condition: bool, expression: &str) -> bool {
        self.record(AssertionKind::ExpectFalse, !condition, expression);
        !condition
    }

    /// Results recorded so far, in evaluation order
    pub fn results(&self) -> &[AssertionResult] {
        &self.results
    }

    /// Number of failed assertions recorded so far
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    pub(crate) fn into_results(self) -> Vec<AssertionResult> {
        self.results
    }

    #[track_caller]
    fn record(&mut self, kind: AssertionKind, passed: bool, expression: &str) {
        self.results.push(AssertionResult {
            passed,
            kind,
            expression: expression.to_string(),
            location: std::panic::Location::caller().into(),
        });
    }
}

/// Expect an expression to be true in the current test case
///
/// The source text of the expression is recorded with the result.
/// An optional format message is appended to the recorded text.
#[macro_export]
macro_rules! expect_true {
    ($t:expr, $cond:expr $(,)?) => {
        $t.expect_true($cond, ::std::stringify!($cond))
    };
    ($t:expr, $cond:expr, $($msg:tt)+) => {
        $t.expect_true(
            $cond,
            &::std::format!("{} ({})", ::std::stringify!($cond), ::std::format_args!($($msg)+)),
        )
    };
}

/// Expect an expression to be false in the current test case
///
/// See [`expect_true!`]
#[macro_export]
macro_rules! expect_false {
    ($t:expr, $cond:expr $(,)?) => {
        $t.expect_false($cond, ::std::stringify!($cond))
    };
    ($t:expr, $cond:expr, $($msg:tt)+) => {
        $t.expect_false(
            $cond,
            &::std::format!("{} ({})", ::std::stringify!($cond), ::std::format_args!($($msg)+)),
        )
    };
}
