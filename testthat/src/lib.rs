//! Native unit tests that a host test harness can run in-process
//!
//! Test code declares named contexts holding named test cases.
//! Each test case body receives an [`Execution`] and records
//! assertions on it with [`expect_true!`] and [`expect_false!`].
//!
//! ```
//! use testthat::{context, expect_true, Registry};
//!
//! fn two_plus_two() -> i32 {
//!     2 + 2
//! }
//!
//! let mut registry = Registry::new();
//! context!(&mut registry, "Sample unit tests", {
//!     test_that("two plus two equals four", |t| {
//!         expect_true!(t, two_plus_two() == 4);
//!     });
//! })
//! .unwrap();
//!
//! let summary = registry.run_all();
//! assert_eq!((summary.total, summary.passed, summary.failed), (1, 1, 0));
//! ```
//!
//! A binary can hand its registry to [`main`] to get command line
//! options, the console report and an exit code.

mod assertion;
pub use assertion::{AssertionKind, AssertionResult, Execution, Location};
mod registry;
pub use registry::{Context, ContextBuilder, Registry, Status, TestCase, TestReturn};
mod runner;
pub use runner::{CaseOutcome, Failure, FailureKind, RunSummary, Runner, Selection};
mod error;
pub use error::{Error, RegistrationError};

pub mod cli;
pub mod config;
pub mod report;

mod harness;
pub use harness::{main, run_main};
