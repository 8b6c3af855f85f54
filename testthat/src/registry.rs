//! Registry of contexts and their test cases
use std::fmt;

use error_stack::{report, Result};
use serde::Serialize;
use testthat_common::verboseln;

use crate::assertion::Execution;
use crate::error::RegistrationError;

/// Type-erased test case body. Returns the fatal error message, if any
pub(crate) type Body = Box<dyn Fn(&mut Execution) -> Option<String>>;

/// Return types accepted from a test case body
pub trait TestReturn {
    /// Convert the return value into a fatal error message
    fn into_fatal(self) -> Option<String>;
}

impl TestReturn for () {
    #[inline]
    fn into_fatal(self) -> Option<String> {
        None
    }
}

impl<E: fmt::Debug> TestReturn for std::result::Result<(), E> {
    fn into_fatal(self) -> Option<String> {
        self.err().map(|e| format!("returned error: {:?}", e))
    }
}

fn erase<F, R>(body: F) -> Body
where
    F: Fn(&mut Execution) -> R + 'static,
    R: TestReturn,
{
    Box::new(move |t: &mut Execution| body(t).into_fatal())
}

/// Status of a test case
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    NotRun,
    Passed,
    Failed,
}

/// A named unit of test logic
pub struct TestCase {
    pub(crate) name: String,
    pub(crate) body: Body,
    pub(crate) status: Status,
}

impl TestCase {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Status from the most recent run
    pub fn status(&self) -> Status {
        self.status
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// A named group of test cases
#[derive(Debug)]
pub struct Context {
    pub(crate) name: String,
    pub(crate) cases: Vec<TestCase>,
}

impl Context {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Test cases in registration order
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    fn push_case(&mut self, name: &str, body: Body) -> Result<(), RegistrationError> {
        if name.trim().is_empty() {
            return Err(report!(RegistrationError::EmptyTestName(self.name.clone())));
        }
        if self.cases.iter().any(|c| c.name == name) {
            return Err(report!(RegistrationError::DuplicateTestCase(
                self.name.clone(),
                name.to_string()
            )));
        }
        verboseln!("registered [{}] {}", self.name, name);
        self.cases.push(TestCase {
            name: name.to_string(),
            body,
            status: Status::NotRun,
        });
        Ok(())
    }
}

/// All declared contexts, in declaration order
#[derive(Debug, Default)]
pub struct Registry {
    contexts: Vec<Context>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new, empty context
    ///
    /// Context names must be non-empty and unique in the registry.
    pub fn declare_context(&mut self, name: &str) -> Result<(), RegistrationError> {
        if name.trim().is_empty() {
            return Err(report!(RegistrationError::EmptyContextName));
        }
        if self.find(name).is_some() {
            return Err(report!(RegistrationError::DuplicateContext(
                name.to_string()
            )));
        }
        self.contexts.push(Context {
            name: name.to_string(),
            cases: vec![],
        });
        Ok(())
    }

    /// Append a test case to a declared context
    ///
    /// The body is not executed until the registry is run.
    ///
    /// A body that always panics needs an explicit `-> ()` return type,
    /// e.g. `|_| -> () { panic!("...") }`, so its return type can be inferred.
    pub fn declare_test_case<F, R>(
        &mut self,
        context: &str,
        name: &str,
        body: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&mut Execution) -> R + 'static,
        R: TestReturn,
    {
        let context = self
            .contexts
            .iter_mut()
            .find(|c| c.name == context)
            .ok_or_else(|| report!(RegistrationError::UnknownContext(context.to_string())))?;
        context.push_case(name, erase(body))
    }

    /// Declare a context and its test cases in one scope
    ///
    /// ```
    /// use testthat::{expect_true, Registry};
    ///
    /// let mut registry = Registry::new();
    /// registry
    ///     .context("Sample unit tests", |ctx| {
    ///         ctx.test_that("two plus two equals four", |t| {
    ///             expect_true!(t, 2 + 2 == 4);
    ///         })?;
    ///         Ok(())
    ///     })
    ///     .unwrap();
    /// assert!(registry.run_all().is_success());
    /// ```
    pub fn context<F>(&mut self, name: &str, declare: F) -> Result<(), RegistrationError>
    where
        F: FnOnce(&mut ContextBuilder<'_>) -> Result<(), RegistrationError>,
    {
        self.declare_context(name)?;
        // the context was just pushed
        let index = self.contexts.len() - 1;
        let mut builder = ContextBuilder {
            context: &mut self.contexts[index],
        };
        declare(&mut builder)
    }

    /// Contexts in declaration order
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub(crate) fn contexts_mut(&mut self) -> &mut [Context] {
        &mut self.contexts
    }

    /// Get a context by name
    pub fn find(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Total number of test cases across all contexts
    pub fn len(&self) -> usize {
        self.contexts.iter().map(|c| c.cases.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Declares test cases into one context. See [`Registry::context`]
pub struct ContextBuilder<'a> {
    context: &'a mut Context,
}

impl ContextBuilder<'_> {
    /// Name of the context being declared
    pub fn name(&self) -> &str {
        &self.context.name
    }

    /// Declare a test case in this context
    ///
    /// A body that always panics needs an explicit `-> ()` return type,
    /// e.g. `|_| -> () { panic!("...") }`, so its return type can be inferred.
    pub fn test_that<F, R>(&mut self, name: &str, body: F) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&mut Execution) -> R + 'static,
        R: TestReturn,
    {
        self.context.push_case(name, erase(body))?;
        Ok(self)
    }
}

/// Declare a context with its test cases
///
/// Expands to [`Registry::context`] and evaluates to its result.
///
/// ```
/// use testthat::{context, expect_false, expect_true, Registry};
///
/// let mut registry = Registry::new();
/// context!(&mut registry, "Sample unit tests", {
///     test_that("two plus two equals four", |t| {
///         expect_true!(t, 2 + 2 == 4);
///     });
///     test_that("two plus two is not five", |t| {
///         expect_false!(t, 2 + 2 == 5);
///     });
/// })
/// .unwrap();
/// assert_eq!(registry.len(), 2);
/// ```
#[macro_export]
macro_rules! context {
    ($registry:expr, $name:expr, { $( test_that($test:expr, $body:expr $(,)?); )* }) => {
        $crate::Registry::context($registry, $name, |_ctx| {
            $( _ctx.test_that($test, $body)?; )*
            ::std::result::Result::Ok(())
        })
    };
}
