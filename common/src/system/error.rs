use error_stack::{report, Report};

/// Error messages
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("failed to read from `{0}`")]
    ReadFile(String),
    #[error("failed to parse TOML from `{0}`")]
    ParseToml(String),
}

/// Marker trait for errors that can be used
/// in the context wrapper system
pub trait Context: error_stack::Context {}

/// Trait for wrapping execution with some context
pub trait ChangeContext: Sized {
    type Target: error_stack::Context;
    fn change_context(report: Report<impl Context>) -> Report<Self::Target>;
}

/// Wrapper for Report so we can implement our own traits
#[repr(transparent)]
pub struct ReportWrapper<CC: ChangeContext>(Report<CC::Target>);

impl<CC: ChangeContext> std::fmt::Debug for ReportWrapper<CC> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.0, f)
    }
}

/// A Result type that wraps errors with context
/// automatically when using the `?` operator
pub type ResultIn<T, C> = Result<T, ReportWrapper<C>>;

impl<E: Context, CC: ChangeContext> From<E> for ReportWrapper<CC> {
    #[track_caller]
    fn from(value: E) -> Self {
        Self(CC::change_context(report!(value)))
    }
}

impl<E: Context, CC: ChangeContext> From<Report<E>> for ReportWrapper<CC> {
    #[track_caller]
    fn from(value: Report<E>) -> Self {
        Self(CC::change_context(value))
    }
}

impl<CC: ChangeContext> From<ReportWrapper<CC>> for Report<CC::Target> {
    fn from(value: ReportWrapper<CC>) -> Report<CC::Target> {
        value.0
    }
}

/// Create a type and implement the ChangeContext trait for it
#[macro_export]
macro_rules! error_context {
    ($vis:vis $ty:ident, | $report:ident | -> $target:ty $body:block) => {
        $vis struct $ty;
        impl $crate::system::ChangeContext for $ty {
            type Target = $target;
            #[inline]
            fn change_context(
                $report: ::error_stack::Report<impl $crate::system::Context>,
            ) -> ::error_stack::Report<$target> {
                $body
            }
        }
    };
}

/// Extensions for unwrapping a [`ResultIn`] into a plain [`Report`]
pub trait ResultInExt {
    /// The context of the wrapped report
    type Context: error_stack::Context;
    /// The [`Ok`] type
    type Ok;

    /// Adds a printable attachment to the wrapped report
    fn attach_printable<A>(self, attachment: A) -> Result<Self::Ok, Report<Self::Context>>
    where
        A: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static;
}

impl<T, CC: ChangeContext> ResultInExt for ResultIn<T, CC> {
    type Context = CC::Target;
    type Ok = T;

    #[track_caller]
    fn attach_printable<A>(self, attachment: A) -> Result<T, Report<Self::Context>>
    where
        A: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        // `#[track_caller]` is unstable on closures, so no `map_err`
        match self {
            Ok(ok) => Ok(ok),
            Err(ReportWrapper(report)) => Err(report.attach_printable(attachment)),
        }
    }
}

impl Context for Error {}
