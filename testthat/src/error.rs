/// Errors raised while declaring contexts and test cases
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("context name must not be empty")]
    EmptyContextName,
    #[error("test case name must not be empty (in context `{0}`)")]
    EmptyTestName(String),
    #[error("context `{0}` is already registered")]
    DuplicateContext(String),
    #[error("test case `{1}` is already registered in context `{0}`")]
    DuplicateTestCase(String, String),
    #[error("context `{0}` is not registered")]
    UnknownContext(String),
}

/// Errors raised by the harness around a run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // config
    #[error("failed to load config")]
    Config,
    #[error("invalid test filter `{0}`")]
    Filter(String),

    // report
    #[error("failed to write report")]
    Report,
}
