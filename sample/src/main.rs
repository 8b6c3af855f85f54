use std::process::ExitCode;

use error_stack::Result;
use testthat::{context, expect_false, expect_true, RegistrationError, Registry};

// Normally this would come from the library under test
fn two_plus_two() -> i32 {
    2 + 2
}

fn register(registry: &mut Registry) -> Result<(), RegistrationError> {
    context!(registry, "Sample unit tests", {
        test_that("two plus two equals four", |t| {
            expect_true!(t, two_plus_two() == 4);
        });
        test_that("two plus two is not five", |t| {
            expect_false!(t, two_plus_two() == 5);
        });
    })
}

fn main() -> ExitCode {
    let mut registry = Registry::new();
    if let Err(e) = register(&mut registry) {
        eprintln!("error: {:?}", e);
        return ExitCode::FAILURE;
    }
    testthat::main(registry)
}

#[cfg(test)]
mod tests {
    use testthat::Status;

    use super::*;

    #[test]
    fn registers_sample_context() {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        let context = registry.find("Sample unit tests").unwrap();
        let names: Vec<_> = context.cases().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["two plus two equals four", "two plus two is not five"]
        );
    }

    #[test]
    fn sample_passes() {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        let summary = registry.run_all();
        assert_eq!((summary.total, summary.passed, summary.failed), (2, 2, 0));
        assert!(registry.contexts()[0]
            .cases()
            .iter()
            .all(|c| c.status() == Status::Passed));
    }

    #[test]
    fn register_twice_is_rejected() {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        let err = register(&mut registry).unwrap_err();
        assert_eq!(
            err.current_context(),
            &RegistrationError::DuplicateContext("Sample unit tests".to_string())
        );
        assert_eq!(registry.len(), 2);
    }
}
