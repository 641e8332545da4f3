//! The test-case capability.

use crate::{options::ExecutionOptions, status::TestStatus};

/// Anything that can be run as one test case of a battery.
///
/// A test receives the shared execution options and returns a fully
/// populated [`TestStatus`]; the harness never looks inside the body. Plain
/// functions and closures of the matching shape implement this trait
/// automatically.
pub trait TestCase {
    fn run<'o>(&self, options: &'o ExecutionOptions) -> TestStatus<'o>;
}

impl<F> TestCase for F
where
    F: for<'o> Fn(&'o ExecutionOptions) -> TestStatus<'o>,
{
    fn run<'o>(&self, options: &'o ExecutionOptions) -> TestStatus<'o> {
        (self)(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Disposition;

    fn trivial(options: &ExecutionOptions) -> TestStatus<'_> {
        let mut status = TestStatus::start(options, 1, 1, "trivial", "smoke").unwrap();
        status.next_subtest("noop");
        status.pass(true);
        status
    }

    #[test]
    fn plain_functions_are_test_cases() {
        let opts = ExecutionOptions::default();
        let case: &dyn TestCase = &(trivial as fn(&ExecutionOptions) -> TestStatus<'_>);
        let status = case.run(&opts);
        assert!(status.passed());
        assert_eq!(status.disposition(), Disposition::Continue);
    }

    #[test]
    fn boxed_cases_run_through_dyn_dispatch() {
        fn grouped(options: &ExecutionOptions) -> TestStatus<'_> {
            TestStatus::start(options, 2, 1, "boxed", "smoke").unwrap()
        }

        let opts = ExecutionOptions::default();
        let boxed: Box<dyn TestCase> =
            Box::new(grouped as fn(&ExecutionOptions) -> TestStatus<'_>);
        let status = boxed.run(&opts);
        assert_eq!(status.group_number(), 2);
    }
}
