//! The battery runner: selective execution, stop-on-error/quit semantics
//! and result aggregation.

use crate::{
    clock::{Clock, SystemClock},
    console::Console,
    options::ExecutionOptions,
    registry::TestRegistry,
    reporter::Reporter,
    status::{Disposition, TestStatus},
    test::TestCase,
};
use maybe_unwind::maybe_unwind;
use std::{panic::AssertUnwindSafe, sync::Once};
use thiserror::Error;

/// A failed battery operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RunnerError {
    #[error("no test cases have been loaded")]
    EmptyRegistry,
    #[error("sub-tests are required but none were registered")]
    MissingSubtests,
}

/// The aggregated outcome of one battery run.
///
/// The first-failed fields share the registry's documented quirk: 0 means
/// both "no failure" and "failed at 0".
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub executed: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_errors: u32,
    pub first_failed_test: u32,
    pub first_failed_group: u32,
    pub first_failed_case: u32,
    pub first_failed_subtest: u32,
    pub duration_ms: f64,
    /// Whether the run ended before the last registered test.
    pub quitted: bool,
}

impl RunSummary {
    pub fn is_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Owns the registry and drives the battery to completion.
pub struct Runner {
    registry: TestRegistry,
    clock: Box<dyn Clock>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// A runner pacing itself through the given clock.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            registry: TestRegistry::new(),
            clock: Box::new(clock),
        }
    }

    /// Swap the pacing clock; registered tests are unaffected.
    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    pub fn load(&mut self, case: impl TestCase + 'static) {
        self.registry.load(case);
    }

    pub fn load_named(&mut self, name: impl Into<String>, case: impl TestCase + 'static) {
        self.registry.load_named(name, case);
    }

    #[inline]
    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut TestRegistry {
        &mut self.registry
    }

    /// Invoke one test function, always yielding an inspectable status.
    ///
    /// An absent test function, or a body that panics, produces a status
    /// with disposition [`Disposition::Aborted`] and a false result while
    /// the identity fields stay zeroed/empty — callers can always read the
    /// result and disposition safely.
    pub fn run_a_test<'o>(
        options: &'o ExecutionOptions,
        test: Option<&dyn TestCase>,
    ) -> TestStatus<'o> {
        ensure_unwind_hook();
        match test {
            None => failed_shell(),
            Some(test) => match maybe_unwind(AssertUnwindSafe(|| test.run(options))) {
                Ok(mut status) => {
                    status.finalize_timer();
                    status
                }
                Err(unwind) => {
                    log::error!("test body panicked: {}", unwind);
                    failed_shell()
                }
            },
        }
    }

    /// Enforce the need-subtests policy against one status.
    ///
    /// Fails whenever the option is on and the status counts zero
    /// sub-tests — including for a bare status that was never set up. That
    /// the check can fail before any test has run is documented behavior,
    /// kept as-is.
    pub fn check_subtests(
        options: &ExecutionOptions,
        status: &TestStatus<'_>,
    ) -> Result<u32, RunnerError> {
        if options.need_subtests() && status.subtest_count() == 0 {
            return Err(RunnerError::MissingSubtests);
        }
        Ok(status.subtest_count())
    }

    /// Close out one test: apply the post-test response, fold the status
    /// into the aggregates, and decide whether the battery must stop.
    ///
    /// The failure decision is made once, after `dispose`: a test that
    /// failed via `pass(false)` still counts even when a quit forces its
    /// final result to true, and an abort whose cumulative result was never
    /// cleared is folded as a failure too.
    pub fn dispose_of_test(
        &mut self,
        options: &ExecutionOptions,
        console: &mut Console,
        status: &mut TestStatus<'_>,
    ) -> bool {
        if options.interactive() && status.disposition() != Disposition::DidNotTest {
            let response = if options.batch_mode() {
                options.response_after()
            } else {
                console
                    .read_response("pass, fail, or quit? [p/f/q]", options.beep_prompt())
                    .unwrap_or_else(|| options.response_after())
            };
            if !status.apply_response_after(response) {
                log::warn!("ignoring unrecognized response {:?}", response);
            }
        }

        let failed_before_dispose = !status.passed();
        let mut quit = status.dispose();

        let failed = failed_before_dispose || !status.passed();
        if failed {
            let index = self.registry.current_test().max(0) as u32;
            self.registry.record_failure(index, status);
        }
        if options.stop_on_error() && failed {
            quit = true;
        }
        quit
    }

    /// Run the whole battery in registration order.
    ///
    /// Group/case filters are honored inside each status setup (excluded
    /// tests come back as `DidNotTest` and count as skipped). After each
    /// test the status is folded into the aggregates and the quit decision
    /// is made; between tests the runner pauses and sleeps as configured.
    pub fn run(
        &mut self,
        options: &ExecutionOptions,
        console: &mut Console,
        reporter: &dyn Reporter,
    ) -> Result<RunSummary, RunnerError> {
        if self.registry.is_empty() {
            return Err(RunnerError::EmptyRegistry);
        }
        ensure_unwind_hook();

        let total = self.registry.run_init();
        let started_us = self.clock.now_us();
        reporter.battery_starting(total);

        let mut executed = 0u32;
        let mut passed = 0u32;
        let mut failed = 0u32;
        let mut skipped = 0u32;
        let mut quitted = false;

        while let Some(index) = self.registry.next_test() {
            reporter.case_starting(index, self.registry.name(index));

            let mut status = match pre_test_skip(options, console) {
                Some(answered) => answered,
                None => Self::run_a_test(options, self.registry.get(index)),
            };

            // The policy applies only to tests whose body actually ran.
            if matches!(
                status.disposition(),
                Disposition::Continue | Disposition::Failed
            ) {
                if let Err(err) = Self::check_subtests(options, &status) {
                    log::error!("test {}: {}", index, err);
                    status.fail();
                }
            }

            let quit = self.dispose_of_test(options, console, &mut status);
            reporter.case_ended(&status);

            match status.disposition() {
                Disposition::DidNotTest => skipped += 1,
                _ => {
                    executed += 1;
                    if status.passed() {
                        passed += 1;
                    } else {
                        failed += 1;
                    }
                }
            }

            if quit {
                quitted = true;
                break;
            }

            if options.case_pause() {
                console.pause("press enter for the next case ...", options.beep_prompt());
            }
            if options.sleep_time_ms() > 0 {
                self.clock.sleep_ms(u64::from(options.sleep_time_ms()));
            }
        }

        let duration_ms = self.clock.now_us().saturating_sub(started_us) as f64 / 1_000.0;
        let summary = RunSummary {
            total,
            executed,
            passed,
            failed,
            skipped,
            total_errors: self.registry.total_errors(),
            first_failed_test: self.registry.first_failed_test(),
            first_failed_group: self.registry.first_failed_group(),
            first_failed_case: self.registry.first_failed_case(),
            first_failed_subtest: self.registry.first_failed_subtest(),
            duration_ms,
            quitted,
        };
        reporter.battery_ended(&summary);

        Ok(summary)
    }
}

/// Ask the pre-test question when interactive; a non-continue answer
/// synthesizes the status for this slot instead of running the body.
fn pre_test_skip<'o>(options: &ExecutionOptions, console: &mut Console) -> Option<TestStatus<'o>> {
    if !options.interactive() {
        return None;
    }
    let response = if options.batch_mode() {
        options.response_before()
    } else {
        console
            .read_response("run this test? [c/s/a/q]", options.beep_prompt())
            .unwrap_or_else(|| options.response_before())
    };
    if response == 'c' {
        return None;
    }

    let mut status = TestStatus::default();
    if status.apply_response_before(response) {
        Some(status)
    } else {
        // An unrecognized character falls through to running the test.
        None
    }
}

fn failed_shell<'o>() -> TestStatus<'o> {
    let mut status = TestStatus::default();
    status.force_result(false);
    status
}

fn ensure_unwind_hook() {
    static SET_HOOK: Once = Once::new();
    SET_HOOK.call_once(maybe_unwind::set_hook);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NullReporter;
    use std::io::Cursor;

    fn passing(options: &ExecutionOptions) -> TestStatus<'_> {
        let mut status = TestStatus::start(options, 1, 1, "group", "passing").unwrap();
        if status.next_subtest("only") {
            status.pass(true);
        }
        status
    }

    fn failing(options: &ExecutionOptions) -> TestStatus<'_> {
        let mut status = TestStatus::start(options, 2, 1, "group", "failing").unwrap();
        if status.next_subtest("only") {
            status.pass(false);
        }
        status
    }

    fn subtest_free(options: &ExecutionOptions) -> TestStatus<'_> {
        TestStatus::start(options, 3, 1, "group", "no sub-tests").unwrap()
    }

    fn as_case(f: fn(&ExecutionOptions) -> TestStatus<'_>) -> fn(&ExecutionOptions) -> TestStatus<'_> {
        f
    }

    #[test]
    fn run_a_test_with_no_function_yields_an_inspectable_shell() {
        let opts = ExecutionOptions::default();
        let status = Runner::run_a_test(&opts, None);
        assert_eq!(status.disposition(), Disposition::Aborted);
        assert!(!status.passed());
        assert_eq!(status.group_number(), 0);
        assert_eq!(status.case_number(), 0);
        assert_eq!(status.group_name(), "");
    }

    #[test]
    fn run_a_test_contains_panics() {
        fn bomb(_: &ExecutionOptions) -> TestStatus<'_> {
            panic!("boom")
        }

        let opts = ExecutionOptions::default();
        let case = as_case(bomb);
        let status = Runner::run_a_test(&opts, Some(&case));
        assert_eq!(status.disposition(), Disposition::Aborted);
        assert!(!status.passed());
    }

    #[test]
    fn run_a_test_finalizes_the_duration() {
        let opts = ExecutionOptions::default();
        let case = as_case(passing);
        let status = Runner::run_a_test(&opts, Some(&case));
        assert!(status.passed());
        assert!(status.duration_ms() >= 0.0);
    }

    #[test]
    fn check_subtests_fails_even_before_setup() {
        let mut opts = ExecutionOptions::default();
        opts.set_need_subtests(true);

        let bare = TestStatus::new();
        assert_eq!(
            Runner::check_subtests(&opts, &bare),
            Err(RunnerError::MissingSubtests)
        );

        let initialized = TestStatus::start(&opts, 1, 1, "g", "c").unwrap();
        assert_eq!(
            Runner::check_subtests(&opts, &initialized),
            Err(RunnerError::MissingSubtests)
        );

        let mut with_subtest = TestStatus::start(&opts, 1, 1, "g", "c").unwrap();
        with_subtest.next_subtest("one");
        assert_eq!(Runner::check_subtests(&opts, &with_subtest), Ok(1));

        let relaxed = ExecutionOptions::default();
        assert_eq!(Runner::check_subtests(&relaxed, &bare), Ok(0));
    }

    #[test]
    fn dispose_records_failure_before_quit_forces_the_result() {
        let mut opts = ExecutionOptions::default();
        opts.set_interactive(true);
        let mut runner = Runner::new();
        runner.load(as_case(failing));
        runner.registry_mut().run_init();
        runner.registry_mut().next_test();

        let mut console = Console::with_input(Cursor::new("q\n"));
        let mut status = failing(&opts);
        let quit = runner.dispose_of_test(&opts, &mut console, &mut status);

        assert!(quit);
        // Quit forced the per-test result true, but the aggregate kept the
        // failure.
        assert!(status.passed());
        assert_eq!(runner.registry().total_errors(), 1);
        assert_eq!(runner.registry().first_failed_group(), 2);
    }

    #[test]
    fn interactive_fail_response_marks_the_test_failed() {
        let mut opts = ExecutionOptions::default();
        opts.set_interactive(true);
        let mut runner = Runner::new();
        runner.load(as_case(passing));
        runner.registry_mut().run_init();
        runner.registry_mut().next_test();

        let mut console = Console::with_input(Cursor::new("f\n"));
        let mut status = passing(&opts);
        let quit = runner.dispose_of_test(&opts, &mut console, &mut status);

        assert!(!quit);
        assert!(!status.passed());
        assert_eq!(status.disposition(), Disposition::Failed);
        assert_eq!(runner.registry().total_errors(), 1);
    }

    #[test]
    fn stop_on_error_requests_a_quit() {
        let mut opts = ExecutionOptions::default();
        opts.set_stop_on_error(true);
        let mut runner = Runner::new();
        runner.load(as_case(failing));
        runner.registry_mut().run_init();
        runner.registry_mut().next_test();

        let mut console = Console::with_input(Cursor::new(""));
        let mut status = failing(&opts);
        assert!(runner.dispose_of_test(&opts, &mut console, &mut status));
    }

    #[test]
    fn empty_registry_refuses_to_run() {
        let opts = ExecutionOptions::default();
        let mut runner = Runner::new();
        let mut console = Console::with_input(Cursor::new(""));
        assert_eq!(
            runner
                .run(&opts, &mut console, &NullReporter)
                .unwrap_err(),
            RunnerError::EmptyRegistry
        );
    }

    #[test]
    fn need_subtests_violation_fails_the_run_but_keeps_going() {
        let mut opts = ExecutionOptions::default();
        opts.set_need_subtests(true);
        let mut runner = Runner::new();
        runner.load(as_case(subtest_free));
        runner.load(as_case(passing));

        let mut console = Console::with_input(Cursor::new(""));
        let summary = runner.run(&opts, &mut console, &NullReporter).unwrap();

        assert!(!summary.is_passed());
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.executed, 2);
        assert!(!summary.quitted);
    }
}
