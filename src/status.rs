//! Per-test-case status: the disposition state machine, sub-test counters
//! and timing.
//!
//! A test function creates one `TestStatus` at its start, drives it with
//! [`next_subtest`](TestStatus::next_subtest) and [`pass`](TestStatus::pass)
//! while the body runs, and returns it. The runner then reads the status to
//! decide whether the battery continues, skips, or aborts.

use crate::{clock::Stopwatch, options::ExecutionOptions};
use thiserror::Error;

/// How a test-case run is to be interpreted and continued.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Normal: proceed to the next sub-test or test.
    Continue,
    /// The test was skipped by filtering; not a failure.
    DidNotTest,
    /// This test failed but the battery should continue.
    Failed,
    /// Early termination was requested; the current test still counts as
    /// passed unless it also failed.
    Quitted,
    /// Terminal error state. Also what a bare, never-identified status
    /// reports.
    Aborted,
}

/// A rejected status setup. The disposition is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("group and case numbers must be nonzero")]
    BadIdentity,
}

/// The status of one test-case invocation.
///
/// A bare status (`TestStatus::default()`) is unsafe to use and reports
/// [`Disposition::Aborted`] until it has been identified through
/// [`setup`](TestStatus::setup).
#[derive(Debug)]
pub struct TestStatus<'o> {
    options: Option<&'o ExecutionOptions>,
    group: u32,
    case: u32,
    group_name: String,
    case_description: String,
    subtest_index: u32,
    subtest_label: String,
    test_result: bool,
    subtest_error_count: u32,
    failed_subtest: u32,
    disposition: Disposition,
    stopwatch: Stopwatch,
    duration_ms: f64,
}

impl Default for TestStatus<'_> {
    fn default() -> Self {
        Self {
            options: None,
            group: 0,
            case: 0,
            group_name: String::new(),
            case_description: String::new(),
            subtest_index: 0,
            subtest_label: String::new(),
            test_result: true,
            subtest_error_count: 0,
            failed_subtest: 0,
            disposition: Disposition::Aborted,
            stopwatch: Stopwatch::new(),
            duration_ms: 0.0,
        }
    }
}

impl<'o> TestStatus<'o> {
    /// A bare, unidentified status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and set up a status in one step.
    pub fn start(
        options: &'o ExecutionOptions,
        group: u32,
        case: u32,
        group_name: &str,
        description: &str,
    ) -> Result<Self, StatusError> {
        let mut status = Self::default();
        status.setup(options, group, case, group_name, description)?;
        Ok(status)
    }

    /// Identify the status and start its timer.
    ///
    /// On success the disposition becomes [`Disposition::Continue`], or
    /// [`Disposition::DidNotTest`] when an active group/case filter excludes
    /// this test. Zero group or case numbers are rejected and the
    /// disposition is left as it was.
    pub fn setup(
        &mut self,
        options: &'o ExecutionOptions,
        group: u32,
        case: u32,
        group_name: &str,
        description: &str,
    ) -> Result<(), StatusError> {
        if group == 0 || case == 0 {
            return Err(StatusError::BadIdentity);
        }

        self.options = Some(options);
        self.group = group;
        self.case = case;
        self.group_name = group_name.to_owned();
        self.case_description = description.to_owned();
        self.subtest_index = 0;
        self.subtest_label.clear();
        self.test_result = true;
        self.subtest_error_count = 0;
        self.failed_subtest = 0;
        self.duration_ms = 0.0;

        let selected =
            options.group_selected(group, group_name) && options.case_selected(case, description);
        self.disposition = if selected {
            Disposition::Continue
        } else {
            Disposition::DidNotTest
        };

        self.stopwatch.start();
        Ok(())
    }

    // ==== identity and outcome accessors ====

    #[inline]
    pub fn group_number(&self) -> u32 {
        self.group
    }

    #[inline]
    pub fn case_number(&self) -> u32 {
        self.case
    }

    #[inline]
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    #[inline]
    pub fn case_description(&self) -> &str {
        &self.case_description
    }

    /// The number of sub-tests registered so far.
    #[inline]
    pub fn subtest_count(&self) -> u32 {
        self.subtest_index
    }

    /// The label passed to the most recent sub-test registration.
    #[inline]
    pub fn subtest_label(&self) -> &str {
        &self.subtest_label
    }

    /// The cumulative pass/fail result.
    #[inline]
    pub fn passed(&self) -> bool {
        self.test_result
    }

    #[inline]
    pub fn error_count(&self) -> u32 {
        self.subtest_error_count
    }

    /// The index of the first failed sub-test. Zero means "none" — which is
    /// indistinguishable from a failure recorded before any sub-test was
    /// registered.
    #[inline]
    pub fn failed_subtest(&self) -> u32 {
        self.failed_subtest
    }

    #[inline]
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// The finalized duration in milliseconds.
    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    // ==== the state machine ====

    /// Whether the test body may keep executing.
    pub fn can_proceed(&self) -> bool {
        match self.disposition {
            Disposition::Continue | Disposition::Failed | Disposition::Quitted => true,
            Disposition::DidNotTest | Disposition::Aborted => false,
        }
    }

    /// Register the next sub-test and report whether its body should run.
    ///
    /// The index and label always advance; the body must be skipped when
    /// this returns `false` — under summarize mode, when an active
    /// single-sub-test filter does not match the new index or label, or when
    /// the status cannot proceed at all.
    pub fn next_subtest(&mut self, label: &str) -> bool {
        self.subtest_index += 1;
        self.subtest_label.clear();
        self.subtest_label.push_str(label);

        if self.consult(|o| o.show_step_numbers(), false) {
            log::info!("  {:3}. {}", self.subtest_index, label);
        }

        if !self.can_proceed() {
            return false;
        }
        if self.consult(|o| o.summarize(), false) {
            return false;
        }
        self.consult(|o| o.subtest_selected(self.subtest_index, label), true)
    }

    /// Record a sub-test result.
    ///
    /// A false result increments the error count, records the first failed
    /// sub-test index (first time only) and clears the cumulative result.
    /// On an aborted status this is a no-op returning `false`. When the
    /// governing options force failure, every result is treated as false.
    pub fn pass(&mut self, result: bool) -> bool {
        if self.disposition == Disposition::Aborted {
            return false;
        }
        let result = result && !self.consult(|o| o.force_failure(), false);
        if !result {
            self.test_result = false;
            self.subtest_error_count += 1;
            if self.failed_subtest == 0 {
                self.failed_subtest = self.subtest_index;
            }
        }
        true
    }

    /// `pass(false)`, for readability at explicit failure sites.
    pub fn fail(&mut self) -> bool {
        self.pass(false)
    }

    /// Identical to [`fail`](Self::fail); exists so harness self-tests read
    /// as intentional.
    pub fn fail_deliberately(&mut self) -> bool {
        self.pass(false)
    }

    /// Force the cumulative result from the disposition without altering
    /// the disposition: skipped and quitted tests count as passed, aborted
    /// ones as failed. No-op for `Continue`/`Failed`.
    pub fn ignore(&mut self) -> bool {
        match self.disposition {
            Disposition::DidNotTest | Disposition::Quitted => {
                self.test_result = true;
                true
            }
            Disposition::Aborted => {
                self.test_result = false;
                true
            }
            Disposition::Continue | Disposition::Failed => false,
        }
    }

    /// The terminal decision: returns whether the whole battery must quit.
    ///
    /// `Quitted` quits with the result forced true; `Aborted` quits with the
    /// result forced false; everything else keeps going and keeps the
    /// current result.
    pub fn dispose(&mut self) -> bool {
        match self.disposition {
            Disposition::Continue | Disposition::DidNotTest | Disposition::Failed => false,
            Disposition::Quitted => {
                self.test_result = true;
                true
            }
            Disposition::Aborted => {
                self.test_result = false;
                true
            }
        }
    }

    /// Apply a pre-test response character: `c` continue, `s` skip,
    /// `a` abort, `q` quit. Uppercase folds to lowercase; anything else is
    /// rejected without a state change.
    pub fn apply_response_before(&mut self, response: char) -> bool {
        match response.to_ascii_lowercase() {
            'c' => {
                self.disposition = Disposition::Continue;
                true
            }
            's' => {
                self.disposition = Disposition::DidNotTest;
                true
            }
            'a' => {
                self.disposition = Disposition::Aborted;
                true
            }
            'q' => {
                self.disposition = Disposition::Quitted;
                true
            }
            _ => false,
        }
    }

    /// Apply a post-test response character: `p` confirms the result as it
    /// stands, `f` records a failure and marks the disposition `Failed`,
    /// `q` requests termination.
    pub fn apply_response_after(&mut self, response: char) -> bool {
        match response.to_ascii_lowercase() {
            'p' => true,
            'f' => {
                self.fail();
                self.disposition = Disposition::Failed;
                true
            }
            'q' => {
                self.disposition = Disposition::Quitted;
                true
            }
            _ => false,
        }
    }

    // ==== timing ====

    /// Re-baseline the timer to now.
    pub fn start_timer(&mut self) {
        self.stopwatch.start();
    }

    /// Milliseconds elapsed since the timer baseline, `-1.0` for a status
    /// whose timer was never started. With `reset`, the baseline moves up to
    /// now.
    pub fn time_delta(&mut self, reset: bool) -> f64 {
        self.stopwatch.time_delta(reset)
    }

    /// Capture the elapsed time as the finalized duration. Called by the
    /// runner when the test function has returned.
    pub(crate) fn finalize_timer(&mut self) {
        if self.stopwatch.is_running() {
            self.duration_ms = self.stopwatch.time_delta(false);
        }
    }

    pub(crate) fn force_result(&mut self, ok: bool) {
        self.test_result = ok;
    }

    /// Self-test hook: reset the monotonic failure counters. Not part of
    /// the public contract.
    #[doc(hidden)]
    pub fn reset_failure_counters(&mut self) {
        self.subtest_error_count = 0;
        self.failed_subtest = 0;
        self.test_result = true;
    }

    /// Self-test hook: force a disposition. Not part of the public contract.
    #[doc(hidden)]
    pub fn force_disposition(&mut self, disposition: Disposition) {
        self.disposition = disposition;
    }

    fn consult<T>(&self, read: impl FnOnce(&ExecutionOptions) -> T, default: T) -> T {
        self.options.map_or(default, read)
    }
}
