//! The execution configuration consulted by the status state machine and the
//! runner.
//!
//! One `ExecutionOptions` value is owned by the application and shared
//! read-only by every test during a run; it is mutated only through the
//! validating setters, before or between runs. A handful of setters carry
//! cross-field side effects, documented on each.

use thiserror::Error;

/// The sentinel meaning "no numeric filter is active".
pub const NO_FILTER: i32 = -1;

/// The sentinel meaning "no test has run yet".
pub const NO_CURRENT_TEST: i32 = -1;

/// Upper bound accepted for a single-group or single-case filter.
pub const MAX_GROUP_NUMBER: i32 = 100;

/// Upper bound accepted for a single-sub-test filter.
pub const MAX_SUBTEST_NUMBER: i32 = 1000;

/// Upper bound accepted for the sleep time between tests, in milliseconds.
pub const MAX_SLEEP_TIME_MS: u32 = 3_600_000;

/// Responses accepted before a test: continue, skip, abort, quit.
pub const RESPONSES_BEFORE: [char; 4] = ['c', 's', 'a', 'q'];

/// Responses accepted after a test: pass, fail, quit.
pub const RESPONSES_AFTER: [char; 3] = ['p', 'f', 'q'];

/// A rejected options mutation. The options value is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("{field} must lie in 0..={max} (was {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        max: i64,
    },
    #[error("response character {0:?} is not in the accepted alphabet")]
    BadResponse(char),
}

/// The execution configuration for a battery run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOptions {
    verbose: bool,
    show_values: bool,
    show_step_numbers: bool,
    show_progress: bool,
    text_synch: bool,
    stop_on_error: bool,
    batch_mode: bool,
    interactive: bool,
    beep_prompt: bool,
    summarize: bool,
    case_pause: bool,
    need_subtests: bool,
    force_failure: bool,
    is_simulated: bool,

    single_group: i32,
    single_case: i32,
    single_subtest: i32,
    group_name: Option<String>,
    case_name: Option<String>,
    subtest_name: Option<String>,

    sleep_time_ms: u32,
    current_test: i32,
    response_before: char,
    response_after: char,
}

impl Default for ExecutionOptions {
    /// The library-defined defaults: progress display on, everything else
    /// off, all filters inactive.
    fn default() -> Self {
        Self {
            verbose: false,
            show_values: false,
            show_step_numbers: false,
            show_progress: true,
            text_synch: false,
            stop_on_error: false,
            batch_mode: false,
            interactive: false,
            beep_prompt: false,
            summarize: false,
            case_pause: false,
            need_subtests: false,
            force_failure: false,
            is_simulated: false,
            single_group: NO_FILTER,
            single_case: NO_FILTER,
            single_subtest: NO_FILTER,
            group_name: None,
            case_name: None,
            subtest_name: None,
            sleep_time_ms: 0,
            current_test: NO_CURRENT_TEST,
            response_before: 'c',
            response_after: 'p',
        }
    }
}

impl ExecutionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    // ==== toggles ====

    #[inline]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, on: bool) {
        self.verbose = on;
    }

    /// Whether test bodies should print expected/actual values. Stored and
    /// queryable only; the harness itself never prints values on a body's
    /// behalf.
    #[inline]
    pub fn show_values(&self) -> bool {
        self.show_values
    }

    pub fn set_show_values(&mut self, on: bool) {
        self.show_values = on;
    }

    #[inline]
    pub fn show_step_numbers(&self) -> bool {
        self.show_step_numbers
    }

    pub fn set_show_step_numbers(&mut self, on: bool) {
        self.show_step_numbers = on;
    }

    #[inline]
    pub fn show_progress(&self) -> bool {
        self.show_progress
    }

    /// Disabling progress display also disables step numbers, value display
    /// and verbosity. The cascade is one-way: re-enabling progress does not
    /// restore them.
    pub fn set_show_progress(&mut self, on: bool) {
        self.show_progress = on;
        if !on {
            self.show_step_numbers = false;
            self.show_values = false;
            self.verbose = false;
        }
    }

    /// Reserved. Stored and queryable, without any current behavior.
    #[inline]
    pub fn text_synch(&self) -> bool {
        self.text_synch
    }

    pub fn set_text_synch(&mut self, on: bool) {
        self.text_synch = on;
    }

    #[inline]
    pub fn stop_on_error(&self) -> bool {
        self.stop_on_error
    }

    pub fn set_stop_on_error(&mut self, on: bool) {
        self.stop_on_error = on;
    }

    #[inline]
    pub fn batch_mode(&self) -> bool {
        self.batch_mode
    }

    /// Batch mode forces interactive mode on and fixes the response
    /// characters to `c`/`p`, so every prompt answers itself. Turning batch
    /// mode back off does not undo the forcing.
    pub fn set_batch_mode(&mut self, on: bool) {
        self.batch_mode = on;
        if on {
            self.interactive = true;
            self.response_before = 'c';
            self.response_after = 'p';
        }
    }

    #[inline]
    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_interactive(&mut self, on: bool) {
        self.interactive = on;
    }

    #[inline]
    pub fn beep_prompt(&self) -> bool {
        self.beep_prompt
    }

    pub fn set_beep_prompt(&mut self, on: bool) {
        self.beep_prompt = on;
    }

    #[inline]
    pub fn summarize(&self) -> bool {
        self.summarize
    }

    /// Summarize mode is a dry run; it forces interactive mode and
    /// case-pause off. One-way, like the other cascades.
    pub fn set_summarize(&mut self, on: bool) {
        self.summarize = on;
        if on {
            self.interactive = false;
            self.case_pause = false;
        }
    }

    #[inline]
    pub fn case_pause(&self) -> bool {
        self.case_pause
    }

    pub fn set_case_pause(&mut self, on: bool) {
        self.case_pause = on;
    }

    #[inline]
    pub fn need_subtests(&self) -> bool {
        self.need_subtests
    }

    pub fn set_need_subtests(&mut self, on: bool) {
        self.need_subtests = on;
    }

    /// When set, every result reported through `TestStatus::pass` is treated
    /// as false. A lever for testing the harness itself.
    #[inline]
    pub fn force_failure(&self) -> bool {
        self.force_failure
    }

    pub fn set_force_failure(&mut self, on: bool) {
        self.force_failure = on;
    }

    /// Marks an options value as driving a harness self-test.
    #[inline]
    pub fn is_simulated(&self) -> bool {
        self.is_simulated
    }

    pub fn set_is_simulated(&mut self, on: bool) {
        self.is_simulated = on;
    }

    // ==== filters ====

    /// The single-group filter, or [`NO_FILTER`].
    #[inline]
    pub fn single_group(&self) -> i32 {
        self.single_group
    }

    /// A negative number clears the filter; a number above
    /// [`MAX_GROUP_NUMBER`] is rejected and the prior value kept.
    pub fn set_single_group(&mut self, group: i32) -> Result<(), OptionsError> {
        self.single_group = checked_filter("group filter", group, MAX_GROUP_NUMBER)?;
        Ok(())
    }

    #[inline]
    pub fn single_case(&self) -> i32 {
        self.single_case
    }

    pub fn set_single_case(&mut self, case: i32) -> Result<(), OptionsError> {
        self.single_case = checked_filter("case filter", case, MAX_GROUP_NUMBER)?;
        Ok(())
    }

    #[inline]
    pub fn single_subtest(&self) -> i32 {
        self.single_subtest
    }

    pub fn set_single_subtest(&mut self, subtest: i32) -> Result<(), OptionsError> {
        self.single_subtest = checked_filter("sub-test filter", subtest, MAX_SUBTEST_NUMBER)?;
        Ok(())
    }

    #[inline]
    pub fn group_name(&self) -> Option<&str> {
        self.group_name.as_deref()
    }

    /// `None` keeps the previous value; an empty string clears the filter.
    pub fn set_group_name(&mut self, name: Option<&str>) {
        set_name_filter(&mut self.group_name, name);
    }

    #[inline]
    pub fn case_name(&self) -> Option<&str> {
        self.case_name.as_deref()
    }

    pub fn set_case_name(&mut self, name: Option<&str>) {
        set_name_filter(&mut self.case_name, name);
    }

    #[inline]
    pub fn subtest_name(&self) -> Option<&str> {
        self.subtest_name.as_deref()
    }

    pub fn set_subtest_name(&mut self, name: Option<&str>) {
        set_name_filter(&mut self.subtest_name, name);
    }

    /// Whether a test with this group identity passes the active group
    /// filters. All active filters must match.
    pub fn group_selected(&self, group: u32, name: &str) -> bool {
        if self.single_group >= 0 && self.single_group as u32 != group {
            return false;
        }
        if let Some(ref wanted) = self.group_name {
            if wanted != name {
                return false;
            }
        }
        true
    }

    /// Whether a test with this case identity passes the active case filters.
    pub fn case_selected(&self, case: u32, description: &str) -> bool {
        if self.single_case >= 0 && self.single_case as u32 != case {
            return false;
        }
        if let Some(ref wanted) = self.case_name {
            if wanted != description {
                return false;
            }
        }
        true
    }

    /// Whether a sub-test with this index and label passes the active
    /// sub-test filters.
    pub fn subtest_selected(&self, index: u32, label: &str) -> bool {
        if self.single_subtest >= 0 && self.single_subtest as u32 != index {
            return false;
        }
        if let Some(ref wanted) = self.subtest_name {
            if wanted != label {
                return false;
            }
        }
        true
    }

    // ==== numeric knobs ====

    /// Milliseconds to sleep between tests. Zero disables pacing.
    #[inline]
    pub fn sleep_time_ms(&self) -> u32 {
        self.sleep_time_ms
    }

    /// Accepts `0..=MAX_SLEEP_TIME_MS`; anything above is rejected and the
    /// prior value kept.
    pub fn set_sleep_time_ms(&mut self, ms: u32) -> Result<(), OptionsError> {
        if ms > MAX_SLEEP_TIME_MS {
            return Err(OptionsError::OutOfRange {
                field: "sleep time",
                value: i64::from(ms),
                max: i64::from(MAX_SLEEP_TIME_MS),
            });
        }
        self.sleep_time_ms = ms;
        Ok(())
    }

    /// The current test number, or [`NO_CURRENT_TEST`].
    #[inline]
    pub fn current_test(&self) -> i32 {
        self.current_test
    }

    /// A negative number clamps to the "none yet" sentinel.
    pub fn set_current_test(&mut self, number: i32) {
        self.current_test = if number < 0 { NO_CURRENT_TEST } else { number };
    }

    /// The stored answer for the pre-test prompt.
    #[inline]
    pub fn response_before(&self) -> char {
        self.response_before
    }

    /// Accepts one of [`RESPONSES_BEFORE`], folding uppercase input to
    /// lowercase. Anything else is rejected and the prior value kept.
    pub fn set_response_before(&mut self, response: char) -> Result<(), OptionsError> {
        self.response_before = checked_response(response, &RESPONSES_BEFORE)?;
        Ok(())
    }

    /// The stored answer for the post-test prompt.
    #[inline]
    pub fn response_after(&self) -> char {
        self.response_after
    }

    /// Accepts one of [`RESPONSES_AFTER`], folding uppercase input to
    /// lowercase.
    pub fn set_response_after(&mut self, response: char) -> Result<(), OptionsError> {
        self.response_after = checked_response(response, &RESPONSES_AFTER)?;
        Ok(())
    }
}

fn checked_filter(field: &'static str, value: i32, max: i32) -> Result<i32, OptionsError> {
    if value < 0 {
        return Ok(NO_FILTER);
    }
    if value > max {
        return Err(OptionsError::OutOfRange {
            field,
            value: i64::from(value),
            max: i64::from(max),
        });
    }
    Ok(value)
}

fn checked_response(response: char, alphabet: &[char]) -> Result<char, OptionsError> {
    let folded = response.to_ascii_lowercase();
    if alphabet.contains(&folded) {
        Ok(folded)
    } else {
        Err(OptionsError::BadResponse(response))
    }
}

fn set_name_filter(slot: &mut Option<String>, name: Option<&str>) {
    match name {
        None => {}
        Some("") => *slot = None,
        Some(name) => *slot = Some(name.to_owned()),
    }
}
