//! The growable list of registered tests and the battery-wide aggregates.

use crate::{options::NO_CURRENT_TEST, status::TestStatus, test::TestCase};

/// How many test slots are added whenever the registry runs out of room.
///
/// Growth is block-sized rather than one-at-a-time; the allocation never
/// shrinks and registered tests keep their indices.
pub const CASE_ALLOCATION: usize = 8;

struct Slot {
    name: Option<String>,
    case: Box<dyn TestCase>,
}

/// An insertion-ordered registry of test cases plus the aggregates folded
/// from their statuses.
pub struct TestRegistry {
    slots: Vec<Slot>,
    allocation: usize,
    cursor: i64,
    total_errors: u32,
    first_failed_test: u32,
    first_failed_group: u32,
    first_failed_case: u32,
    first_failed_subtest: u32,
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            allocation: 0,
            cursor: i64::from(NO_CURRENT_TEST),
            total_errors: 0,
            first_failed_test: 0,
            first_failed_group: 0,
            first_failed_case: 0,
            first_failed_subtest: 0,
        }
    }
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a test case, growing the allocation by whole blocks when the
    /// count would exceed it.
    pub fn load(&mut self, case: impl TestCase + 'static) {
        self.load_slot(None, Box::new(case));
    }

    /// Append a named test case; the name only feeds listings and reports.
    pub fn load_named(&mut self, name: impl Into<String>, case: impl TestCase + 'static) {
        self.load_slot(Some(name.into()), Box::new(case));
    }

    fn load_slot(&mut self, name: Option<String>, case: Box<dyn TestCase>) {
        if self.slots.len() == self.allocation {
            self.allocation += CASE_ALLOCATION;
            self.slots.reserve_exact(self.allocation - self.slots.len());
        }
        self.slots.push(Slot { name, case });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The current slot allocation, in tests. Always a multiple of
    /// [`CASE_ALLOCATION`] once anything has been loaded.
    #[inline]
    pub fn allocation(&self) -> usize {
        self.allocation
    }

    pub fn get(&self, index: usize) -> Option<&dyn TestCase> {
        self.slots.get(index).map(|slot| &*slot.case)
    }

    /// The registered name of a test, if one was given.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|slot| slot.name.as_deref())
    }

    /// Iterate `(index, optional name)` in registration order.
    pub fn names(&self) -> impl Iterator<Item = (usize, Option<&str>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (index, slot.name.as_deref()))
    }

    // ==== cursor ====

    /// Reset the aggregates and the cursor for a fresh run; returns the
    /// number of registered tests.
    pub fn run_init(&mut self) -> usize {
        self.cursor = i64::from(NO_CURRENT_TEST);
        self.total_errors = 0;
        self.first_failed_test = 0;
        self.first_failed_group = 0;
        self.first_failed_case = 0;
        self.first_failed_subtest = 0;
        self.slots.len()
    }

    /// Advance the cursor and return the new test index, or `None` once the
    /// cursor has moved past the registered count. The cursor keeps
    /// incrementing internally; callers must stop once they see `None`.
    pub fn next_test(&mut self) -> Option<usize> {
        self.cursor += 1;
        let index = self.cursor as usize;
        if index < self.slots.len() {
            Some(index)
        } else {
            None
        }
    }

    /// The raw cursor: [`NO_CURRENT_TEST`] before any test has run, and a
    /// value at or past the count once the battery is exhausted.
    #[inline]
    pub fn current_test(&self) -> i32 {
        self.cursor as i32
    }

    // ==== aggregates ====

    #[inline]
    pub fn total_errors(&self) -> u32 {
        self.total_errors
    }

    /// The index of the first failed test.
    ///
    /// Defaults to 0, which is indistinguishable from "failed at index 0";
    /// as a consequence, a failure recorded at index 0 can be overwritten by
    /// a later one. A known quirk, kept deliberately.
    #[inline]
    pub fn first_failed_test(&self) -> u32 {
        self.first_failed_test
    }

    /// Group number of the first failure; 0 when none (same quirk as
    /// [`first_failed_test`](Self::first_failed_test)).
    #[inline]
    pub fn first_failed_group(&self) -> u32 {
        self.first_failed_group
    }

    #[inline]
    pub fn first_failed_case(&self) -> u32 {
        self.first_failed_case
    }

    #[inline]
    pub fn first_failed_subtest(&self) -> u32 {
        self.first_failed_subtest
    }

    /// Fold one failed status into the aggregates.
    pub(crate) fn record_failure(&mut self, test_index: u32, status: &TestStatus<'_>) {
        self.total_errors += 1;
        if self.first_failed_test == 0 {
            self.first_failed_test = test_index;
            self.first_failed_group = status.group_number();
            self.first_failed_case = status.case_number();
            self.first_failed_subtest = status.failed_subtest();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{options::ExecutionOptions, status::TestStatus};

    fn noop(options: &ExecutionOptions) -> TestStatus<'_> {
        TestStatus::start(options, 1, 1, "noop", "noop").unwrap()
    }

    fn as_case() -> fn(&ExecutionOptions) -> TestStatus<'_> {
        noop
    }

    #[test]
    fn allocation_grows_in_blocks() {
        let mut registry = TestRegistry::new();
        assert_eq!(registry.allocation(), 0);

        for n in 1..=CASE_ALLOCATION {
            registry.load(as_case());
            assert_eq!(registry.len(), n);
            assert_eq!(registry.allocation(), CASE_ALLOCATION);
        }

        registry.load(as_case());
        assert_eq!(registry.len(), CASE_ALLOCATION + 1);
        assert_eq!(registry.allocation(), 2 * CASE_ALLOCATION);

        for _ in 0..3 * CASE_ALLOCATION {
            registry.load(as_case());
            assert!(registry.len() <= registry.allocation());
            assert_eq!(registry.allocation() % CASE_ALLOCATION, 0);
        }
    }

    #[test]
    fn cursor_walks_then_reports_none() {
        let mut registry = TestRegistry::new();
        for _ in 0..3 {
            registry.load(as_case());
        }

        assert_eq!(registry.run_init(), 3);
        assert_eq!(registry.current_test(), NO_CURRENT_TEST);
        assert_eq!(registry.next_test(), Some(0));
        assert_eq!(registry.next_test(), Some(1));
        assert_eq!(registry.next_test(), Some(2));
        assert_eq!(registry.next_test(), None);
        assert_eq!(registry.current_test(), 3);

        // The cursor keeps incrementing internally.
        assert_eq!(registry.next_test(), None);
        assert_eq!(registry.current_test(), 4);
    }

    #[test]
    fn run_init_resets_aggregates() {
        let opts = ExecutionOptions::default();
        let mut registry = TestRegistry::new();
        registry.load(as_case());

        let mut status = TestStatus::start(&opts, 7, 3, "g", "c").unwrap();
        status.next_subtest("s");
        status.fail();
        registry.record_failure(5, &status);

        assert_eq!(registry.total_errors(), 1);
        assert_eq!(registry.first_failed_test(), 5);
        assert_eq!(registry.first_failed_group(), 7);
        assert_eq!(registry.first_failed_case(), 3);
        assert_eq!(registry.first_failed_subtest(), 1);

        registry.run_init();
        assert_eq!(registry.total_errors(), 0);
        assert_eq!(registry.first_failed_test(), 0);
        assert_eq!(registry.first_failed_group(), 0);
    }

    #[test]
    fn failure_at_index_zero_can_be_overwritten() {
        let opts = ExecutionOptions::default();
        let mut registry = TestRegistry::new();

        let mut first = TestStatus::start(&opts, 1, 1, "g", "c").unwrap();
        first.next_subtest("s");
        first.fail();
        registry.record_failure(0, &first);
        assert_eq!(registry.first_failed_group(), 1);

        // Weird but true: index 0 looks like the "none" default, so the
        // second failure re-records.
        let mut second = TestStatus::start(&opts, 2, 2, "g", "c").unwrap();
        second.next_subtest("s");
        second.fail();
        registry.record_failure(3, &second);
        assert_eq!(registry.first_failed_test(), 3);
        assert_eq!(registry.first_failed_group(), 2);
        assert_eq!(registry.total_errors(), 2);
    }

    #[test]
    fn names_are_optional() {
        let mut registry = TestRegistry::new();
        registry.load(as_case());
        registry.load_named("lexer smoke", as_case());

        assert_eq!(registry.name(0), None);
        assert_eq!(registry.name(1), Some("lexer smoke"));
        let listed: Vec<_> = registry.names().collect();
        assert_eq!(listed, vec![(0, None), (1, Some("lexer smoke"))]);
    }
}
