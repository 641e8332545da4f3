/*!
A self-contained unit testing battery.

Tests are plain functions from a shared [`ExecutionOptions`] to a
[`TestStatus`]; a [`Runner`] executes them in registration order, honoring
group/case/sub-test filters, stop-on-error and quit semantics, and folds
every status into a battery-wide result. The design follows the classic
numbered group/case/sub-test batteries of C test harnesses, with the
interaction and pacing machinery made explicit: the console, the clock and
the reporters are all values passed by reference, never process state.

A minimal battery:

```no_run
use spelt::{ExecutionOptions, Session, TestStatus};

fn vectors(options: &ExecutionOptions) -> TestStatus<'_> {
    let mut status = TestStatus::start(options, 1, 1, "vec", "resizing").unwrap();

    if status.next_subtest("bigger") {
        let mut v = vec![0usize; 5];
        v.resize(10, 0);
        status.pass(v.len() == 10);
    }
    if status.next_subtest("smaller") {
        let mut v = vec![0usize; 5];
        v.resize(0, 0);
        status.pass(v.capacity() >= 5);
    }

    status
}

fn main() {
    let mut session = Session::new();
    session.load_named("vectors", vectors as fn(&ExecutionOptions) -> TestStatus<'_>);
    session.run().exit();
}
```
!*/

mod cli;
mod clock;
mod console;
mod exit_status;
mod options;
mod registry;
mod reporter;
mod runner;
mod session;
mod status;
mod test;

pub use crate::{
    cli::{parse_args, CliArgs, ColorConfig},
    clock::{Clock, Stopwatch, SystemClock},
    console::Console,
    exit_status::ExitStatus,
    options::{
        ExecutionOptions, OptionsError, MAX_GROUP_NUMBER, MAX_SLEEP_TIME_MS, MAX_SUBTEST_NUMBER,
        NO_CURRENT_TEST, NO_FILTER, RESPONSES_AFTER, RESPONSES_BEFORE,
    },
    registry::{TestRegistry, CASE_ALLOCATION},
    reporter::{ConsoleReporter, LogReporter, NullReporter, Reporter},
    runner::{RunSummary, Runner, RunnerError},
    session::Session,
    status::{Disposition, StatusError, TestStatus},
    test::TestCase,
};
