#![allow(missing_docs)]

use crate::{
    options::ExecutionOptions,
    reporter::Reporter,
    runner::RunSummary,
    status::{Disposition, TestStatus},
};
use std::{io, io::Write as _};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, StandardStreamLock, WriteColor};

/// The colored word that closes a progress or summary line.
///
/// Every disposition maps to one marker; the same vocabulary is reused for
/// the battery-level verdict so the output reads uniformly.
struct Marker {
    label: &'static str,
    color: Color,
}

impl Marker {
    const OK: Self = Self {
        label: "ok",
        color: Color::Green,
    };
    const FAILED: Self = Self {
        label: "FAILED",
        color: Color::Red,
    };
    const SKIPPED: Self = Self {
        label: "skipped",
        color: Color::Yellow,
    };
    const QUIT: Self = Self {
        label: "quit",
        color: Color::Yellow,
    };
    const ABORTED: Self = Self {
        label: "ABORTED",
        color: Color::Red,
    };

    fn for_status(status: &TestStatus<'_>) -> Self {
        match status.disposition() {
            Disposition::DidNotTest => Self::SKIPPED,
            Disposition::Quitted => Self::QUIT,
            Disposition::Aborted => Self::ABORTED,
            Disposition::Continue | Disposition::Failed => {
                if status.passed() {
                    Self::OK
                } else {
                    Self::FAILED
                }
            }
        }
    }

    fn for_summary(summary: &RunSummary) -> Self {
        if summary.is_passed() {
            Self::OK
        } else {
            Self::FAILED
        }
    }

    fn paint(&self, w: &mut StandardStreamLock<'_>) -> io::Result<()> {
        w.set_color(ColorSpec::new().set_fg(Some(self.color)))?;
        write!(w, "{}", self.label)?;
        w.reset()
    }
}

/// Renders battery progress and the final summary onto standard output.
///
/// Construct it from the governing options so it honors show-progress,
/// verbosity, summarize mode and the output-allowed flag.
pub struct ConsoleReporter {
    stream: StandardStream,
    output_allowed: bool,
    show_progress: bool,
    verbose: bool,
    summarize: bool,
}

impl ConsoleReporter {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stream: StandardStream::stdout(choice),
            output_allowed: true,
            show_progress: true,
            verbose: false,
            summarize: false,
        }
    }

    pub fn from_options(options: &ExecutionOptions, choice: ColorChoice) -> Self {
        Self {
            stream: StandardStream::stdout(choice),
            output_allowed: true,
            show_progress: options.show_progress(),
            verbose: options.is_verbose(),
            summarize: options.summarize(),
        }
    }

    /// Silence all diagnostic printing from this reporter.
    pub fn set_output_allowed(&mut self, allowed: bool) {
        self.output_allowed = allowed;
    }

    fn print_case(&self, w: &mut StandardStreamLock<'_>, status: &TestStatus<'_>) -> io::Result<()> {
        write!(
            w,
            "test {}.{} {} ... ",
            status.group_number(),
            status.case_number(),
            status.case_description(),
        )?;

        if self.summarize {
            writeln!(w, "{} sub-tests (not run)", status.subtest_count())?;
            return Ok(());
        }

        Marker::for_status(status).paint(w)?;

        if self.verbose {
            write!(w, " ({:.3} ms)", status.duration_ms())?;
        }
        writeln!(w)?;
        Ok(())
    }

    fn print_summary(&self, w: &mut StandardStreamLock<'_>, summary: &RunSummary) -> io::Result<()> {
        if summary.failed > 0 {
            writeln!(w)?;
            writeln!(
                w,
                "first failure: test {} (group {}, case {}, sub-test {})",
                summary.first_failed_test,
                summary.first_failed_group,
                summary.first_failed_case,
                summary.first_failed_subtest,
            )?;
        }

        writeln!(w)?;
        write!(w, "test result: ")?;
        Marker::for_summary(summary).paint(w)?;
        write!(w, ".")?;
        writeln!(
            w,
            " {passed} passed; {failed} failed; {skipped} skipped; {errors} error{suffix}; \
             finished in {duration:.3} ms",
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            errors = summary.total_errors,
            suffix = if summary.total_errors == 1 { "" } else { "s" },
            duration = summary.duration_ms,
        )?;

        Ok(())
    }
}

impl Reporter for ConsoleReporter {
    fn battery_starting(&self, count: usize) {
        if !self.output_allowed {
            return;
        }
        let mut w = self.stream.lock();
        let suffix = match count {
            1 => "",
            _ => "s",
        };
        let _ = writeln!(w, "running {} test{}", count, suffix);
    }

    fn battery_ended(&self, summary: &RunSummary) {
        if !self.output_allowed {
            return;
        }
        let mut w = self.stream.lock();
        let _ = self.print_summary(&mut w, summary);
    }

    fn case_starting(&self, index: usize, name: Option<&str>) {
        if !self.output_allowed || !self.verbose {
            return;
        }
        let mut w = self.stream.lock();
        match name {
            Some(name) => {
                let _ = writeln!(w, "-- test {} ({})", index, name);
            }
            None => {
                let _ = writeln!(w, "-- test {}", index);
            }
        }
    }

    fn case_ended(&self, status: &TestStatus<'_>) {
        if !self.output_allowed || !self.show_progress {
            return;
        }
        let mut w = self.stream.lock();
        let _ = self.print_case(&mut w, status);
    }
}
