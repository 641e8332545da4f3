#![allow(missing_docs)]

use crate::{
    reporter::Reporter,
    runner::RunSummary,
    status::{Disposition, TestStatus},
};

/// Mirrors battery progress onto the `log` facade, for embedding the
/// harness in a program that already has a logger installed.
#[derive(Debug, Clone)]
pub struct LogReporter {
    _p: (),
}

impl LogReporter {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { _p: () }
    }
}

impl Reporter for LogReporter {
    fn battery_starting(&self, count: usize) {
        let suffix = match count {
            1 => "",
            _ => "s",
        };
        log::info!("running {} test{}", count, suffix);
    }

    fn battery_ended(&self, summary: &RunSummary) {
        if summary.is_passed() {
            log::info!(
                "battery result: ok ({} passed; {} skipped)",
                summary.passed,
                summary.skipped
            );
        } else {
            log::error!(
                "battery result: FAILED ({} passed; {} failed; first failure at test {})",
                summary.passed,
                summary.failed,
                summary.first_failed_test
            );
        }
    }

    fn case_starting(&self, index: usize, name: Option<&str>) {
        match name {
            Some(name) => log::info!("start: test {} ({})", index, name),
            None => log::info!("start: test {}", index),
        }
    }

    fn case_ended(&self, status: &TestStatus<'_>) {
        let id = format!(
            "{}.{} {}",
            status.group_number(),
            status.case_number(),
            status.case_description()
        );
        match status.disposition() {
            Disposition::DidNotTest => log::info!("{}: skipped", id),
            Disposition::Quitted => log::info!("{}: quit", id),
            Disposition::Aborted => log::error!("{}: ABORTED", id),
            Disposition::Continue | Disposition::Failed => {
                if status.passed() {
                    log::info!("{}: ok", id);
                } else {
                    log::error!("{}: FAILED", id);
                }
            }
        }
    }
}
