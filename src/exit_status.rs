//! Process exit codes for battery applications.

use crate::runner::RunSummary;

/// Exit status code used as a result of the battery process.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExitStatus(pub(crate) i32);

impl ExitStatus {
    pub(crate) const OK: Self = Self(0);
    pub(crate) const FAILED: Self = Self(101);

    /// Return the raw exit code.
    #[inline]
    pub fn code(self) -> i32 {
        self.0
    }

    /// Whether this is the success status.
    #[inline]
    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    /// Terminate the process with the exit code.
    ///
    /// This method **should not** be called before the cleanup of the
    /// process has completed.
    #[inline]
    pub fn exit(self) -> ! {
        std::process::exit(self.code());
    }
}

impl From<&RunSummary> for ExitStatus {
    fn from(summary: &RunSummary) -> Self {
        if summary.is_passed() {
            Self::OK
        } else {
            Self::FAILED
        }
    }
}
