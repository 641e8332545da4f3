//! The application-facing entry point: CLI parsing, the optional locale
//! hook, and the conversion of a battery outcome into an exit status.

use crate::{
    cli::{ColorConfig, Parser},
    clock::Clock,
    console::Console,
    exit_status::ExitStatus,
    options::ExecutionOptions,
    reporter::{ConsoleReporter, Reporter},
    runner::{RunSummary, Runner, RunnerError},
    test::TestCase,
};
use termcolor::ColorChoice;

type LocaleInit = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// Owns a runner and a console and drives one battery application.
///
/// ```no_run
/// use spelt::{ExecutionOptions, Session, TestStatus};
///
/// fn arithmetic(options: &ExecutionOptions) -> TestStatus<'_> {
///     let mut status = TestStatus::start(options, 1, 1, "math", "arithmetic").unwrap();
///     if status.next_subtest("addition") {
///         status.pass(2 + 2 == 4);
///     }
///     status
/// }
///
/// let mut session = Session::new();
/// session.load_named("arithmetic", arithmetic as fn(&ExecutionOptions) -> TestStatus<'_>);
/// session.run().exit();
/// ```
pub struct Session {
    runner: Runner,
    console: Console,
    locale_init: Option<LocaleInit>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            runner: Runner::new(),
            console: Console::new(),
            locale_init: None,
        }
    }

    /// Replace the interaction console, e.g. with one reading scripted
    /// responses.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Replace the runner's clock; registered tests are unaffected.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.runner.set_clock(clock);
        self
    }

    /// Register a locale-binding step to run once before the battery.
    ///
    /// A failure only disables message translation: it is logged as a
    /// warning and the run continues.
    pub fn with_locale_init(
        mut self,
        init: impl FnOnce() -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.locale_init = Some(Box::new(init));
        self
    }

    pub fn load(&mut self, case: impl TestCase + 'static) {
        self.runner.load(case);
    }

    pub fn load_named(&mut self, name: impl Into<String>, case: impl TestCase + 'static) {
        self.runner.load_named(name, case);
    }

    #[inline]
    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    #[inline]
    pub fn runner_mut(&mut self) -> &mut Runner {
        &mut self.runner
    }

    /// Run the battery against already-built options, for embedders that
    /// bypass the CLI.
    pub fn run_battery(
        &mut self,
        options: &ExecutionOptions,
        reporter: &dyn Reporter,
    ) -> Result<RunSummary, RunnerError> {
        self.bind_locale();
        self.runner.run(options, &mut self.console, reporter)
    }

    /// Parse the process arguments and run.
    pub fn run(&mut self) -> ExitStatus {
        self.run_with_args(std::env::args())
    }

    /// Parse the given tokens (the first is the program name) and run.
    pub fn run_with_args(&mut self, args: impl IntoIterator<Item = String>) -> ExitStatus {
        let parser = Parser::new(args);
        let args = match parser.parse() {
            Ok(args) => args,
            Err(err) => {
                eprintln!("CLI argument error: {}", err);
                return ExitStatus::FAILED;
            }
        };

        if args.show_help {
            parser.print_usage();
            return ExitStatus::OK;
        }
        if args.show_version {
            parser.print_version();
            return ExitStatus::OK;
        }
        if args.list_tests {
            self.print_list();
            return ExitStatus::OK;
        }

        self.bind_locale();

        let choice = match args.color {
            ColorConfig::Auto => ColorChoice::Auto,
            ColorConfig::Always => ColorChoice::Always,
            ColorConfig::Never => ColorChoice::Never,
        };
        let reporter = ConsoleReporter::from_options(&args.options, choice);

        match self.runner.run(&args.options, &mut self.console, &reporter) {
            Ok(summary) => ExitStatus::from(&summary),
            Err(err) => {
                eprintln!("battery error: {}", err);
                ExitStatus::FAILED
            }
        }
    }

    fn bind_locale(&mut self) {
        if let Some(init) = self.locale_init.take() {
            if let Err(err) = init() {
                log::warn!("locale setup failed, translation disabled: {}", err);
            }
        }
    }

    fn print_list(&self) {
        let mut num_tests = 0;
        for (index, name) in self.runner.registry().names() {
            num_tests += 1;
            match name {
                Some(name) => println!("{}: {}", index, name),
                None => println!("{}: <unnamed>", index),
            }
        }

        fn plural_suffix(n: usize) -> &'static str {
            match n {
                1 => "",
                _ => "s",
            }
        }

        if num_tests != 0 {
            println!();
        }
        println!("{} test{}", num_tests, plural_suffix(num_tests));
    }
}
