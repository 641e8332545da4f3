//! Definition of command line interface.
//!
//! The flags re-derive an [`ExecutionOptions`] from command-line-like
//! tokens. A malformed or out-of-range numeric argument fails the whole
//! parse; the partially-mutated options value is discarded by the caller.

use crate::options::ExecutionOptions;
use getopts::Options;
use std::{path::Path, str::FromStr};

/// The color configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColorConfig {
    Auto,
    Always,
    Never,
}

impl FromStr for ColorConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorConfig::Auto),
            "always" => Ok(ColorConfig::Always),
            "never" => Ok(ColorConfig::Never),
            v => Err(anyhow::anyhow!(
                "argument for --color must be auto, always, or never (was {})",
                v
            )),
        }
    }
}

/// The parsed command line.
#[derive(Debug)]
pub struct CliArgs {
    pub options: ExecutionOptions,
    pub list_tests: bool,
    pub color: ColorConfig,
    pub show_help: bool,
    pub show_version: bool,
}

pub(crate) struct Parser {
    args: Vec<String>,
    opts: Options,
}

impl Parser {
    pub(crate) fn new(args: impl IntoIterator<Item = String>) -> Self {
        let mut opts = Options::new();
        opts.optflag("h", "help", "Display this message");
        opts.optflag("", "version", "Display the version and exit");
        opts.optflag("", "list", "List the registered tests without running them");
        opts.optopt(
            "",
            "color",
            "Configure coloring of output:
                auto   = colorize if stdout is a tty (default);
                always = always colorize output;
                never  = never colorize output;",
            "auto|always|never",
        );

        opts.optflag("v", "verbose", "Narrate each test case");
        opts.optflag("", "no-verbose", "");
        opts.optflag("", "show-values", "Let test bodies print expected/actual values");
        opts.optflag("", "no-show-values", "");
        opts.optflag("", "show-step-numbers", "Trace each sub-test as it is registered");
        opts.optflag("", "no-show-step-numbers", "");
        opts.optflag("", "show-progress", "Print one line per finished test case");
        opts.optflag("", "no-show-progress", "");
        opts.optflag("", "text-synch", "Reserved");
        opts.optflag("", "no-text-synch", "");
        opts.optflag("", "stop-on-error", "Halt the battery at the first failing test");
        opts.optflag("", "no-stop-on-error", "");
        opts.optflag("", "batch-mode", "Answer every prompt from the stored responses");
        opts.optflag("", "no-batch-mode", "");
        opts.optflag("", "interactive", "Ask before and after each test case");
        opts.optflag("", "no-interactive", "");
        opts.optflag("", "beeps", "Ring the bell before each prompt");
        opts.optflag("", "no-beeps", "");
        opts.optflag("", "case-pause", "Wait for a keypress between test cases");
        opts.optflag("", "no-case-pause", "");
        opts.optflag("", "summarize", "Report test structure without running sub-tests");
        opts.optflag("", "no-summarize", "");
        opts.optflag("", "require-sub-tests", "Fail tests that register no sub-tests");
        opts.optflag("", "force-failure", "Treat every reported result as a failure");

        opts.optopt("", "group", "Run only this test group", "N|name");
        opts.optopt("", "case", "Run only this test case", "N|name");
        opts.optopt("", "sub-test", "Run only this sub-test", "N|name");
        opts.optopt("", "sleep-time", "Milliseconds to sleep between tests", "N");

        Self {
            args: args.into_iter().collect(),
            opts,
        }
    }

    pub(crate) fn print_usage(&self) {
        let binary = self.args.get(0).map(String::as_str).unwrap_or("battery");
        let progname = Path::new(binary)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(binary);

        let message = format!("Usage: {} [OPTIONS]", progname);
        eprintln!("{}", self.opts.usage(&message));
    }

    pub(crate) fn print_version(&self) {
        eprintln!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }

    pub(crate) fn parse(&self) -> anyhow::Result<CliArgs> {
        let args = &self.args[..];
        let matches = self.opts.parse(args.get(1..).unwrap_or(args))?;

        let show_help = matches.opt_present("help");
        let show_version = matches.opt_present("version");
        let list_tests = matches.opt_present("list");
        let color = matches.opt_get("color")?.unwrap_or(ColorConfig::Auto);

        let mut options = ExecutionOptions::default();

        // Each pair applies the positive flag first, so an explicit
        // negative always wins. Summarize goes last so its cascade lands on
        // the final interactive/case-pause values.
        let mut toggle = |name: &str, set: &mut dyn FnMut(&mut ExecutionOptions, bool)| {
            if matches.opt_present(name) {
                set(&mut options, true);
            }
            if matches.opt_present(&format!("no-{}", name)) {
                set(&mut options, false);
            }
        };
        toggle("verbose", &mut |o, on| o.set_verbose(on));
        toggle("show-values", &mut |o, on| o.set_show_values(on));
        toggle("show-step-numbers", &mut |o, on| o.set_show_step_numbers(on));
        toggle("show-progress", &mut |o, on| o.set_show_progress(on));
        toggle("text-synch", &mut |o, on| o.set_text_synch(on));
        toggle("stop-on-error", &mut |o, on| o.set_stop_on_error(on));
        toggle("batch-mode", &mut |o, on| o.set_batch_mode(on));
        toggle("interactive", &mut |o, on| o.set_interactive(on));
        toggle("beeps", &mut |o, on| o.set_beep_prompt(on));
        toggle("case-pause", &mut |o, on| o.set_case_pause(on));
        toggle("summarize", &mut |o, on| o.set_summarize(on));

        if matches.opt_present("require-sub-tests") {
            options.set_need_subtests(true);
        }
        if matches.opt_present("force-failure") {
            options.set_force_failure(true);
        }

        if let Some(value) = matches.opt_str("group") {
            match value.parse::<i32>() {
                Ok(number) => options.set_single_group(number)?,
                Err(..) => options.set_group_name(Some(&value)),
            }
        }
        if let Some(value) = matches.opt_str("case") {
            match value.parse::<i32>() {
                Ok(number) => options.set_single_case(number)?,
                Err(..) => options.set_case_name(Some(&value)),
            }
        }
        if let Some(value) = matches.opt_str("sub-test") {
            match value.parse::<i32>() {
                Ok(number) => options.set_single_subtest(number)?,
                Err(..) => options.set_subtest_name(Some(&value)),
            }
        }
        if let Some(value) = matches.opt_str("sleep-time") {
            let ms = value
                .parse::<u32>()
                .map_err(|err| anyhow::anyhow!("argument for --sleep-time: {}", err))?;
            options.set_sleep_time_ms(ms)?;
        }

        Ok(CliArgs {
            options,
            list_tests,
            color,
            show_help,
            show_version,
        })
    }
}

/// Parse command-line-like tokens. The first token is the program name.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<CliArgs> {
    Parser::new(args).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::NO_FILTER;

    fn parse(tokens: &[&str]) -> anyhow::Result<CliArgs> {
        let mut args = vec!["battery".to_owned()];
        args.extend(tokens.iter().map(|s| (*s).to_owned()));
        parse_args(args)
    }

    #[test]
    fn empty_command_line_keeps_the_defaults() {
        let parsed = parse(&[]).unwrap();
        assert_eq!(parsed.options, ExecutionOptions::default());
        assert!(!parsed.list_tests);
        assert_eq!(parsed.color, ColorConfig::Auto);
        assert!(!parsed.show_help);
        assert!(!parsed.show_version);
    }

    #[test]
    fn toggles_round_trip() {
        let parsed = parse(&["--verbose", "--stop-on-error", "--case-pause"]).unwrap();
        assert!(parsed.options.is_verbose());
        assert!(parsed.options.stop_on_error());
        assert!(parsed.options.case_pause());
    }

    #[test]
    fn negative_flags_win() {
        let parsed = parse(&["--verbose", "--no-verbose"]).unwrap();
        assert!(!parsed.options.is_verbose());
    }

    #[test]
    fn batch_mode_cascade_applies() {
        let parsed = parse(&["--batch-mode"]).unwrap();
        assert!(parsed.options.batch_mode());
        assert!(parsed.options.interactive());
        assert_eq!(parsed.options.response_before(), 'c');
    }

    #[test]
    fn summarize_cascade_lands_last() {
        let parsed = parse(&["--interactive", "--case-pause", "--summarize"]).unwrap();
        assert!(parsed.options.summarize());
        assert!(!parsed.options.interactive());
        assert!(!parsed.options.case_pause());
    }

    #[test]
    fn group_accepts_number_or_name() {
        let parsed = parse(&["--group", "7"]).unwrap();
        assert_eq!(parsed.options.single_group(), 7);
        assert_eq!(parsed.options.group_name(), None);

        let parsed = parse(&["--group", "parser"]).unwrap();
        assert_eq!(parsed.options.single_group(), NO_FILTER);
        assert_eq!(parsed.options.group_name(), Some("parser"));
    }

    #[test]
    fn out_of_range_group_fails_the_parse() {
        assert!(parse(&["--group", "101"]).is_err());
        assert!(parse(&["--sub-test", "1001"]).is_err());
    }

    #[test]
    fn malformed_sleep_time_fails_the_parse() {
        assert!(parse(&["--sleep-time", "abc"]).is_err());
        assert!(parse(&["--sleep-time", "-5"]).is_err());
        assert!(parse(&["--sleep-time", "3600001"]).is_err());

        let parsed = parse(&["--sleep-time", "250"]).unwrap();
        assert_eq!(parsed.options.sleep_time_ms(), 250);
    }

    #[test]
    fn unknown_flags_fail_the_parse() {
        assert!(parse(&["--frobnicate"]).is_err());
    }

    #[test]
    fn help_version_and_list_are_reported() {
        assert!(parse(&["--help"]).unwrap().show_help);
        assert!(parse(&["--version"]).unwrap().show_version);
        assert!(parse(&["--list"]).unwrap().list_tests);
        assert_eq!(parse(&["--color", "never"]).unwrap().color, ColorConfig::Never);
        assert!(parse(&["--color", "sometimes"]).is_err());
    }
}
