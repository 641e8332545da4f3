//! The interaction context: prompt reading, the case-pause wait and the
//! bell.
//!
//! An explicit value owned by the session and passed by reference into the
//! runner — never process-wide state. Prompts go to standard error so they
//! stay visible when standard output is redirected.

use std::io::{self, BufRead, Write as _};

/// Reads interactive responses and paces manual confirmation.
pub struct Console {
    input: Box<dyn BufRead>,
}

impl Console {
    /// A console reading from standard input.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            input: Box::new(io::BufReader::new(io::stdin())),
        }
    }

    /// A console reading from the given source. The seam used by tests and
    /// by embedders that script their responses.
    pub fn with_input(input: impl BufRead + 'static) -> Self {
        Self {
            input: Box::new(input),
        }
    }

    /// Print a prompt and read a one-character response, folded to
    /// lowercase. Returns `None` on end of input or a read error; callers
    /// fall back to the stored response character.
    pub fn read_response(&mut self, prompt: &str, beep: bool) -> Option<char> {
        if beep {
            eprint!("\x07");
        }
        eprint!("{} ", prompt);
        let _ = io::stderr().flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(..) => None,
            Ok(..) => line
                .chars()
                .find(|c| !c.is_whitespace())
                .map(|c| c.to_ascii_lowercase()),
        }
    }

    /// Print a prompt and block until the next line of input (or end of
    /// input).
    pub fn pause(&mut self, prompt: &str, beep: bool) {
        if beep {
            eprint!("\x07");
        }
        eprint!("{} ", prompt);
        let _ = io::stderr().flush();

        let mut line = String::new();
        let _ = self.input.read_line(&mut line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn first_character_is_folded() {
        let mut console = Console::with_input(Cursor::new("  Skip\n"));
        assert_eq!(console.read_response("?", false), Some('s'));
    }

    #[test]
    fn end_of_input_yields_none() {
        let mut console = Console::with_input(Cursor::new(""));
        assert_eq!(console.read_response("?", false), None);
    }

    #[test]
    fn blank_line_yields_none_character() {
        let mut console = Console::with_input(Cursor::new("\n"));
        assert_eq!(console.read_response("?", false), None);
    }

    #[test]
    fn pause_consumes_one_line() {
        let mut console = Console::with_input(Cursor::new("first\nq\n"));
        console.pause("press enter", false);
        assert_eq!(console.read_response("?", false), Some('q'));
    }
}
