use std::fmt;
use std::io::{self, BufRead, Stderr, StdinLock, Write};
use std::path::Path;
use tracing::warn;

use crate::core::{ConflictChoice, ConflictDecision, ConflictPrompt};

/// Terminal stand-in for the "file already exists" dialog.
///
/// `ask` blocks on `input`. Drive it from a current-thread runtime, where the
/// paste has nothing else to schedule while the user answers.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
    output_failed: bool,
}

impl ConsolePrompt<StdinLock<'static>, Stderr> {
    /// Read answers from stdin and ask on stderr, keeping stdout free for reports
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            output_failed: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn show(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.output.write_fmt(args).and_then(|()| self.output.flush()) {
            if !self.output_failed {
                warn!("Failed to write conflict prompt: {}", e);
                self.output_failed = true;
            }
        }
    }
}

/// `o`, `r`, `s`, `c` or the full word; a trailing `!` applies it to all conflicts
pub fn parse_answer(answer: &str) -> Option<ConflictDecision> {
    let answer = answer.trim().to_lowercase();
    let (word, apply_to_all) = match answer.strip_suffix('!') {
        Some(word) => (word.trim(), true),
        None => (answer.as_str(), false),
    };

    let choice = match word {
        "o" | "overwrite" => ConflictChoice::Overwrite,
        "r" | "rename" => ConflictChoice::Rename,
        "s" | "skip" => ConflictChoice::Skip,
        "c" | "cancel" => ConflictChoice::Cancel,
        _ => return None,
    };

    Some(ConflictDecision {
        choice,
        apply_to_all,
    })
}

impl<R: BufRead, W: Write> ConflictPrompt for ConsolePrompt<R, W> {
    fn ask(&mut self, source: &Path, target: &Path) -> ConflictDecision {
        self.show(format_args!(
            "\nA file with this name already exists:\n  target: {}\n  source: {}\n",
            target.display(),
            source.display()
        ));

        loop {
            self.show(format_args!(
                "[o]verwrite, [r]ename, [s]kip, [c]ancel (add ! to apply to all): "
            ));

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    warn!("No answer available for {}, cancelling", target.display());
                    return ConflictDecision::once(ConflictChoice::Cancel);
                }
                Err(e) => {
                    warn!("Failed to read answer: {}, cancelling", e);
                    return ConflictDecision::once(ConflictChoice::Cancel);
                }
                Ok(_) => {}
            }

            match parse_answer(&line) {
                Some(decision) => return decision,
                None => self.show(format_args!("Please answer o, r, s or c.\n")),
            }
        }
    }
}
