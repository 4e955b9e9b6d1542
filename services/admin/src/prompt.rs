//! User prompts
//!
//! Destructive operations ask for confirmation and every outcome is reported
//! through an acknowledgement. The terminal implementation is used by
//! the console; tests supply their own.

use std::io::{self, BufRead, Write};

/// Interactive confirmation and acknowledgement
pub trait Prompt: Send + Sync {
    /// Ask a yes/no question; `false` aborts the operation
    fn confirm(&self, question: &str) -> bool;

    /// Show `message` to the user
    fn acknowledge(&self, message: &str);
}

/// Prompt on stdin/stdout
#[derive(Debug, Default, Clone)]
pub struct TerminalPrompt {
    /// Answer every confirmation with yes
    pub assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{} [y/N] ", question);
        let _ = stdout.flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }

    fn acknowledge(&self, message: &str) {
        println!("{}", message);
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
