use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task;
use tracing::warn;

/// Blocking yes/no question to the user.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Answers every prompt the same way and remembers what was asked.
#[derive(Debug)]
pub struct AutoConfirm {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl AutoConfirm {
    pub fn accept() -> Self {
        Self::answering(true)
    }

    pub fn decline() -> Self {
        Self::answering(false)
    }

    fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&self, message: &str) -> bool {
        match self.asked.lock() {
            Ok(mut asked) => asked.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
        self.answer
    }
}

/// Asks on the terminal. Anything but `y`/`yes` declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        // prompt goes to stderr so stdout stays machine readable
        blocking(|| ask(message, io::stdin().lock(), io::stderr()))
    }
}

/// Run a blocking read without stalling other tasks on a multi-thread runtime.
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            task::block_in_place(f)
        }
        _ => f(),
    }
}

fn ask(message: &str, mut input: impl BufRead, mut out: impl Write) -> bool {
    if write!(out, "{message} [y/N] ").and_then(|_| out.flush()).is_err() {
        return false;
    }
    let mut line = String::new();
    if let Err(e) = input.read_line(&mut line) {
        warn!("cannot read confirmation: {e}");
        return false;
    }
    is_yes(&line)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
