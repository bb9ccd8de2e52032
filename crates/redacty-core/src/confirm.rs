//! Confirmation gate before anonymized rows are committed

use std::io::{self, BufRead, Write};

pub trait Confirmer {
    /// Asked once, after updates for `count` considered records are staged.
    fn confirm(&mut self, count: usize) -> io::Result<bool>;
}

impl<F> Confirmer for F
where
    F: FnMut(usize) -> bool,
{
    fn confirm(&mut self, count: usize) -> io::Result<bool> {
        Ok(self(count))
    }
}

/// Interactive yes/no prompt. Blocks until a line (or EOF) is read.
pub struct PromptConfirmer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirmer<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirmer for PromptConfirmer<R, W> {
    fn confirm(&mut self, count: usize) -> io::Result<bool> {
        write!(self.output, "{} records will be anonymized. Proceed? (y/N) ", count)?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
