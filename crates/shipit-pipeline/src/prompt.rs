//! Operator prompts
//!
//! The confirmation gate and the `ask` step both block on a single yes/no
//! answer. Only `y` and `yes` (any case, surrounding whitespace ignored) count
//! as affirmative; anything else, end of input included, declines.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Stderr, Stdin, Write};
use std::sync::{Arc, Mutex};

use shipit_core::Result;

/// Source of yes/no answers
pub trait Prompt {
    /// Ask `question`; `true` only for an affirmative answer
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Whether an answer is affirmative
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Prompt that writes the question and reads one line
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    /// Prompt over any reader/writer pair
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl LinePrompt<BufReader<Stdin>, Stderr> {
    /// Prompt on stdin, questions on stderr
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.writer, "{} [y/N] ", question)?;
        self.writer.flush()?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        Ok(read > 0 && is_affirmative(&line))
    }
}

/// Prompt that always answers yes
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        tracing::info!(question, "assuming yes");
        Ok(true)
    }
}

/// Prompt answering from a fixed script, recording every question asked.
/// Runs out of answers like a closed stdin.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompt {
    /// Prompt that gives `answers` in order
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Arc::default(),
        }
    }

    /// Shared log of asked questions; stays valid after the prompt is moved
    pub fn questions(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.asked)
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.asked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(question.to_string());
        Ok(self
            .answers
            .pop_front()
            .is_some_and(|answer| is_affirmative(&answer)))
    }
}
