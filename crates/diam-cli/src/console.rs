//! Line-oriented console: the terminal implementation and prompt helpers.

use std::fmt::Display;
use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use rustyline_async::{Readline, ReadlineEvent, SharedWriter};

use crate::error::CliError;

/// Boxed future returned by [`Console`] reads.
pub type ConsoleFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Thread-safe line printer, usable from stream callbacks.
pub type Printer = Arc<dyn Fn(String) + Send + Sync>;

/// Source of user input and sink for messages.
pub trait Console {
    /// Read one trimmed line. `None` means input has ended.
    fn read_line<'a>(&'a mut self, prompt: &'a str) -> ConsoleFuture<'a, Result<Option<String>, CliError>>;

    /// Read a secret. The answer is never kept in history.
    fn read_secret<'a>(&'a mut self, prompt: &'a str) -> ConsoleFuture<'a, Result<Option<String>, CliError>>;

    /// Print one message.
    fn say(&mut self, message: &str);

    /// A printer that outlives the current borrow.
    fn printer(&self) -> Printer;
}

/// Interactive terminal backed by `rustyline-async`.
pub struct TerminalConsole {
    readline: Readline,
    writer: SharedWriter,
}

impl TerminalConsole {
    pub fn new(readline: Readline, writer: SharedWriter) -> Self {
        Self { readline, writer }
    }

    /// Flush pending output before the process exits.
    pub fn flush(&mut self) {
        let _ = self.readline.flush();
    }

    async fn next_line(&mut self, prompt: &str, remember: bool) -> Result<Option<String>, CliError> {
        self.readline
            .update_prompt(prompt)
            .map_err(|e| CliError::Console(e.to_string()))?;

        match self.readline.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let line = line.trim().to_string();
                if remember && !line.is_empty() {
                    self.readline.add_history_entry(line.clone());
                }
                Ok(Some(line))
            }
            Ok(ReadlineEvent::Eof) => Ok(None),
            Ok(ReadlineEvent::Interrupted) => Err(CliError::Interrupted),
            Err(e) => Err(CliError::Console(e.to_string())),
        }
    }
}

impl Console for TerminalConsole {
    fn read_line<'a>(&'a mut self, prompt: &'a str) -> ConsoleFuture<'a, Result<Option<String>, CliError>> {
        Box::pin(self.next_line(prompt, true))
    }

    fn read_secret<'a>(&'a mut self, prompt: &'a str) -> ConsoleFuture<'a, Result<Option<String>, CliError>> {
        Box::pin(self.next_line(prompt, false))
    }

    fn say(&mut self, message: &str) {
        let _ = writeln!(self.writer, "{}", message);
    }

    fn printer(&self) -> Printer {
        let writer = Mutex::new(self.writer.clone());
        Arc::new(move |line| {
            if let Ok(mut writer) = writer.lock() {
                let _ = writeln!(writer, "{}", line);
            }
        })
    }
}

// ============================================================================
// Prompt helpers
// ============================================================================

/// Ask until `parse` accepts the answer, repeating only this prompt.
pub async fn ask<T, E: Display>(
    console: &mut dyn Console,
    prompt: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<T, CliError> {
    loop {
        let line = console.read_line(prompt).await?.ok_or(CliError::Eof)?;
        match parse(&line) {
            Ok(value) => return Ok(value),
            Err(e) => console.say(&format!("{}. Please try again.", e)),
        }
    }
}

/// Ask for a field that `check` validates, keeping the text as typed.
pub async fn ask_field<T, E: Display>(
    console: &mut dyn Console,
    prompt: &str,
    check: impl Fn(&str) -> Result<T, E>,
) -> Result<String, CliError> {
    ask(console, prompt, |line| check(line).map(|_| line.to_string())).await
}

// ============================================================================
// Scripted console
// ============================================================================

/// Console fed from a fixed script, recording everything it prints.
#[cfg(test)]
pub struct ScriptedConsole {
    input: std::collections::VecDeque<String>,
    output: Arc<Mutex<Vec<String>>>,
    prompts: Vec<String>,
}

#[cfg(test)]
impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: Arc::new(Mutex::new(Vec::new())),
            prompts: Vec::new(),
        }
    }

    /// Everything printed so far, one entry per message.
    pub fn output(&self) -> Vec<String> {
        self.output.lock().unwrap().clone()
    }

    /// Whether any printed message contains `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.output().iter().any(|line| line.contains(needle))
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    fn next(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.input.pop_front().map(|line| line.trim().to_string())
    }
}

#[cfg(test)]
impl Console for ScriptedConsole {
    fn read_line<'a>(&'a mut self, prompt: &'a str) -> ConsoleFuture<'a, Result<Option<String>, CliError>> {
        let line = self.next(prompt);
        Box::pin(async move { Ok(line) })
    }

    fn read_secret<'a>(&'a mut self, prompt: &'a str) -> ConsoleFuture<'a, Result<Option<String>, CliError>> {
        self.read_line(prompt)
    }

    fn say(&mut self, message: &str) {
        self.output.lock().unwrap().push(message.to_string());
    }

    fn printer(&self) -> Printer {
        let output = self.output.clone();
        Arc::new(move |line| output.lock().unwrap().push(line))
    }
}
