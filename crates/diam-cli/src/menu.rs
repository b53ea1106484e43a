//! Numbered operation menu.
//!
//! Each entry is a [`MenuOperation`] trait object registered under a key.
//! Adding an operation means registering one more entry; the dispatch loop
//! never changes.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use diam_kit::Session;

use crate::console::Console;
use crate::error::CliError;

/// Key reserved for leaving the menu.
pub const EXIT_KEY: u32 = 0;

/// Boxed future returned by [`MenuOperation::run`].
pub type MenuFuture<'a> = Pin<Box<dyn Future<Output = Result<(), CliError>> + 'a>>;

/// A user-selectable operation.
pub trait MenuOperation {
    /// Label shown in the menu.
    fn title(&self) -> &str;

    /// Prompt for parameters and perform the operation for the session account.
    fn run<'a>(&'a self, session: &'a mut Session, console: &'a mut dyn Console) -> MenuFuture<'a>;
}

/// What a line typed at the menu prompt selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Exit,
    Operation(u32),
    Invalid,
}

/// Operations keyed by number, rendered in key order.
#[derive(Default)]
pub struct MenuRegistry {
    entries: BTreeMap<u32, Box<dyn MenuOperation>>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `operation` under `key`, replacing any previous entry.
    ///
    /// [`EXIT_KEY`] cannot be taken.
    pub fn register(&mut self, key: u32, operation: impl MenuOperation + 'static) -> &mut Self {
        if key == EXIT_KEY {
            tracing::warn!(title = operation.title(), "menu key 0 is reserved for exit");
            return self;
        }
        self.entries.insert(key, Box::new(operation));
        self
    }

    pub fn get(&self, key: u32) -> Option<&dyn MenuOperation> {
        self.entries.get(&key).map(|op| op.as_ref())
    }

    /// Interpret a line typed at the menu prompt.
    pub fn choose(&self, input: &str) -> Choice {
        match input.trim().parse::<u32>() {
            Ok(EXIT_KEY) => Choice::Exit,
            Ok(key) if self.entries.contains_key(&key) => Choice::Operation(key),
            _ => Choice::Invalid,
        }
    }

    /// The menu text, one line per entry followed by the exit line.
    pub fn render(&self) -> String {
        let mut text = String::from("Select an operation to perform:");
        for (key, operation) in &self.entries {
            text.push_str(&format!("\n{}. {}", key, operation.title()));
        }
        text.push_str(&format!("\n{}. Exit", EXIT_KEY));
        text
    }
}
