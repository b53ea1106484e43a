//! CLI error type.

use thiserror::Error;

/// Errors that end a menu operation or the whole session.
#[derive(Debug, Error)]
pub enum CliError {
    /// Library error: invalid input, rejection, network failure.
    #[error(transparent)]
    Kit(#[from] diam_kit::Error),

    /// The terminal could not be read.
    #[error("Console error: {0}")]
    Console(String),

    /// Input ended (Ctrl-D or end of script).
    #[error("Input closed")]
    Eof,

    /// The user pressed Ctrl-C.
    #[error("Interrupted")]
    Interrupted,
}
