//! Diamante interactive CLI

mod app;
mod console;
mod error;
mod menu;
mod operations;
mod tracing_writer;

use std::process::ExitCode;

use console::TerminalConsole;
use diam_kit::Ledger;
use rustyline_async::Readline;

#[tokio::main]
async fn main() -> ExitCode {
    // Readline first so logs and prompts share one writer.
    let (readline, writer) = match Readline::new("> ".to_string()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to start the console: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = tracing_writer::init(writer.clone()) {
        eprintln!("Logging disabled: {}", e);
    }

    let mut console = TerminalConsole::new(readline, writer);
    let ledger = Ledger::testnet().build();

    let code = match app::run(ledger, &mut console).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "session ended with an error");
            ExitCode::FAILURE
        }
    };
    console.flush();
    code
}
