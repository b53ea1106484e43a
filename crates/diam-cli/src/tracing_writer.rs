//! Log output for the interactive console.
//!
//! Events are formatted by `tracing-subscriber` and printed through the
//! readline writer, so they land above the prompt instead of inside the
//! line being typed. Each event is collected whole and anything shaped like
//! an `S...` secret seed is masked before it reaches the terminal.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use regex::Regex;
use rustyline_async::SharedWriter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Default verbosity: warnings everywhere, lifecycle events from our crates.
pub const LOG_DIRECTIVES: &str = "warn,diam_kit=info,diam_cli=info";

/// An encoded secret seed: `S` followed by 55 base32 characters.
const SEED_PATTERN: &str = r"\bS[A-Z2-7]{55}\b";

const SEED_MASK: &str = "S***";

/// Destination for formatted log events.
pub struct LogSink<W> {
    out: Arc<Mutex<W>>,
    seed: Regex,
}

impl<W: Write> LogSink<W> {
    pub fn new(out: W) -> Result<Self, regex::Error> {
        Ok(Self {
            out: Arc::new(Mutex::new(out)),
            seed: Regex::new(SEED_PATTERN)?,
        })
    }
}

/// One event being formatted. The masked line is written when it is dropped.
pub struct EventLine<W: Write> {
    line: Vec<u8>,
    out: Arc<Mutex<W>>,
    seed: Regex,
}

impl<W: Write> Write for EventLine<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.line.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> Drop for EventLine<W> {
    fn drop(&mut self) {
        if self.line.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.line);
        let masked = self.seed.replace_all(&text, SEED_MASK);
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(masked.as_bytes());
            let _ = out.flush();
        }
    }
}

impl<'a, W: Write + 'a> MakeWriter<'a> for LogSink<W> {
    type Writer = EventLine<W>;

    fn make_writer(&'a self) -> Self::Writer {
        EventLine {
            line: Vec::new(),
            out: self.out.clone(),
            seed: self.seed.clone(),
        }
    }
}

/// Install the global subscriber. The filter is fixed; the environment is not read.
pub fn init(writer: SharedWriter) -> Result<(), regex::Error> {
    tracing_subscriber::fmt()
        .with_writer(LogSink::new(writer)?)
        .with_env_filter(EnvFilter::new(LOG_DIRECTIVES))
        .with_target(false)
        .with_level(true)
        .without_time()
        .with_ansi(false)
        .init();
    Ok(())
}
