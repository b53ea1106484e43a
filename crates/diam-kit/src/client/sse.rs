//! Incremental `text/event-stream` decoder.
//!
//! Bytes arrive in arbitrary chunks; the decoder buffers partial lines and
//! emits an [`SseEvent`] for each blank-line-terminated block. A line longer
//! than [`MAX_LINE_LEN`] fails the stream.

use crate::error::StreamError;

/// Longest line accepted, in bytes. Horizon payment records are a few KB.
pub(crate) const MAX_LINE_LEN: usize = 64 * 1024;

/// One dispatched server-sent event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SseEvent {
    /// `event:` field, if present.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
    /// `id:` field, if present.
    pub id: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    has_fields: bool,
}

impl SseDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event it completes.
    ///
    /// Only the unterminated tail of a chunk is buffered, so each byte is
    /// copied at most once.
    pub(crate) fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, StreamError> {
        let mut events = Vec::new();
        for piece in chunk.split_inclusive(|&b| b == b'\n') {
            let Some(line) = piece.strip_suffix(b"\n") else {
                self.buffer.extend_from_slice(piece);
                check_line_len(self.buffer.len())?;
                continue;
            };

            let event = if self.buffer.is_empty() {
                check_line_len(line.len())?;
                self.decode_line(line)
            } else {
                let mut pending = std::mem::take(&mut self.buffer);
                pending.extend_from_slice(line);
                check_line_len(pending.len())?;
                let event = self.decode_line(&pending);
                pending.clear();
                self.buffer = pending;
                event
            };
            events.extend(event);
        }
        Ok(events)
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<SseEvent> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        self.process_line(&String::from_utf8_lossy(line))
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // `retry` and unknown fields are ignored; the stream never reconnects.
            _ => return None,
        }
        self.has_fields = true;
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if !self.has_fields {
            return None;
        }
        self.has_fields = false;
        Some(SseEvent {
            event: self.event.take(),
            data: std::mem::take(&mut self.data).join("\n"),
            id: self.id.take(),
        })
    }
}

fn check_line_len(len: usize) -> Result<(), StreamError> {
    if len > MAX_LINE_LEN {
        return Err(StreamError::Transport(format!(
            "event stream line exceeds {} bytes",
            MAX_LINE_LEN
        )));
    }
    Ok(())
}
