// Incremental decoding of text/event-stream bodies

/// Streaming decoder for `text/event-stream` payloads.
///
/// Bytes are fed in as they arrive off the wire and complete event payloads
/// come back in order. Framing matches what an `EventSource` client observes:
/// consecutive `data:` lines within one event are joined with `\n`, a blank
/// line dispatches the event, comment lines and non-`data` fields are
/// skipped, and an event still incomplete when the stream ends is never
/// dispatched. Lines are terminated by LF or CRLF.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning the payloads of any events they complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let rest = self.buffer.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buffer, rest);
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let text = String::from_utf8_lossy(&line);
            if let Some(payload) = self.process_line(&text) {
                events.push(payload);
            }
        }

        events
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        // Blank line: dispatch the accumulated event, if any.
        if line.is_empty() {
            if self.data_lines.is_empty() {
                return None;
            }
            let payload = self.data_lines.join("\n");
            self.data_lines.clear();
            if payload.is_empty() {
                return None;
            }
            return Some(payload);
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        if field == "data" {
            self.data_lines.push(value.to_string());
        }
        None
    }
}
