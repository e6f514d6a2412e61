//! Block parsing
//!
//! Turns one blank-line-delimited block into a [`ParsedEvent`]. Pure and
//! stateless; framing across chunks is the splitter's job.

use super::events::{ParsedEvent, SseLine, DEFAULT_EVENT_NAME};

/// Classify a single line. A trailing `\r` is ignored.
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(rest) = line.strip_prefix(':') {
        return SseLine::Comment(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        // Only the single separator space goes; tokens keep their own
        // leading whitespace.
        let value = rest.strip_prefix(' ').unwrap_or(rest);
        return SseLine::Data(value.to_string());
    }

    SseLine::Other(line.to_string())
}

/// Parse a block into its event.
///
/// When several `event:` lines occur the last one names the event, which is
/// what the existing producer relies on. Data lines are joined with `\n` in
/// block order.
pub fn parse_block(block: &str) -> ParsedEvent {
    let mut name: Option<String> = None;
    let mut data_lines: Vec<String> = Vec::new();

    for line in block.split('\n') {
        match parse_sse_line(line) {
            SseLine::Event(event_name) => name = Some(event_name),
            SseLine::Data(data) => data_lines.push(data),
            SseLine::Empty | SseLine::Comment(_) | SseLine::Other(_) => {}
        }
    }

    ParsedEvent {
        name: name.unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
        data: data_lines.join("\n"),
    }
}
