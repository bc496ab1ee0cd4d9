//! Server-Sent Events (SSE) processing for streamed replies.
//!
//! The conversation endpoint answers with `data: {json}` events separated by blank
//! lines and terminated by `data: [DONE]`. This module turns the raw byte stream into
//! a lazily produced stream of [`ReplyEvent`]s.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::observability::{STREAM_ERRORS, STREAM_EVENTS};
use crate::types::ReplyEvent;
use crate::{Error, Result};

/// Marker the server sends in place of a final JSON payload.
const DONE_MARKER: &str = "[DONE]";

/// Process a stream of bytes into a stream of reply events.
///
/// Bytes are buffered until a complete event is available, so multi-byte characters
/// split across network chunks are decoded intact. The returned stream ends at the
/// `[DONE]` marker or when the byte stream ends.
pub fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<ReplyEvent>>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    // Convert transport errors to our error type
    let stream = Box::pin(byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    }));

    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer, false),
        move |(mut stream, mut buffer, mut done)| async move {
            if done {
                return None;
            }
            loop {
                // First check if we have a complete event in the buffer
                if let Some((frame, remaining)) = split_frame(&buffer) {
                    buffer = remaining;
                    match parse_frame(&frame) {
                        Frame::Event(event) => {
                            if event.is_ok() {
                                STREAM_EVENTS.click();
                            } else {
                                STREAM_ERRORS.click();
                            }
                            return Some((event, (stream, buffer, done)));
                        }
                        Frame::Done => return None,
                        Frame::Skip => continue,
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        done = true;
                        return Some((Err(e), (stream, buffer, done)));
                    }
                    None => {
                        // End of stream; a final event may lack its trailing blank line.
                        done = true;
                        if buffer.iter().all(u8::is_ascii_whitespace) {
                            return None;
                        }
                        let frame = std::mem::take(&mut buffer);
                        return match parse_frame(&frame) {
                            Frame::Event(event) => Some((event, (stream, buffer, done))),
                            Frame::Done | Frame::Skip => None,
                        };
                    }
                }
            }
        },
    )
}

enum Frame {
    Event(Result<ReplyEvent>),
    Done,
    Skip,
}

/// Split the first complete event off the buffer.
///
/// Events end at a blank line; both `\n\n` and `\r\n\r\n` are accepted.
fn split_frame(buffer: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let lf = find(buffer, b"\n\n").map(|i| (i, 2));
    let crlf = find(buffer, b"\r\n\r\n").map(|i| (i, 4));
    let (index, width) = match (lf, crlf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some((buffer[..index].to_vec(), buffer[index + width..].to_vec()))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parse one event's lines into a reply event.
fn parse_frame(frame: &[u8]) -> Frame {
    let text = match std::str::from_utf8(frame) {
        Ok(text) => text,
        Err(e) => return Frame::Event(Err(e.into())),
    };

    let mut data = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }
    if data.is_empty() {
        // Comments, pings and bare `event:` lines carry nothing for us.
        return Frame::Skip;
    }

    let payload = data.join("\n");
    let payload = payload.trim();
    if payload == DONE_MARKER {
        return Frame::Done;
    }
    if payload.is_empty() {
        return Frame::Skip;
    }

    match serde_json::from_str::<ReplyEvent>(payload) {
        Ok(event) => Frame::Event(Ok(event)),
        Err(e) => Frame::Event(Err(Error::serialization(
            format!("Failed to parse event JSON: {e}"),
            Some(Box::new(e)),
        ))),
    }
}
