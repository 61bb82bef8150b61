//! Streaming decoder (Bytes -> JSON Value)
//!
//! Decodes the provider's Server-Sent Events framing. Provider semantics (which field holds
//! the text) live in [`super::select`].

use crate::BoxStream;
use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::Value;
use tracing::debug;

/// A minimal SSE decoder:
/// - splits frames on a blank line (`\n\n`, CRLF tolerated)
/// - joins the frame's `data:` lines into one payload
/// - stops on the `[DONE]` sentinel
///
/// Bytes are buffered undecoded until a whole frame is available, so multi-byte characters
/// split across network chunks survive intact.
#[derive(Debug, Clone, Copy)]
pub struct SseDecoder;

const DONE_SIGNAL: &str = "[DONE]";

impl SseDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode_stream(self, input: BoxStream<'static, Bytes>) -> BoxStream<'static, Value> {
        let stream = stream::unfold(
            (input, Vec::<u8>::new(), false),
            |(mut input, mut buf, finished)| {
                async move {
                    if finished {
                        return None;
                    }
                    loop {
                        // If we have a full frame in buffer, emit it.
                        if let Some(idx) = find_frame_end(&buf) {
                            let frame_bytes: Vec<u8> = buf.drain(..idx + 2).collect();
                            let frame = String::from_utf8_lossy(&frame_bytes[..idx]);
                            match parse_frame(&frame) {
                                Frame::Done => return None,
                                Frame::Payload(v) => return Some((Ok(v), (input, buf, false))),
                                Frame::Skip => continue,
                            }
                        }

                        // Need more data.
                        match input.next().await {
                            Some(Ok(bytes)) => {
                                buf.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
                                continue;
                            }
                            Some(Err(e)) => {
                                return Some((Err(e), (input, buf, true)));
                            }
                            None => {
                                // EOF: try parse remaining buffer once
                                let rest = String::from_utf8_lossy(&buf).into_owned();
                                return match parse_frame(&rest) {
                                    Frame::Payload(v) => {
                                        Some((Ok(v), (input, Vec::new(), true)))
                                    }
                                    Frame::Done | Frame::Skip => None,
                                };
                            }
                        }
                    }
                }
            },
        );

        Box::pin(stream)
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

enum Frame {
    Payload(Value),
    Done,
    Skip,
}

fn find_frame_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

fn parse_frame(frame: &str) -> Frame {
    let mut data = String::new();
    let mut saw_data = false;
    for line in frame.lines() {
        let line = line.trim_end();
        // Ignore SSE comment lines and other fields (event:, id:, retry:)
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            if saw_data {
                data.push('\n');
            }
            data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
            saw_data = true;
        }
    }

    let payload = data.trim();
    if !saw_data || payload.is_empty() {
        // Some proxies send bare JSON lines without the `data:` field.
        let bare = frame.trim();
        if bare.starts_with('{') {
            if let Ok(v) = serde_json::from_str(bare) {
                return Frame::Payload(v);
            }
        }
        return Frame::Skip;
    }
    if payload == DONE_SIGNAL {
        return Frame::Done;
    }
    match serde_json::from_str(payload) {
        Ok(v) => Frame::Payload(v),
        Err(e) => {
            // Skip non-json frames; keep streaming.
            debug!(error = %e, "skipping non-JSON SSE frame");
            Frame::Skip
        }
    }
}
