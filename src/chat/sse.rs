//! Server-Sent Events line parser for the streamed chat response.
//!
//! Buffers raw bytes, splits on `\n` (tolerating `\r\n`), and yields the
//! payload of every `data:` line. Comments, other fields, empty payloads and
//! `[DONE]` markers are skipped. A transport error ends the stream with a
//! chat error instead of being swallowed.

use crate::error::{LingoError, Result};
use futures_util::{Stream, StreamExt};
use std::fmt::Display;

/// Yield the `data:` payloads of an SSE byte stream.
pub fn sse_data<S, B, E>(byte_stream: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    futures_util::stream::unfold(
        (Box::pin(byte_stream), Vec::<u8>::with_capacity(8192), false),
        |(mut stream, mut buffer, done)| async move {
            if done {
                return None;
            }

            loop {
                if let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
                    if let Some(data) = extract_sse_data(&line) {
                        return Some((Ok(data), (stream, buffer, false)));
                    }
                    continue;
                }

                match stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                    Some(Err(e)) => {
                        let error = LingoError::Chat {
                            message: format!("stream interrupted: {e}"),
                        };
                        return Some((Err(error), (stream, buffer, true)));
                    }
                    None => {
                        // Last event may arrive without a trailing newline
                        let rest = std::mem::take(&mut buffer);
                        return extract_sse_data(&rest)
                            .map(|data| (Ok(data), (stream, buffer, true)));
                    }
                }
            }
        },
    )
}

/// Extract the payload of one SSE line.
///
/// Returns `None` for non-data lines, `[DONE]`, empty payloads and invalid UTF-8.
fn extract_sse_data(line: &[u8]) -> Option<String> {
    let line = std::str::from_utf8(line).ok()?.trim();
    let data = line
        .strip_prefix("data:")
        .map(str::trim)
        .filter(|d| !d.is_empty() && *d != "[DONE]")?;
    Some(data.to_string())
}
