use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::Response;
use std::pin::Pin;

use super::buffering::CircularLineBuffer;

/// Strategy for turning SSE `data:` lines into typed events
///
/// Parsers may keep state between lines (e.g. the last conversation handle
/// seen), so `parse_data_line` takes `&mut self`.
pub trait SseLineParser: Send {
    type Event: Send + 'static;

    /// Parse a data line into stream events
    fn parse_data_line(&mut self, data: &str) -> Result<Vec<Self::Event>>;

    /// Check if this line signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }

    /// Event emitted when the done marker arrives
    fn done_event(&self) -> Option<Self::Event>;
}

/// Generic SSE stream parser using circular buffer
pub fn parse_sse_stream<P: SseLineParser + 'static>(
    response: Response,
    mut parser: P,
) -> Pin<Box<dyn Stream<Item = Result<P::Event>> + Send>> {
    let stream = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = CircularLineBuffer::with_capacity(4096);
        let mut finished = false;

        'read: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(&bytes);

                    while let Some(line_result) = buffer.next_line() {
                        match line_result {
                            Ok(line) => {
                                let Some(data) = line.strip_prefix("data:") else {
                                    continue;
                                };
                                let data = data.trim_start();

                                if parser.is_done_marker(data) {
                                    if let Some(event) = parser.done_event() {
                                        yield Ok(event);
                                    }
                                    finished = true;
                                    break 'read;
                                }

                                match parser.parse_data_line(data) {
                                    Ok(events) => {
                                        for event in events {
                                            yield Ok(event);
                                        }
                                    }
                                    Err(e) => yield Err(e),
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    finished = true;
                    break;
                }
            }
        }

        if !finished {
            if let Some(Ok(line)) = buffer.take_remaining() {
                if let Some(data) = line.strip_prefix("data:").map(str::trim_start) {
                    if parser.is_done_marker(data) {
                        if let Some(event) = parser.done_event() {
                            yield Ok(event);
                        }
                    } else if !data.is_empty() {
                        match parser.parse_data_line(data) {
                            Ok(events) => {
                                for event in events {
                                    yield Ok(event);
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
            }
        }
    })
}
