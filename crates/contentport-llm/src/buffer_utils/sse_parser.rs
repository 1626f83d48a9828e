use anyhow::Result;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;

use super::buffering::CircularLineBuffer;
use crate::StreamEvent;

/// Strategy for turning SSE `data:` payloads into stream events
pub trait SseLineParser: Send {
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>>;

    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Generic SSE parser over a byte stream.
///
/// Comment lines (`: keep-alive`) and non-data fields are skipped. The stream
/// ends at the done marker or when the upstream closes.
pub fn parse_sse_stream<S, B, E, P>(
    bytes: S,
    parser: P,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = CircularLineBuffer::with_capacity(4096);
        let mut finished = false;

        while let Some(chunk_result) = byte_chunks.next().await {
            let bytes = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    finished = true;
                    break;
                }
            };
            buffer.extend(bytes.as_ref());

            while let Some(line_result) = buffer.next_line() {
                let line = match line_result {
                    Ok(line) => line,
                    Err(e) => {
                        yield Err(e);
                        continue;
                    }
                };

                let Some(data) = line.strip_prefix("data:").map(str::trim_start) else {
                    continue;
                };

                if parser.is_done_marker(data) {
                    yield Ok(StreamEvent::Done { finish_reason: None });
                    finished = true;
                    break;
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

            if finished {
                break;
            }
        }

        if !finished {
            if let Some(Ok(line)) = buffer.take_remainder() {
                if let Some(data) = line.strip_prefix("data:").map(str::trim_start) {
                    if !parser.is_done_marker(data) {
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
