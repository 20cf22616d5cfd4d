//! Async adapter: decode answers from a chunked byte stream, such as an HTTP
//! client's response body stream.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;

use super::decode_frame;
use super::sse::LineBuffer;
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::protocol::Answer;

/// Decode a streamed run response from byte chunks.
///
/// Frame semantics match [`StreamIterator`](super::StreamIterator): every
/// `data:` line yields one answer, a chunk error or malformed line yields a
/// single `Err` and ends the stream, and end of input ends it normally.
pub fn answer_stream<S, E>(
    request_id: impl Into<String>,
    byte_stream: S,
) -> impl Stream<Item = Result<Answer, DecodeError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    answer_stream_with_config(request_id, byte_stream, &DecoderConfig::default())
}

/// Like [`answer_stream`], with explicit decoder limits.
pub fn answer_stream_with_config<S, E>(
    request_id: impl Into<String>,
    byte_stream: S,
    config: &DecoderConfig,
) -> impl Stream<Item = Result<Answer, DecodeError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = FrameState {
        stream: Some(Box::pin(byte_stream)),
        lines: LineBuffer::new(config.max_line_bytes),
        request_id: request_id.into(),
    };

    futures_util::stream::unfold(state, |mut state| async move {
        let item = state.next_item().await?;
        Some((item, state))
    })
    .fuse()
}

struct FrameState<S> {
    /// `None` once the stream has ended or failed; dropping it releases the body.
    stream: Option<Pin<Box<S>>>,
    lines: LineBuffer,
    request_id: String,
}

impl<S, E> FrameState<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    async fn next_item(&mut self) -> Option<Result<Answer, DecodeError>> {
        loop {
            if self.stream.is_none() {
                return None;
            }

            match self.lines.next_line() {
                Ok(Some(line)) => return Some(self.decode(&line)),
                Ok(None) => {}
                Err(err) => {
                    let err = DecodeError::transport(&self.request_id, &err);
                    return Some(Err(self.fail(err)));
                }
            }

            let stream = self.stream.as_mut()?;
            let next = stream.as_mut().next().await;
            match next {
                Some(Ok(chunk)) => self.lines.extend(&chunk),
                Some(Err(err)) => {
                    let err = DecodeError::Transport {
                        request_id: self.request_id.clone(),
                        message: err.to_string(),
                    };
                    return Some(Err(self.fail(err)));
                }
                None => {
                    self.stream = None;
                    tracing::debug!(request_id = %self.request_id, "answer stream exhausted");
                    let tail = self.lines.take_remainder()?;
                    return Some(decode_frame(&self.request_id, &tail));
                }
            }
        }
    }

    fn decode(&mut self, line: &[u8]) -> Result<Answer, DecodeError> {
        decode_frame(&self.request_id, line).map_err(|err| self.fail(err))
    }

    fn fail(&mut self, err: DecodeError) -> DecodeError {
        tracing::warn!(request_id = %self.request_id, error = %err, "answer stream failed");
        self.stream = None;
        err
    }
}
