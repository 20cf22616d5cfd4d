pub mod frames;
pub mod iter;
pub mod sse;

pub use frames::answer_stream;
pub use iter::{OnceIterator, StreamIterator};
pub use sse::{LineBuffer, LineSource, SseLineReader};

use std::io::Read;

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::protocol::wire::RawResponse;
use crate::protocol::{assemble_answer, Answer};

/// Literal prefix of an SSE data frame.
pub const DATA_PREFIX: &[u8] = b"data:";

/// Pull-based source of decoded answers.
///
/// Each call yields one of three outcomes:
/// - `Ok(Some(answer))`: the next answer;
/// - `Ok(None)`: the response ended normally;
/// - `Err(err)`: the response broke.
///
/// After `Ok(None)` or `Err(_)` the iterator is finished. Further calls
/// return the same terminal outcome and never touch the released body.
pub trait AnswerIterator {
    /// Decode the next answer.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when reading the body fails or the response is
    /// not a well-formed run response.
    fn next_answer(&mut self) -> Result<Option<Answer>, DecodeError>;
}

impl<I: AnswerIterator + ?Sized> AnswerIterator for Box<I> {
    fn next_answer(&mut self) -> Result<Option<Answer>, DecodeError> {
        (**self).next_answer()
    }
}

/// Pick the iterator matching whether the request asked for streaming.
#[must_use]
pub fn answer_iterator<R>(
    request_id: impl Into<String>,
    body: R,
    stream: bool,
) -> Box<dyn AnswerIterator + Send>
where
    R: Read + Send + 'static,
{
    answer_iterator_with_config(request_id, body, stream, &DecoderConfig::default())
}

/// Like [`answer_iterator`], with explicit decoder limits.
#[must_use]
pub fn answer_iterator_with_config<R>(
    request_id: impl Into<String>,
    body: R,
    stream: bool,
    config: &DecoderConfig,
) -> Box<dyn AnswerIterator + Send>
where
    R: Read + Send + 'static,
{
    if stream {
        Box::new(StreamIterator::from_reader_with_config(
            request_id, body, config,
        ))
    } else {
        Box::new(OnceIterator::new(request_id, body))
    }
}

/// Decode one SSE message line into an answer.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedFrame`] when the line lacks the `data:`
/// prefix, or [`DecodeError::MalformedPayload`] when the JSON after it is not
/// a run response.
pub fn decode_frame(request_id: &str, line: &[u8]) -> Result<Answer, DecodeError> {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Err(DecodeError::malformed_frame(request_id, line));
    };
    decode_body(request_id, payload)
}

/// Decode a complete JSON body into an answer.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedPayload`] when the body is not a run
/// response.
pub fn decode_body(request_id: &str, body: &[u8]) -> Result<Answer, DecodeError> {
    let raw: RawResponse = serde_json::from_slice(body)
        .map_err(|err| DecodeError::malformed_payload(request_id, &err))?;
    Ok(assemble_answer(raw))
}
