use std::io::Read;

use tracing::{debug, warn};

use super::sse::{LineSource, SseLineReader};
use super::{decode_body, decode_frame, AnswerIterator};
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::protocol::Answer;

// ---------------------------------------------------------------------------
// StreamIterator: one answer per SSE data frame
// ---------------------------------------------------------------------------

enum StreamState<S> {
    Active(S),
    Exhausted,
    Failed(DecodeError),
}

/// Iterator over a streamed (SSE) run response.
///
/// Owns its line source until the stream ends or fails, then drops it.
pub struct StreamIterator<S> {
    request_id: String,
    state: StreamState<S>,
}

impl<R: Read> StreamIterator<SseLineReader<R>> {
    /// Stream answers from an SSE body with default limits.
    #[must_use]
    pub fn from_reader(request_id: impl Into<String>, body: R) -> Self {
        Self::new(request_id, SseLineReader::new(body))
    }

    #[must_use]
    pub fn from_reader_with_config(
        request_id: impl Into<String>,
        body: R,
        config: &DecoderConfig,
    ) -> Self {
        Self::new(request_id, SseLineReader::with_config(body, config))
    }
}

impl<S: LineSource> StreamIterator<S> {
    #[must_use]
    pub fn new(request_id: impl Into<String>, source: S) -> Self {
        Self {
            request_id: request_id.into(),
            state: StreamState::Active(source),
        }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// True once the stream has ended or failed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !matches!(self.state, StreamState::Active(_))
    }

    fn fail(&mut self, err: DecodeError) -> DecodeError {
        warn!(request_id = %self.request_id, error = %err, "answer stream failed");
        // Replacing the state drops the line source.
        self.state = StreamState::Failed(err.clone());
        err
    }
}

impl<S: LineSource> AnswerIterator for StreamIterator<S> {
    fn next_answer(&mut self) -> Result<Option<Answer>, DecodeError> {
        let source = match &mut self.state {
            StreamState::Active(source) => source,
            StreamState::Exhausted => return Ok(None),
            StreamState::Failed(err) => return Err(err.clone()),
        };

        let line = match source.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                self.state = StreamState::Exhausted;
                debug!(request_id = %self.request_id, "answer stream exhausted");
                return Ok(None);
            }
            Err(err) => {
                let err = DecodeError::transport(&self.request_id, &err);
                return Err(self.fail(err));
            }
        };

        match decode_frame(&self.request_id, &line) {
            Ok(answer) => Ok(Some(answer)),
            Err(err) => Err(self.fail(err)),
        }
    }
}

impl<S: LineSource> Iterator for StreamIterator<S> {
    type Item = Result<Answer, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished() {
            return None;
        }
        self.next_answer().transpose()
    }
}

// ---------------------------------------------------------------------------
// OnceIterator: a single answer from a complete JSON body
// ---------------------------------------------------------------------------

enum OnceState<R> {
    Ready(R),
    /// Holds the error of the single call, if it failed.
    Done(Option<DecodeError>),
}

/// Iterator over a non-streamed run response. Yields exactly one answer.
pub struct OnceIterator<R> {
    request_id: String,
    state: OnceState<R>,
}

impl<R: Read> OnceIterator<R> {
    #[must_use]
    pub fn new(request_id: impl Into<String>, body: R) -> Self {
        Self {
            request_id: request_id.into(),
            state: OnceState::Ready(body),
        }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, OnceState::Done(_))
    }

    fn read_body(&self, mut body: R) -> Result<Answer, DecodeError> {
        let mut data = Vec::new();
        let read = body.read_to_end(&mut data);
        drop(body);
        read.map_err(|err| DecodeError::transport(&self.request_id, &err))?;
        decode_body(&self.request_id, &data)
    }
}

impl<R: Read> AnswerIterator for OnceIterator<R> {
    fn next_answer(&mut self) -> Result<Option<Answer>, DecodeError> {
        let body = match std::mem::replace(&mut self.state, OnceState::Done(None)) {
            OnceState::Ready(body) => body,
            OnceState::Done(None) => return Ok(None),
            OnceState::Done(Some(err)) => {
                self.state = OnceState::Done(Some(err.clone()));
                return Err(err);
            }
        };

        match self.read_body(body) {
            Ok(answer) => {
                debug!(request_id = %self.request_id, "answer body decoded");
                Ok(Some(answer))
            }
            Err(err) => {
                warn!(request_id = %self.request_id, error = %err, "answer body failed");
                self.state = OnceState::Done(Some(err.clone()));
                Err(err)
            }
        }
    }
}

impl<R: Read> Iterator for OnceIterator<R> {
    type Item = Result<Answer, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished() {
            return None;
        }
        self.next_answer().transpose()
    }
}
