pub mod config;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod stream;

pub use error::DecodeError;
pub use protocol::{Answer, Event, EventDetail};
pub use stream::{answer_iterator, AnswerIterator, OnceIterator, StreamIterator};
