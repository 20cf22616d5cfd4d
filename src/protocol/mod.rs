pub mod answer;
pub mod detail;
mod lenient;
pub mod registry;
pub mod response_decoder;
pub mod wire;

pub use answer::{Answer, Event};
pub use detail::EventDetail;
pub use response_decoder::{assemble_answer, decode_event};
pub use wire::{FunctionCallOption, RawEventRecord, RawResponse, ToolCall, Usage};
