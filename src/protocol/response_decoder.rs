use crate::protocol::answer::{Answer, Event};
use crate::protocol::registry;
use crate::protocol::wire::{RawEventRecord, RawResponse};

/// Decode one raw event record into an [`Event`].
///
/// The payload shape comes from the content-type registry. Payload decoding
/// is best effort: a malformed `outputs` yields a zero or partially populated
/// detail and never fails the event.
#[must_use]
pub fn decode_event(record: RawEventRecord) -> Event {
    let RawEventRecord {
        event_code,
        event_message,
        event_type,
        event_id,
        event_status,
        content_type,
        outputs,
        usage,
        tool_calls,
    } = record;

    let detail = registry::resolve(&content_type).decode(outputs.as_deref());

    Event {
        code: event_code,
        message: event_message,
        status: event_status,
        event_type,
        event_id,
        content_type,
        usage,
        detail,
        tool_calls,
    }
}

/// Assemble a raw response into an [`Answer`], decoding every event record
/// in order.
#[must_use]
pub fn assemble_answer(raw: RawResponse) -> Answer {
    let RawResponse {
        request_id,
        date: _,
        answer,
        conversation_id,
        message_id,
        is_completion,
        content,
        code,
        message,
    } = raw;

    Answer {
        message_id,
        answer,
        events: content.into_iter().map(decode_event).collect(),
        code,
        message,
        request_id,
        conversation_id,
        is_completion,
    }
}
