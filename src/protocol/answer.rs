use serde::Serialize;

use super::detail::{ChatflowInterruptDetail, EventDetail};
use super::wire::{ToolCall, Usage, FOLLOW_UP_QUERY_EVENT_TYPE};

/// A decoded event. `detail` holds the payload shape selected by
/// `content_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub code: i64,
    pub message: String,
    pub status: String,
    pub event_type: String,
    pub event_id: String,
    pub content_type: String,
    pub usage: Usage,
    pub detail: EventDetail,
    pub tool_calls: Vec<ToolCall>,
}

/// One decoded run response: a full body, or one streamed frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Answer {
    pub message_id: String,
    pub answer: String,
    pub events: Vec<Event>,
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub conversation_id: String,
    pub is_completion: bool,
}

impl Answer {
    /// True when the server reported a failure in the body.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.code.is_empty() || !self.message.is_empty()
    }

    /// The first workflow interrupt in this answer, if any.
    #[must_use]
    pub fn interrupt(&self) -> Option<&ChatflowInterruptDetail> {
        self.events.iter().find_map(|event| match &event.detail {
            EventDetail::ChatflowInterrupt(detail) => Some(detail),
            _ => None,
        })
    }

    /// Follow-up query suggestions, in event order.
    #[must_use]
    pub fn follow_up_queries(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter(|event| event.event_type == FOLLOW_UP_QUERY_EVENT_TYPE)
            .filter_map(|event| match &event.detail {
                EventDetail::Json(detail) => Some(&detail.json.follow_up_queries),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Token usage summed over all events. `name` is left empty.
    #[must_use]
    pub fn total_usage(&self) -> Usage {
        let mut total = Usage::default();
        for event in &self.events {
            total.accumulate(&event.usage);
        }
        total
    }
}
