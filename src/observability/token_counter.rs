use crate::protocol::{Answer, Usage};
use std::time::Duration;
use tracing::{debug, info};

/// Token usage of an answer, broken down by the model name each event reports.
///
/// Events without a model name are grouped under the empty string. Groups
/// keep the order in which their first event appeared.
#[must_use]
pub fn usage_by_model(answer: &Answer) -> Vec<Usage> {
    let mut groups: Vec<Usage> = Vec::new();
    for event in &answer.events {
        let usage = &event.usage;
        if let Some(group) = groups.iter_mut().find(|group| group.name == usage.name) {
            group.accumulate(usage);
        } else {
            groups.push(usage.clone());
        }
    }
    groups
}

/// Log an answer's identifiers and summed token usage at INFO level, with the
/// per-model breakdown at DEBUG.
pub fn log_answer_usage(answer: &Answer, duration: Duration) {
    for usage in usage_by_model(answer) {
        debug!(
            request_id = %answer.request_id,
            model = %usage.name,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "model usage"
        );
    }
    let usage = answer.total_usage();
    info!(
        request_id = %answer.request_id,
        message_id = %answer.message_id,
        events = answer.events.len(),
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        is_completion = answer.is_completion,
        duration_seconds = duration.as_secs_f64(),
        "answer decoded"
    );
}
