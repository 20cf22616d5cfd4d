use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::lenient::null_as_default;

/// Event type of a workflow interrupt that waits for a resume action.
pub const CHATFLOW_EVENT_TYPE: &str = "chatflow";
/// Event type of an event carrying follow-up query suggestions.
pub const FOLLOW_UP_QUERY_EVENT_TYPE: &str = "FollowUpQuery";

/// Top-level run response, one per SSE data frame or one per full body.
///
/// Failure responses additionally carry `code` and `message`. Every field
/// may be absent or `null` and then keeps its zero value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(deserialize_with = "null_as_default")]
    pub conversation_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_completion: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub content: Vec<RawEventRecord>,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub code: String,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub message: String,
}

/// One event record inside a response; `outputs` stays undecoded until the
/// content type is resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEventRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub event_code: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub event_message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Box<RawValue>>,
    #[serde(deserialize_with = "null_as_default")]
    pub usage: Usage,
    #[serde(deserialize_with = "null_as_default")]
    pub tool_calls: Vec<ToolCall>,
}

/// Token usage counters reported per event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    #[serde(deserialize_with = "null_as_default")]
    pub prompt_tokens: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub completion_tokens: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_tokens: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// A tool call the agent asks the client to execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(
        rename = "type",
        default = "default_tool_call_type",
        deserialize_with = "tool_call_type"
    )]
    pub type_: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub function: FunctionCallOption,
}

fn default_tool_call_type() -> String {
    "function".to_string()
}

fn tool_call_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_tool_call_type))
}

/// Function name plus its JSON object arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionCallOption {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl Usage {
    /// Add another usage record's counters into this one, saturating at the
    /// counter bounds.
    pub fn accumulate(&mut self, other: &Usage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_response_tolerates_missing_and_null_fields() {
        let raw: RawResponse =
            serde_json::from_str(r#"{"request_id":"r1","content":null,"code":null}"#).unwrap();
        assert_eq!(raw.request_id, "r1");
        assert!(raw.content.is_empty());
        assert!(raw.code.is_empty());
        assert!(!raw.is_completion);
    }

    #[test]
    fn test_raw_event_keeps_outputs_verbatim() {
        let record: RawEventRecord = serde_json::from_str(
            r#"{"event_code":0,"content_type":"text","outputs":{"text":"hi"}}"#,
        )
        .unwrap();
        assert_eq!(record.outputs.as_deref().map(RawValue::get), Some(r#"{"text":"hi"}"#));
    }

    #[test]
    fn test_null_outputs_become_none() {
        let record: RawEventRecord = serde_json::from_str(r#"{"outputs":null}"#).unwrap();
        assert!(record.outputs.is_none());
    }

    #[test]
    fn test_tool_call_defaults_type_to_function() {
        let call: ToolCall = serde_json::from_str(
            r#"{"id":"call_1","function":{"name":"get_weather","arguments":{"city":"SF"}}}"#,
        )
        .unwrap();
        assert_eq!(call.type_, "function");
        assert_eq!(call.function.name, "get_weather");
        assert_eq!(call.function.arguments["city"], "SF");
    }

    #[test]
    fn test_usage_accumulate() {
        let mut total = Usage::default();
        total.accumulate(&Usage {
            prompt_tokens: 3,
            completion_tokens: 4,
            total_tokens: 7,
            name: "m".to_string(),
        });
        total.accumulate(&Usage {
            prompt_tokens: 1,
            completion_tokens: 1,
            total_tokens: 2,
            name: String::new(),
        });
        assert_eq!(total.prompt_tokens, 4);
        assert_eq!(total.completion_tokens, 5);
        assert_eq!(total.total_tokens, 9);
    }

    #[test]
    fn test_null_scalars_and_usage_keep_zero_values() {
        let raw: RawResponse = serde_json::from_str(
            r#"{"request_id":"r1","answer":null,"date":null,"is_completion":null,
                "content":[{"content_type":"text","event_code":null,"event_message":null,
                "event_status":null,"usage":null,"outputs":{"text":"hi"}}]}"#,
        )
        .unwrap();
        assert_eq!(raw.request_id, "r1");
        assert!(raw.answer.is_empty());
        assert!(raw.date.is_empty());
        assert!(!raw.is_completion);
        let record = &raw.content[0];
        assert_eq!(record.content_type, "text");
        assert_eq!(record.event_code, 0);
        assert!(record.event_message.is_empty());
        assert!(record.event_status.is_empty());
        assert_eq!(record.usage, Usage::default());
    }

    #[test]
    fn test_usage_accepts_negative_and_null_counters() {
        let usage: Usage = serde_json::from_str(
            r#"{"prompt_tokens":-1,"completion_tokens":null,"total_tokens":5,"name":null}"#,
        )
        .unwrap();
        assert_eq!(usage.prompt_tokens, -1);
        assert_eq!(usage.completion_tokens, 0);
        assert_eq!(usage.total_tokens, 5);
        assert!(usage.name.is_empty());
    }

    #[test]
    fn test_null_tool_call_fields() {
        let call: ToolCall =
            serde_json::from_str(r#"{"id":null,"type":null,"function":null}"#).unwrap();
        assert!(call.id.is_empty());
        assert_eq!(call.type_, "function");
        assert_eq!(call.function, FunctionCallOption::default());
    }

    #[test]
    fn test_usage_accumulate_saturates() {
        let mut total = Usage {
            total_tokens: i64::MAX,
            prompt_tokens: i64::MIN,
            ..Usage::default()
        };
        total.accumulate(&Usage {
            total_tokens: 1,
            prompt_tokens: -1,
            ..Usage::default()
        });
        assert_eq!(total.total_tokens, i64::MAX);
        assert_eq!(total.prompt_tokens, i64::MIN);
    }
}
