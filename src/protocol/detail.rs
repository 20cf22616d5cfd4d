//! Payload shapes an event's `outputs` can decode into.
//!
//! Every field decodes through [`or_default`], so a value of the wrong JSON
//! type leaves that field zeroed without failing its siblings.

use serde::{Deserialize, Serialize};

use super::lenient::or_default;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub text: String,
    #[serde(default, deserialize_with = "or_default")]
    pub code: String,
    #[serde(default, deserialize_with = "or_default")]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub text: String,
    #[serde(default, deserialize_with = "or_default")]
    pub references: Vec<Reference>,
}

/// A retrieved knowledge-base chunk cited by a RAG answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, deserialize_with = "or_default")]
    pub id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub from: String,
    #[serde(default, deserialize_with = "or_default")]
    pub url: String,
    #[serde(default, deserialize_with = "or_default")]
    pub content: String,
    #[serde(default, deserialize_with = "or_default")]
    pub segment_id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub document_id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub dataset_id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub document_name: String,
    #[serde(rename = "knowledgebase_id", default, deserialize_with = "or_default")]
    pub knowledge_base_id: String,
}

/// Output of a function-call step. `text` is whatever JSON the tool produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallDetail {
    #[serde(default)]
    pub text: serde_json::Value,
    #[serde(default, deserialize_with = "or_default")]
    pub image: String,
    #[serde(default, deserialize_with = "or_default")]
    pub audio: String,
    #[serde(default, deserialize_with = "or_default")]
    pub video: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub audio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub video: String,
}

/// Status events carry no payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetail {}

/// Marks a workflow paused on an interrupt; resume with the event id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatflowInterruptDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub interrupt_event_id: String,
    #[serde(default, deserialize_with = "or_default")]
    pub interrupt_event_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishMessageDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub message: String,
    #[serde(default, deserialize_with = "or_default")]
    pub message_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReasoningDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonDetail {
    #[serde(default, deserialize_with = "or_default")]
    pub json: FollowUpQueries,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpQueries {
    // Field name as sent by the server.
    #[serde(rename = "follow_up_querys", default, deserialize_with = "or_default")]
    pub follow_up_queries: Vec<String>,
}

/// Shape used for content types this client does not know about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultDetail {
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

/// The decoded payload of one event, selected by its content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventDetail {
    Text(TextDetail),
    Code(CodeDetail),
    Image(ImageDetail),
    Rag(RagDetail),
    FunctionCall(FunctionCallDetail),
    Audio(AudioDetail),
    Video(VideoDetail),
    Status(StatusDetail),
    ChatflowInterrupt(ChatflowInterruptDetail),
    PublishMessage(PublishMessageDetail),
    Json(JsonDetail),
    ChatReasoning(ChatReasoningDetail),
    Default(DefaultDetail),
}

macro_rules! impl_from_detail {
    ($($variant:ident($shape:ty)),+ $(,)?) => {
        $(
            impl From<$shape> for EventDetail {
                fn from(detail: $shape) -> Self {
                    EventDetail::$variant(detail)
                }
            }
        )+
    };
}

impl_from_detail!(
    Text(TextDetail),
    Code(CodeDetail),
    Image(ImageDetail),
    Rag(RagDetail),
    FunctionCall(FunctionCallDetail),
    Audio(AudioDetail),
    Video(VideoDetail),
    Status(StatusDetail),
    ChatflowInterrupt(ChatflowInterruptDetail),
    PublishMessage(PublishMessageDetail),
    Json(JsonDetail),
    ChatReasoning(ChatReasoningDetail),
    Default(DefaultDetail),
);

impl EventDetail {
    /// Plain text carried by the payload, for shapes that have one.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            EventDetail::Text(TextDetail { text })
            | EventDetail::Code(CodeDetail { text, .. })
            | EventDetail::Rag(RagDetail { text, .. })
            | EventDetail::ChatReasoning(ChatReasoningDetail { text }) => Some(text.as_str()),
            EventDetail::FunctionCall(detail) => detail.text.as_str(),
            EventDetail::Default(detail) => detail.text.as_deref(),
            _ => None,
        }
    }

    /// True when this is the fallback shape for an unregistered content type.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, EventDetail::Default(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rag_reference_renamed_knowledge_base_field() {
        let rag: RagDetail = serde_json::from_str(
            r#"{"text":"see doc","references":[{"id":"1","knowledgebase_id":"kb-9","document_name":"a.pdf"}]}"#,
        )
        .unwrap();
        assert_eq!(rag.references.len(), 1);
        assert_eq!(rag.references[0].knowledge_base_id, "kb-9");
        assert_eq!(rag.references[0].document_name, "a.pdf");
    }

    #[test]
    fn test_follow_up_queries_wire_name() {
        let detail: JsonDetail =
            serde_json::from_str(r#"{"json":{"follow_up_querys":["why?","how?"]}}"#).unwrap();
        assert_eq!(detail.json.follow_up_queries, vec!["why?", "how?"]);
    }

    #[test]
    fn test_function_call_text_accepts_any_json() {
        let detail: FunctionCallDetail =
            serde_json::from_str(r#"{"text":{"temp":21},"image":"http://img"}"#).unwrap();
        assert_eq!(detail.text["temp"], 21);
        assert_eq!(detail.image, "http://img");
    }

    #[test]
    fn test_default_detail_skips_absent_fields_when_serialized() {
        let detail = DefaultDetail {
            text: Some("x".to_string()),
            ..DefaultDetail::default()
        };
        assert_eq!(serde_json::to_string(&detail).unwrap(), r#"{"text":"x"}"#);
    }

    #[test]
    fn test_text_accessor() {
        let detail = EventDetail::from(ChatReasoningDetail {
            text: "thinking".to_string(),
        });
        assert_eq!(detail.text(), Some("thinking"));
        assert_eq!(EventDetail::from(StatusDetail {}).text(), None);
        assert!(EventDetail::from(DefaultDetail::default()).is_fallback());
    }
}
