//! Content-type registry: maps an event's `content_type` tag to the payload
//! shape its `outputs` decode into.
//!
//! The registered set is the static [`REGISTERED_SHAPES`] table. Lookups for
//! any other tag, including tags the server introduces later, resolve to
//! [`FALLBACK_SHAPE`], so resolution never fails.

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::sync::LazyLock;

use super::detail::{
    AudioDetail, ChatReasoningDetail, ChatflowInterruptDetail, CodeDetail, DefaultDetail,
    EventDetail, FunctionCallDetail, ImageDetail, JsonDetail, PublishMessageDetail, RagDetail,
    StatusDetail, TextDetail, VideoDetail,
};

pub const CODE_CONTENT_TYPE: &str = "code";
pub const TEXT_CONTENT_TYPE: &str = "text";
pub const IMAGE_CONTENT_TYPE: &str = "image";
pub const RAG_CONTENT_TYPE: &str = "rag";
pub const FUNCTION_CALL_CONTENT_TYPE: &str = "function_call";
pub const AUDIO_CONTENT_TYPE: &str = "audio";
pub const VIDEO_CONTENT_TYPE: &str = "video";
pub const STATUS_CONTENT_TYPE: &str = "status";
pub const CHATFLOW_INTERRUPT_CONTENT_TYPE: &str = "chatflow_interrupt";
pub const PUBLISH_MESSAGE_CONTENT_TYPE: &str = "publish_message";
pub const JSON_CONTENT_TYPE: &str = "json";
pub const CHAT_REASONING_CONTENT_TYPE: &str = "chat_reasoning";

type DecodeFn = fn(Option<&RawValue>) -> EventDetail;

/// Descriptor of one payload shape.
#[derive(Debug)]
pub struct DetailShape {
    /// Shape name, for logs.
    pub name: &'static str,
    decode: DecodeFn,
}

impl DetailShape {
    const fn new(name: &'static str, decode: DecodeFn) -> Self {
        Self { name, decode }
    }

    /// Decode raw `outputs` into this shape, best effort.
    ///
    /// Missing, `null`, non-object or unparsable outputs give the shape's
    /// zero value.
    #[must_use]
    pub fn decode(&self, outputs: Option<&RawValue>) -> EventDetail {
        (self.decode)(outputs)
    }
}

fn decode_shape<T>(outputs: Option<&RawValue>) -> EventDetail
where
    T: DeserializeOwned + Default + Into<EventDetail>,
{
    let Some(raw) = outputs else {
        return T::default().into();
    };
    match serde_json::from_str::<T>(raw.get()) {
        Ok(detail) => detail.into(),
        Err(err) => {
            tracing::debug!(
                shape = std::any::type_name::<T>(),
                error = %err,
                "event outputs did not match shape, using zero value"
            );
            T::default().into()
        }
    }
}

/// The registered content types, in registration order.
pub static REGISTERED_SHAPES: [(&str, DetailShape); 12] = [
    (
        CODE_CONTENT_TYPE,
        DetailShape::new("CodeDetail", decode_shape::<CodeDetail>),
    ),
    (
        TEXT_CONTENT_TYPE,
        DetailShape::new("TextDetail", decode_shape::<TextDetail>),
    ),
    (
        IMAGE_CONTENT_TYPE,
        DetailShape::new("ImageDetail", decode_shape::<ImageDetail>),
    ),
    (
        RAG_CONTENT_TYPE,
        DetailShape::new("RagDetail", decode_shape::<RagDetail>),
    ),
    (
        FUNCTION_CALL_CONTENT_TYPE,
        DetailShape::new("FunctionCallDetail", decode_shape::<FunctionCallDetail>),
    ),
    (
        AUDIO_CONTENT_TYPE,
        DetailShape::new("AudioDetail", decode_shape::<AudioDetail>),
    ),
    (
        VIDEO_CONTENT_TYPE,
        DetailShape::new("VideoDetail", decode_shape::<VideoDetail>),
    ),
    (
        STATUS_CONTENT_TYPE,
        DetailShape::new("StatusDetail", decode_shape::<StatusDetail>),
    ),
    (
        CHATFLOW_INTERRUPT_CONTENT_TYPE,
        DetailShape::new(
            "ChatflowInterruptDetail",
            decode_shape::<ChatflowInterruptDetail>,
        ),
    ),
    (
        PUBLISH_MESSAGE_CONTENT_TYPE,
        DetailShape::new("PublishMessageDetail", decode_shape::<PublishMessageDetail>),
    ),
    (
        JSON_CONTENT_TYPE,
        DetailShape::new("JsonDetail", decode_shape::<JsonDetail>),
    ),
    (
        CHAT_REASONING_CONTENT_TYPE,
        DetailShape::new("ChatReasoningDetail", decode_shape::<ChatReasoningDetail>),
    ),
];

/// Shape for every content type not in [`REGISTERED_SHAPES`].
pub static FALLBACK_SHAPE: DetailShape =
    DetailShape::new("DefaultDetail", decode_shape::<DefaultDetail>);

static REGISTRY: LazyLock<FxHashMap<&'static str, &'static DetailShape>> = LazyLock::new(|| {
    REGISTERED_SHAPES
        .iter()
        .map(|(tag, shape)| (*tag, shape))
        .collect()
});

/// Resolve the payload shape for a content-type tag.
#[must_use]
pub fn resolve(content_type: &str) -> &'static DetailShape {
    REGISTRY
        .get(content_type)
        .copied()
        .unwrap_or(&FALLBACK_SHAPE)
}

/// Whether the tag has a registered shape.
#[must_use]
pub fn is_registered(content_type: &str) -> bool {
    REGISTRY.contains_key(content_type)
}

/// Iterate the registered content-type tags.
pub fn registered_content_types() -> impl Iterator<Item = &'static str> {
    REGISTERED_SHAPES.iter().map(|(tag, _)| *tag)
}
