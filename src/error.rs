/// Fatal decode error returned by answer iterators.
///
/// Every variant carries the request id of the call it belongs to so the
/// caller can correlate failures with server-side logs. Payloads are kept as
/// strings so a terminated iterator can hand back the same error on later
/// calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("requestID={request_id}, err={message}")]
    Transport { request_id: String, message: String },
    #[error("requestID={request_id}, body={body}")]
    MalformedFrame { request_id: String, body: String },
    #[error("requestID={request_id}, err={message}")]
    MalformedPayload { request_id: String, message: String },
}

/// Broad error category, for callers that branch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    MalformedFrame,
    MalformedPayload,
}

impl DecodeError {
    /// The line source or body reader failed.
    #[must_use]
    pub fn transport(request_id: &str, err: &std::io::Error) -> Self {
        DecodeError::Transport {
            request_id: request_id.to_owned(),
            message: err.to_string(),
        }
    }

    /// A streaming line did not carry the `data:` prefix.
    ///
    /// The raw line is kept verbatim (lossily decoded as UTF-8).
    #[must_use]
    pub fn malformed_frame(request_id: &str, line: &[u8]) -> Self {
        DecodeError::MalformedFrame {
            request_id: request_id.to_owned(),
            body: String::from_utf8_lossy(line).into_owned(),
        }
    }

    /// The top-level response JSON failed to parse.
    #[must_use]
    pub fn malformed_payload(request_id: &str, err: &serde_json::Error) -> Self {
        DecodeError::MalformedPayload {
            request_id: request_id.to_owned(),
            message: err.to_string(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Transport { .. } => ErrorKind::Transport,
            DecodeError::MalformedFrame { .. } => ErrorKind::MalformedFrame,
            DecodeError::MalformedPayload { .. } => ErrorKind::MalformedPayload,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        match self {
            DecodeError::Transport { request_id, .. }
            | DecodeError::MalformedFrame { request_id, .. }
            | DecodeError::MalformedPayload { request_id, .. } => request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_frame_display_carries_request_id_and_body() {
        let err = DecodeError::malformed_frame("req-7", b"internal error");
        assert_eq!(err.to_string(), "requestID=req-7, body=internal error");
        assert_eq!(err.kind(), ErrorKind::MalformedFrame);
        assert_eq!(err.request_id(), "req-7");
    }

    #[test]
    fn test_transport_display_uses_io_message() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
        let err = DecodeError::transport("req-1", &io);
        assert_eq!(err.to_string(), "requestID=req-1, err=peer reset");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_malformed_payload_from_serde_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DecodeError::malformed_payload("req-2", &serde_err);
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
        assert!(err.to_string().starts_with("requestID=req-2, err="));
    }

    #[test]
    fn test_malformed_frame_keeps_invalid_utf8_lossily() {
        let err = DecodeError::malformed_frame("r", &[b'o', b'k', 0xff]);
        match err {
            DecodeError::MalformedFrame { body, .. } => assert_eq!(body, "ok\u{fffd}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
