// src/message.rs
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RelayError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, alias = "background_info", deserialize_with = "null_as_empty")]
    pub background_context: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            background_context: String::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.background_context = context.into();
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyError {
    pub kind: String,
    pub message: String,
}

impl From<&RelayError> for ReplyError {
    fn from(err: &RelayError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one relay call. Exactly one of `reply` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    outcome: Result<String, ReplyError>,
    backend_latency_ms: Option<u64>,
}

impl ChatReply {
    pub fn success(reply: impl Into<String>, backend_latency_ms: Option<u64>) -> Self {
        Self {
            outcome: Ok(reply.into()),
            backend_latency_ms,
        }
    }

    pub fn failure(error: impl Into<ReplyError>) -> Self {
        Self {
            outcome: Err(error.into()),
            backend_latency_ms: None,
        }
    }

    pub fn reply(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&ReplyError> {
        self.outcome.as_ref().err()
    }

    pub fn backend_latency_ms(&self) -> Option<u64> {
        self.backend_latency_ms
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_result(self) -> Result<String, ReplyError> {
        self.outcome
    }
}

impl Serialize for ChatReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ChatReply", 2)?;
        match &self.outcome {
            Ok(reply) => {
                state.serialize_field("reply", reply)?;
                match self.backend_latency_ms {
                    Some(ms) => state.serialize_field("backend_latency_ms", &ms)?,
                    None => state.skip_field("backend_latency_ms")?,
                }
            }
            Err(error) => state.serialize_field("error", error)?,
        }
        state.end()
    }
}

/// Wire shape of a successful `/conversation` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_background_info_alias_and_null() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","background_info":"ctx"}"#).unwrap();
        assert_eq!(req.background_context, "ctx");

        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","background_context":null}"#).unwrap();
        assert_eq!(req.background_context, "");

        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(req.background_context, "");
    }

    #[test]
    fn failure_reply_carries_kind_and_message() {
        let reply = ChatReply::failure(&RelayError::BackendUnavailable("refused".into()));
        assert!(!reply.is_success());
        assert!(reply.reply().is_none());
        let err = reply.into_result().unwrap_err();
        assert_eq!(err.kind, "BackendUnavailable");
        assert!(err.message.contains("refused"));
    }

    #[test]
    fn serializes_only_the_populated_side() {
        let ok = ChatReply::success("AI is...", Some(12));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"reply": "AI is...", "backend_latency_ms": 12})
        );

        let failed = ChatReply::failure(&RelayError::InvalidInput("Message cannot be empty".into()));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": {"kind": "InvalidInput", "message": "Message cannot be empty"}})
        );
        assert!(failed.backend_latency_ms().is_none());
    }
}
