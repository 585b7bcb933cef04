// src/error.rs
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::message::ReplyError;

/// Failures produced while turning a message into a reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("GOOGLE_API_KEY environment variable is required")]
    MissingCredential,
    #[error("backend unreachable: {0}")]
    BackendUnavailable(String),
    #[error("{}", backend_error_text(.status, .message))]
    BackendError { status: Option<u16>, message: String },
}

fn backend_error_text(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("backend returned {code}: {message}"),
        None => format!("backend returned an invalid response: {message}"),
    }
}

impl RelayError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::MissingCredential => "MissingCredential",
            Self::BackendUnavailable(_) => "BackendUnavailable",
            Self::BackendError { .. } => "BackendError",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("invalid prompt template: {0}")]
    Template(#[from] TemplateError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("missing slot {0}")]
    MissingSlot(&'static str),
    #[error("slot {0} appears more than once")]
    DuplicateSlot(&'static str),
    #[error("{{background_context}} must come before {{user_message}}")]
    SlotOrder,
}

/// HTTP-facing error: a relay failure rendered as `{"error": {kind, message}}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", .0.message)]
    Relay(ReplyError),
    #[error("route not found")]
    NotFound,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a ReplyError,
}

// Malformed bodies get the same envelope as an empty message.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Relay(ReplyError {
            kind: "InvalidInput".to_string(),
            message: rejection.body_text(),
        })
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Relay(err) => match err.kind.as_str() {
                "InvalidInput" => StatusCode::BAD_REQUEST,
                "BackendUnavailable" | "BackendError" => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            Self::Relay(err) => err,
            Self::NotFound => ReplyError {
                kind: "NotFound".to_string(),
                message: "route not found".to_string(),
            },
        };
        (status, Json(ErrorBody { error: &error })).into_response()
    }
}
