//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other failures, including transport errors that never
//! produced a response, land in `RequestFailed`.
//!
//! Every variant is `Clone`: one coalesced response is handed to each caller
//! waiting on it.

use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// A field check failed before any request was built.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The server returned 404, the requested todo does not exist.
    #[error("resource not found")]
    NotFound { message: Option<String> },

    /// Non-2xx status other than 404 (`status` is set), or a transport
    /// failure before any response arrived (`status` is `None`).
    #[error("request failed{}: {}", fmt_status(*.status), .message.as_deref().unwrap_or("no message"))]
    RequestFailed {
        status: Option<u16>,
        message: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

fn fmt_status(status: Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::RequestFailed {
            status: None,
            message: Some(message.into()),
        }
    }

    /// The message the server put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { message } => message.as_deref(),
            ApiError::RequestFailed {
                status: Some(_),
                message,
            } => message.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}
