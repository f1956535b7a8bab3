//! Transport error taxonomy.
//!
//! DESIGN
//! ======
//! Variants follow how the stores react, not how reqwest failed:
//! - `Network`: no response arrived; shown as the operation's generic message.
//! - `Unauthorized`: 401; the transport has already torn the session down.
//! - `Rejected`: any other non-2xx; the server's `error` text is passed through.
//! - `Decode` / `InvalidRequest`: client-side contract mismatches.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors produced by [`crate::net::transport::Transport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connection, timeout).
    #[error("network request failed: {0}")]
    Network(String),

    /// The server answered 401.
    #[error("unauthorized")]
    Unauthorized { message: Option<String> },

    /// The server answered with another non-success status.
    #[error("request rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },

    /// A success response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The request could not be built (bad URL, unserializable body, client build).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Build the error for a non-success status and the raw response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<super::types::ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .filter(|m| !m.trim().is_empty());
        if status == 401 {
            Self::Unauthorized { message }
        } else {
            Self::Rejected { status, message }
        }
    }

    /// Server-supplied message, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message for `last_error`: the server's text when present, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_owned()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// True when no response was received; the user may retry manually.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
