// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Polling survey SDK.

use thiserror::Error;

/// The primary error type used across all SDK traits and core operations.
#[derive(Debug, Error)]
pub enum PollingError {
    /// Configuration errors (missing credentials, invalid URLs, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote API answered with a non-success status.
    #[error("{context}: {status}")]
    Status { context: String, status: u16 },

    /// A response or stored payload could not be decoded.
    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An inbound frame message was rejected or malformed.
    #[error("bridge error: {0}")]
    Bridge(String),

    /// The host surface refused to mount or unmount the popup.
    #[error("display error: {message}")]
    Display { message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PollingError {
    /// Whether the failure is a network-level condition that the next poll
    /// cycle may resolve on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, PollingError::Transport { .. } | PollingError::Status { .. })
    }

    /// The message handed to the host's failure callback.
    pub fn failure_message(&self) -> String {
        match self {
            PollingError::Transport { .. } => "Network error.".to_string(),
            PollingError::Status { context, status } => format!("{context}: {status}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_status_are_transient() {
        let transport = PollingError::Transport {
            message: "connection reset".into(),
            source: None,
        };
        let status = PollingError::Status {
            context: "Failed to load".into(),
            status: 503,
        };
        assert!(transport.is_transient());
        assert!(status.is_transient());
        assert!(!PollingError::Bridge("bad".into()).is_transient());
    }

    #[test]
    fn failure_messages_match_host_contract() {
        let transport = PollingError::Transport {
            message: "dns failure".into(),
            source: None,
        };
        assert_eq!(transport.failure_message(), "Network error.");

        let status = PollingError::Status {
            context: "Failed to log event".into(),
            status: 422,
        };
        assert_eq!(status.failure_message(), "Failed to log event: 422");
    }
}
