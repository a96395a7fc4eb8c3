// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every SendVision crate.

use thiserror::Error;

/// The primary error type returned by stores, sources and workflow actions.
#[derive(Debug, Error)]
pub enum SendvisionError {
    /// Caller-supplied input failed a local precondition. Never sent to the source.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The record source rejected a query, subscription or mutation.
    #[error("remote error: {message}")]
    Remote {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A submission for the same record is still in flight.
    #[error("a submission for record {id} is already in flight")]
    SubmissionInFlight { id: String },

    /// The store was closed and accepts no further operations.
    #[error("store is closed")]
    Closed,

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SendvisionError {
    /// Shorthand for a [`SendvisionError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`SendvisionError::Remote`] without an underlying cause.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error was raised locally before any I/O happened.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::SubmissionInFlight { .. } | Self::Closed
        )
    }
}
