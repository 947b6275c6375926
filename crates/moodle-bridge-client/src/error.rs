// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for the Moodle web-service client.

use thiserror::Error;

/// Result type using MoodleError.
pub type Result<T> = std::result::Result<T, MoodleError>;

/// Errors that can occur when calling a Moodle site.
#[derive(Debug, Error)]
pub enum MoodleError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The site answered with a non-success HTTP status.
    #[error("Moodle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The site answered 200 but the body carries a web-service exception.
    #[error("Moodle web-service error [{errorcode}]: {message}")]
    WebService { errorcode: String, message: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// A lookup returned no matching records.
    #[error("{0}")]
    NotFound(String),
}
