// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for the Frappe document client.

use thiserror::Error;

/// Result type using FrappeError.
pub type Result<T> = std::result::Result<T, FrappeError>;

/// Errors that can occur when talking to a Frappe site.
#[derive(Debug, Error)]
pub enum FrappeError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Frappe answered with a non-success HTTP status.
    #[error("Frappe returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The named document does not exist.
    #[error("{doctype} '{name}' not found")]
    NotFound { doctype: String, name: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}
