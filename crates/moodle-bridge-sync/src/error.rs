// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for the sync flows.

use thiserror::Error;

/// Result type using SyncError.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors a sync flow can run into.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A Moodle web-service call failed.
    #[error("Moodle error: {0}")]
    Moodle(#[from] moodle_bridge_client::MoodleError),

    /// A Frappe document operation failed.
    #[error("Frappe error: {0}")]
    Frappe(#[from] moodle_bridge_frappe::FrappeError),

    /// A document payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The request carried missing or malformed parameters.
    #[error("{0}")]
    Invalid(String),

    /// A required record was not found on either side.
    #[error("{0}")]
    NotFound(String),
}
