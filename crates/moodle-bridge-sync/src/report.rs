// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Outcome envelope returned by every sync flow.

use serde::{Deserialize, Serialize};

/// Whether a flow completed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Error,
}

/// The `{status, message, logs}` envelope the webhook caller receives.
///
/// `logs` is the human-readable trail the flow accumulated; the same trail is
/// flushed to Frappe's Error Log for auditing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub status: SyncStatus,
    pub message: String,
    pub logs: Vec<String>,
}

impl SyncReport {
    /// Build a success report.
    pub fn success(message: impl Into<String>, logs: Vec<String>) -> Self {
        Self {
            status: SyncStatus::Success,
            message: message.into(),
            logs,
        }
    }

    /// Build a failure report.
    pub fn error(message: impl Into<String>, logs: Vec<String>) -> Self {
        Self {
            status: SyncStatus::Error,
            message: message.into(),
            logs,
        }
    }

    /// Prefix the trail with entries recorded before the flow started
    /// (dispatch logging from the webhook handler).
    pub fn with_preamble(mut self, mut preamble: Vec<String>) -> Self {
        preamble.append(&mut self.logs);
        self.logs = preamble;
        self
    }
}
