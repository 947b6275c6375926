// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Connection-status updates from login/logout webhooks.
//!
//! The only Moodle data in the payload is the origin URL and the user id;
//! everything else is a Frappe-side lookup, so this flow never calls the
//! Moodle API.

use serde_json::json;
use tracing::instrument;

use moodle_bridge_frappe::FrappeClient;

use crate::error::{Result, SyncError};
use crate::records::{self, ConnectionStatus, NamedRow};
use crate::report::SyncReport;
use crate::site;

/// Flip a user's `user_connection_status` from a connect/disconnect event.
#[instrument(skip(frappe, moodle_url))]
pub async fn update_connection_status(
    frappe: &FrappeClient,
    moodle_url: &str,
    user_id: i64,
    action: &str,
) -> SyncReport {
    let status = match action {
        "connect" => ConnectionStatus::Connected,
        "disconnect" => ConnectionStatus::Disconnected,
        other => {
            return SyncReport::error(
                format!("unsupported presence action: '{other}'"),
                Vec::new(),
            );
        }
    };

    let mut logs = vec![format!(
        "Updating connection status for user {user_id} to {}.",
        status.as_str()
    )];

    match run(frappe, moodle_url, user_id, status, &mut logs).await {
        Ok(name) => {
            frappe
                .log_error(
                    &format!("User Status - {name} ({})", status.as_str()),
                    &format!("Status updated: {name} to '{}'.", status.as_str()),
                )
                .await;
            SyncReport::success(
                format!("Status updated to '{}' for {name}.", status.as_str()),
                logs,
            )
        }
        Err(err) => {
            logs.push(format!("[ERROR] {err}"));
            SyncReport::error(err.to_string(), logs)
        }
    }
}

async fn run(
    frappe: &FrappeClient,
    moodle_url: &str,
    user_id: i64,
    status: ConnectionStatus,
    logs: &mut Vec<String>,
) -> Result<String> {
    let site = site::resolve_site(frappe, moodle_url).await?;
    logs.push(format!("Matched Moodle instance {}.", site.instance));

    let rows: Vec<NamedRow> = frappe
        .list(
            records::MOODLE_USER,
            json!([
                ["user_instance", "=", site.instance],
                ["user_id", "=", user_id],
            ]),
            &["name"],
            1,
        )
        .await?;
    let row = rows.into_iter().next().ok_or_else(|| {
        SyncError::NotFound(format!(
            "no Moodle User with user_id {user_id} on instance {}",
            site.instance
        ))
    })?;

    frappe
        .set_value(
            records::MOODLE_USER,
            &row.name,
            "user_connection_status",
            json!(status.as_str()),
        )
        .await?;
    logs.push(format!("Set {} to {}.", row.name, status.as_str()));
    Ok(row.name)
}
