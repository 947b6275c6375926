// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Site-wide role synchronization via the `wsgetroles` local plugin.
//!
//! Role documents are matched by Moodle role id scoped to the instance, so
//! two sites can both have a role id 5 without clobbering each other.

use serde_json::json;
use tracing::instrument;

use moodle_bridge_client::MoodleClient;
use moodle_bridge_frappe::FrappeClient;

use crate::error::Result;
use crate::records::{self, NamedRow, UserRoleDoc};
use crate::report::SyncReport;
use crate::site::SiteContext;

/// Mirror the site's role table into Frappe.
#[instrument(skip(frappe, site, moodle), fields(instance = %site.instance))]
pub async fn sync_roles(
    frappe: &FrappeClient,
    site: &SiteContext,
    moodle: &MoodleClient,
) -> SyncReport {
    let mut logs = vec![format!("Starting role sync on {}.", site.instance)];

    match run(frappe, site, moodle, &mut logs).await {
        Ok(synced) => {
            frappe
                .log_error(
                    &format!("Role Sync Completed: {}", site.instance),
                    &logs.join("\n"),
                )
                .await;
            SyncReport::success(format!("{synced} roles synchronized."), logs)
        }
        Err(err) => {
            logs.push(format!("[ERROR] {err}"));
            frappe
                .log_error(
                    &format!("Role Sync Failed: {}", site.instance),
                    &logs.join("\n"),
                )
                .await;
            SyncReport::error(format!("role sync failed: {err}"), logs)
        }
    }
}

async fn run(
    frappe: &FrappeClient,
    site: &SiteContext,
    moodle: &MoodleClient,
    logs: &mut Vec<String>,
) -> Result<usize> {
    let roles = moodle.get_roles().await?;
    logs.push(format!("Fetched {} roles from the site.", roles.len()));

    let mut synced = 0;
    for role in &roles {
        let Some(role_id) = role.id else {
            logs.push("Skipped role entry without an id.".to_string());
            continue;
        };
        let Some(shortname) = role
            .shortname
            .as_deref()
            .filter(|shortname| !shortname.is_empty())
        else {
            logs.push(format!("Skipped role {role_id}: missing shortname."));
            continue;
        };

        let doc = UserRoleDoc {
            role_id,
            role_name: role
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Unnamed Role ({role_id})")),
            role_shortname: shortname.to_string(),
            role_description: role
                .description
                .as_deref()
                .filter(|description| !description.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| "No description available".to_string()),
            role_instance: site.instance.clone(),
        };

        let existing: Vec<NamedRow> = frappe
            .list(
                records::MOODLE_USER_ROLE,
                json!([
                    ["role_id", "=", role_id],
                    ["role_instance", "=", site.instance],
                ]),
                &["name"],
                1,
            )
            .await?;

        let value = serde_json::to_value(&doc)?;
        match existing.into_iter().next() {
            Some(row) => {
                frappe
                    .update(records::MOODLE_USER_ROLE, &row.name, &value)
                    .await?;
                logs.push(format!("Updated role {shortname}."));
            }
            None => {
                frappe.insert(records::MOODLE_USER_ROLE, &value).await?;
                logs.push(format!("Created role {shortname}."));
            }
        }
        synced += 1;
    }

    Ok(synced)
}
