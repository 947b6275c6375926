// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Single-user synchronization.
//!
//! Fetches one user by Moodle id and upserts the mirrored `Moodle User`
//! document. Newly created documents start as disconnected students; updates
//! never touch the stored user type, so a teacher promoted by a course sync
//! is not demoted by a later profile edit.

use serde_json::json;
use tracing::instrument;

use moodle_bridge_client::MoodleClient;
use moodle_bridge_frappe::FrappeClient;

use crate::error::Result;
use crate::records::{self, ConnectionStatus, MoodleUserDoc, NamedRow, UserType};
use crate::report::SyncReport;
use crate::site::SiteContext;

/// Join first and last name the way the mirrored documents store it.
pub(crate) fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    match (first, last) {
        (None, None) => None,
        (first, last) => Some(
            format!("{} {}", first.unwrap_or(""), last.unwrap_or(""))
                .trim()
                .to_string(),
        ),
    }
}

/// Locate the mirrored document for a Moodle user.
///
/// Tries the computed name first, then falls back to a `user_id` filter so
/// documents written under older identifier formats are updated in place.
pub(crate) async fn find_user_doc(
    frappe: &FrappeClient,
    instance: &str,
    user_id: i64,
) -> Result<Option<String>> {
    let name = records::user_doc_name(instance, user_id);
    if frappe.exists(records::MOODLE_USER, &name).await? {
        return Ok(Some(name));
    }

    let rows: Vec<NamedRow> = frappe
        .list(
            records::MOODLE_USER,
            json!([["user_instance", "=", instance], ["user_id", "=", user_id]]),
            &["name"],
            1,
        )
        .await?;
    Ok(rows.into_iter().next().map(|row| row.name))
}

/// Update the existing document for a user, or insert one under the computed
/// name. The builder receives whether the document is new so callers can set
/// creation-only fields. Returns the document name and whether it was created.
pub(crate) async fn upsert_user_doc<F>(
    frappe: &FrappeClient,
    instance: &str,
    user_id: i64,
    build: F,
) -> Result<(String, bool)>
where
    F: FnOnce(bool) -> MoodleUserDoc,
{
    match find_user_doc(frappe, instance, user_id).await? {
        Some(name) => {
            let doc = build(false);
            frappe
                .update(records::MOODLE_USER, &name, &serde_json::to_value(&doc)?)
                .await?;
            Ok((name, false))
        }
        None => {
            let name = records::user_doc_name(instance, user_id);
            let doc = build(true);
            let mut value = serde_json::to_value(&doc)?;
            if let Some(obj) = value.as_object_mut() {
                obj.insert("name".to_string(), json!(name));
            }
            frappe.insert(records::MOODLE_USER, &value).await?;
            Ok((name, true))
        }
    }
}

/// Mirror a single Moodle user into Frappe.
#[instrument(skip(frappe, site, moodle), fields(instance = %site.instance))]
pub async fn sync_user(
    frappe: &FrappeClient,
    site: &SiteContext,
    moodle: &MoodleClient,
    user_id: i64,
) -> SyncReport {
    let mut logs = vec![format!(
        "Starting user sync for id {user_id} on {}.",
        site.instance
    )];

    match run(frappe, site, moodle, user_id, &mut logs).await {
        Ok(name) => {
            frappe
                .log_error(&format!("User Sync Completed: {name}"), &logs.join("\n"))
                .await;
            SyncReport::success("User synchronized.", logs)
        }
        Err(err) => {
            logs.push(format!("[ERROR] {err}"));
            frappe
                .log_error(&format!("User Sync Failed: {user_id}"), &logs.join("\n"))
                .await;
            SyncReport::error(format!("user sync failed: {err}"), logs)
        }
    }
}

async fn run(
    frappe: &FrappeClient,
    site: &SiteContext,
    moodle: &MoodleClient,
    user_id: i64,
    logs: &mut Vec<String>,
) -> Result<String> {
    let user = moodle.get_user_by_id(user_id).await?;
    logs.push(format!(
        "Fetched user '{}' from Moodle.",
        user.username.as_deref().unwrap_or("?")
    ));

    let (name, created) = upsert_user_doc(frappe, &site.instance, user_id, |is_new| {
        MoodleUserDoc {
            user_id,
            moodle_user_id: user.username.clone(),
            user_name: user.firstname.clone(),
            user_surname: user.lastname.clone(),
            user_fullname: full_name(user.firstname.as_deref(), user.lastname.as_deref()),
            user_email: user.email.clone(),
            user_phone: user.phone1.clone(),
            user_dni: user.idnumber.clone(),
            // core_user_get_users does not expose the birthdate custom field.
            user_birthdate: None,
            user_instance: site.instance.clone(),
            // Keep the stored type on updates; course syncs own promotions.
            user_type: is_new.then_some(UserType::Student),
            user_connection_status: is_new.then_some(ConnectionStatus::Disconnected),
        }
    })
    .await?;

    logs.push(if created {
        format!("Created user document {name}.")
    } else {
        format!("Updated user document {name}.")
    });
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_joins_and_trims() {
        assert_eq!(
            full_name(Some("Eva"), Some("Ruiz")).as_deref(),
            Some("Eva Ruiz")
        );
        assert_eq!(full_name(Some("Eva"), None).as_deref(), Some("Eva"));
        assert_eq!(full_name(None, Some("Ruiz")).as_deref(), Some("Ruiz"));
        assert_eq!(full_name(None, None), None);
    }
}
