// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Category synchronization: the category, its children, and course links.
//!
//! Parent links resolve against already-mirrored categories only; a missing
//! parent is a warning, not a failure (the parent's own webhook will fill the
//! gap). A subcategory whose identifier equals the synced category is skipped
//! rather than linked to itself.

use serde_json::json;
use tracing::instrument;

use moodle_bridge_client::MoodleClient;
use moodle_bridge_frappe::FrappeClient;

use crate::error::{Result, SyncError};
use crate::records::{self, CategoryDoc, NamedRow, SubcategoryRow};
use crate::report::SyncReport;
use crate::site::SiteContext;

/// Mirror a category, its direct subcategories, and its courses' category
/// links into Frappe.
#[instrument(skip(frappe, site, moodle), fields(instance = %site.instance))]
pub async fn sync_category(
    frappe: &FrappeClient,
    site: &SiteContext,
    moodle: &MoodleClient,
    category_id: i64,
) -> SyncReport {
    let mut logs = vec![format!(
        "Starting category sync for id {category_id} on {}.",
        site.instance
    )];

    match run(frappe, site, moodle, category_id, &mut logs).await {
        Ok(()) => {
            frappe
                .log_error(&format!("Category Sync: {category_id}"), &logs.join("\n"))
                .await;
            SyncReport::success("Category synchronized.", logs)
        }
        Err(err) => {
            logs.push(format!("[ERROR] {err}"));
            frappe
                .log_error(
                    &format!("Category Sync Failed: {category_id}"),
                    &logs.join("\n"),
                )
                .await;
            SyncReport::error(format!("category sync failed: {err}"), logs)
        }
    }
}

async fn run(
    frappe: &FrappeClient,
    site: &SiteContext,
    moodle: &MoodleClient,
    category_id: i64,
    logs: &mut Vec<String>,
) -> Result<()> {
    let category = moodle
        .get_categories_by_id(category_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SyncError::NotFound(format!("no category with id {category_id}")))?;
    logs.push(format!(
        "Fetched category '{}'.",
        category.name.as_deref().unwrap_or("?")
    ));

    // Parent link, resolved against already-mirrored categories.
    let parent_link = if category.parent > 0 {
        let rows: Vec<NamedRow> = frappe
            .list(
                records::MOODLE_COURSE_CATEGORY,
                json!([
                    ["coursecat_id", "=", category.parent.to_string()],
                    ["coursecat_instance", "=", site.instance],
                ]),
                &["name"],
                1,
            )
            .await?;
        match rows.into_iter().next() {
            Some(row) => {
                logs.push(format!("Resolved parent category {}.", row.name));
                Some(row.name)
            }
            None => {
                logs.push(format!(
                    "[WARN] parent category with id {} is not mirrored yet.",
                    category.parent
                ));
                None
            }
        }
    } else {
        None
    };

    let doc_name = records::category_doc_name(&site.instance, category_id);
    let doc = CategoryDoc {
        coursecat_id: category_id.to_string(),
        coursecat_name: category.name.clone(),
        coursecat_description: category.description.clone(),
        coursecat_parent: parent_link,
        coursecat_instance: site.instance.clone(),
        coursecat_subcat: Vec::new(),
    };
    frappe
        .upsert(
            records::MOODLE_COURSE_CATEGORY,
            &doc_name,
            &serde_json::to_value(&doc)?,
        )
        .await?;
    logs.push(format!("Saved category document {doc_name}."));

    // Direct subcategories.
    let subcategories = moodle.get_categories_by_parent(category_id).await?;
    let mut subcat_rows: Vec<SubcategoryRow> = Vec::new();
    for subcategory in &subcategories {
        let sub_name = records::category_doc_name(&site.instance, subcategory.id);
        if sub_name == doc_name {
            logs.push(format!(
                "Skipped subcategory {sub_name}: a category cannot be its own parent."
            ));
            continue;
        }

        let sub_doc = CategoryDoc {
            coursecat_id: subcategory.id.to_string(),
            coursecat_name: subcategory.name.clone(),
            coursecat_description: subcategory.description.clone(),
            coursecat_parent: Some(doc_name.clone()),
            coursecat_instance: site.instance.clone(),
            coursecat_subcat: Vec::new(),
        };
        frappe
            .upsert(
                records::MOODLE_COURSE_CATEGORY,
                &sub_name,
                &serde_json::to_value(&sub_doc)?,
            )
            .await?;

        if !subcat_rows.iter().any(|row| row.coursecat_subcat == sub_name) {
            subcat_rows.push(SubcategoryRow {
                coursecat_subcat: sub_name,
            });
        }
    }
    logs.push(format!("Synchronized {} subcategories.", subcat_rows.len()));

    frappe
        .update(
            records::MOODLE_COURSE_CATEGORY,
            &doc_name,
            &json!({ "coursecat_subcat": subcat_rows }),
        )
        .await?;

    // Refresh the category link on mirrored courses.
    let courses = moodle.get_courses_in_category(category_id).await?;
    for course in &courses {
        let course_name = records::course_doc_name(&site.instance, course.id);
        if frappe.exists(records::MOODLE_COURSE, &course_name).await? {
            frappe
                .set_value(
                    records::MOODLE_COURSE,
                    &course_name,
                    "course_category",
                    json!(doc_name),
                )
                .await?;
            logs.push(format!("Updated category link on course {course_name}."));
        } else {
            logs.push(format!(
                "Course with id {} is not mirrored; skipped.",
                course.id
            ));
        }
    }

    logs.push("Category sync complete.".to_string());
    Ok(())
}
