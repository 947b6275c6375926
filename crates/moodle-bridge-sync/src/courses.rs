// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Course synchronization: the course document, its groups, and its enrolment.
//!
//! The flow rewrites the course's child tables from scratch on every run:
//! the course is upserted with empty link tables, groups and participants are
//! mirrored individually, and a final update writes the rebuilt tables. A
//! participant whose document cannot be saved is logged and skipped; one bad
//! record must not abort the rest of the enrolment.

use std::collections::{HashMap, HashSet};

use chrono::DateTime;
use serde_json::json;
use tracing::instrument;

use moodle_bridge_client::MoodleClient;
use moodle_bridge_frappe::FrappeClient;

use crate::error::Result;
use crate::records::{
    self, ConnectionStatus, CourseGroupDoc, GroupRow, MoodleCourseDoc, MoodleUserDoc, StudentRow,
    TeacherRow, UserType,
};
use crate::report::SyncReport;
use crate::site::SiteContext;
use crate::users::{full_name, upsert_user_doc};

/// Render Unix seconds as the `YYYY-MM-DD` string Frappe date fields expect.
/// Moodle uses 0 for unset course dates.
fn unix_to_date(timestamp: i64) -> Option<String> {
    (timestamp > 0)
        .then(|| DateTime::from_timestamp(timestamp, 0))
        .flatten()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Mirror a course, its groups, and its participants into Frappe.
#[instrument(skip(frappe, site, moodle), fields(instance = %site.instance))]
pub async fn sync_course(
    frappe: &FrappeClient,
    site: &SiteContext,
    moodle: &MoodleClient,
    course_id: i64,
) -> SyncReport {
    let mut logs = vec![format!(
        "Starting course sync for id {course_id} on {}.",
        site.instance
    )];

    match run(frappe, site, moodle, course_id, &mut logs).await {
        Ok(()) => {
            frappe
                .log_error(&format!("Course Sync: {course_id}"), &logs.join("\n"))
                .await;
            SyncReport::success("Course synchronized.", logs)
        }
        Err(err) => {
            logs.push(format!("[ERROR] {err}"));
            frappe
                .log_error(&format!("Course Sync Failed: {course_id}"), &logs.join("\n"))
                .await;
            SyncReport::error(format!("course sync failed: {err}"), logs)
        }
    }
}

async fn run(
    frappe: &FrappeClient,
    site: &SiteContext,
    moodle: &MoodleClient,
    course_id: i64,
    logs: &mut Vec<String>,
) -> Result<()> {
    // Course document, link tables cleared.
    let course = moodle.get_course(course_id).await?;
    let course_name = records::course_doc_name(&site.instance, course_id);
    let doc = MoodleCourseDoc {
        course_name: course.fullname.clone(),
        course_code: course_id,
        course_instance: site.instance.clone(),
        course_start_date: unix_to_date(course.startdate),
        course_end_date: unix_to_date(course.enddate),
        course_students: Vec::new(),
        course_teachers: Vec::new(),
        course_groups: Vec::new(),
    };
    frappe
        .upsert(records::MOODLE_COURSE, &course_name, &serde_json::to_value(&doc)?)
        .await?;
    logs.push(format!(
        "Saved course document {course_name} ('{}').",
        course.fullname.as_deref().unwrap_or("?")
    ));

    // Groups: mirror each one and remember moodle id → document name.
    let groups = moodle.get_course_groups(course_id).await?;
    let mut group_map: HashMap<i64, String> = HashMap::new();
    let mut group_rows: Vec<GroupRow> = Vec::new();
    for group in &groups {
        let group_name = records::group_doc_name(&course_name, &group.name);
        let group_doc = CourseGroupDoc {
            group_name: group.name.clone(),
            group_instance: site.instance.clone(),
            group_course: course_name.clone(),
            group_moodle_id: group.id.to_string(),
        };
        frappe
            .upsert(
                records::MOODLE_COURSE_GROUP,
                &group_name,
                &serde_json::to_value(&group_doc)?,
            )
            .await?;
        group_map.insert(group.id, group_name.clone());
        // Moodle occasionally reports a group twice; link each document once.
        if !group_rows.iter().any(|row| row.course_group == group_name) {
            group_rows.push(GroupRow {
                course_group: group_name,
            });
        }
    }
    logs.push(format!("Synchronized {} course groups.", group_rows.len()));

    // Enrolment: mirror every participant, then rebuild the link tables.
    let participants = moodle.get_enrolled_users(course_id).await?;
    if participants.is_empty() {
        logs.push(format!(
            "[WARN] no participants found for course {course_id}."
        ));
    }

    let mut student_rows: Vec<StudentRow> = Vec::new();
    let mut teacher_rows: Vec<TeacherRow> = Vec::new();
    let mut linked: HashSet<String> = HashSet::new();

    for participant in &participants {
        let user_type = UserType::from_roles(&participant.roles);
        let saved = upsert_user_doc(frappe, &site.instance, participant.id, |is_new| {
            MoodleUserDoc {
                user_id: participant.id,
                moodle_user_id: participant.username.clone(),
                user_name: participant.firstname.clone(),
                user_surname: participant.lastname.clone(),
                user_fullname: full_name(
                    participant.firstname.as_deref(),
                    participant.lastname.as_deref(),
                ),
                user_email: participant.email.clone(),
                user_phone: participant.phone1.clone(),
                user_dni: participant.idnumber.clone(),
                user_birthdate: participant.birthdate.and_then(unix_to_date),
                user_instance: site.instance.clone(),
                // Enrolment data carries the authoritative role.
                user_type: Some(user_type),
                user_connection_status: is_new.then_some(ConnectionStatus::Disconnected),
            }
        })
        .await;

        let user_name = match saved {
            Ok((name, _)) => name,
            Err(err) => {
                logs.push(format!(
                    "[ERROR] could not save participant {}: {err}",
                    records::user_doc_name(&site.instance, participant.id)
                ));
                continue;
            }
        };

        // Duplicate enrolment entries link once.
        if !linked.insert(user_name.clone()) {
            continue;
        }

        let group_link = participant
            .groups
            .iter()
            .find_map(|group| group_map.get(&group.id))
            .cloned();

        if user_type.is_teaching() {
            teacher_rows.push(TeacherRow {
                user_teacher: user_name,
            });
        } else {
            student_rows.push(StudentRow {
                user_student: user_name,
                user_group: group_link,
            });
        }
    }

    logs.push(format!(
        "Linked {} students and {} teachers.",
        student_rows.len(),
        teacher_rows.len()
    ));

    frappe
        .update(
            records::MOODLE_COURSE,
            &course_name,
            &json!({
                "course_students": student_rows,
                "course_teachers": teacher_rows,
                "course_groups": group_rows,
            }),
        )
        .await?;
    logs.push("Participants and groups linked to the course.".to_string());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_to_date_converts_utc() {
        assert_eq!(unix_to_date(1735689600).as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn test_unix_to_date_zero_is_unset() {
        assert_eq!(unix_to_date(0), None);
    }

    #[test]
    fn test_unix_to_date_negative_is_unset() {
        assert_eq!(unix_to_date(-1), None);
    }
}
