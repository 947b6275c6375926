// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Frappe document schemas for the mirrored Moodle entities.
//!
//! One doctype per entity, each keyed by a computed identifier string so
//! repeated webhook deliveries rewrite the same documents. Child tables on
//! courses and categories are rebuilt from scratch on every sync, never
//! accumulated.

use serde::{Deserialize, Serialize};

use moodle_bridge_client::RoleRef;

/// Doctype holding site URL → web-service token configuration.
pub const MOODLE_INSTANCE: &str = "Moodle Instance";
/// Doctype mirroring Moodle users.
pub const MOODLE_USER: &str = "Moodle User";
/// Doctype mirroring Moodle courses.
pub const MOODLE_COURSE: &str = "Moodle Course";
/// Doctype mirroring course groups.
pub const MOODLE_COURSE_GROUP: &str = "Moodle Course Group";
/// Doctype mirroring course categories.
pub const MOODLE_COURSE_CATEGORY: &str = "Moodle Course Category";
/// Doctype mirroring site roles.
pub const MOODLE_USER_ROLE: &str = "Moodle User Role";

/// Document name for a mirrored user: `"{instance} {moodle id}"`.
pub fn user_doc_name(instance: &str, user_id: i64) -> String {
    format!("{instance} {user_id}")
}

/// Document name for a mirrored course: `"{instance} {course id}"`.
pub fn course_doc_name(instance: &str, course_id: i64) -> String {
    format!("{instance} {course_id}")
}

/// Document name for a course group: `"{course doc} {group name}"`.
pub fn group_doc_name(course_doc: &str, group_name: &str) -> String {
    format!("{course_doc} {group_name}")
}

/// Document name for a category: `"{instance} {category id}"`.
pub fn category_doc_name(instance: &str, category_id: i64) -> String {
    format!("{instance} {category_id}")
}

/// Mirrored role of a user on its site.
///
/// Participants carry several Moodle roles; the strongest one wins
/// (editing teacher over teacher over student).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    #[default]
    Student,
    Teacher,
    #[serde(rename = "Editing Teacher")]
    EditingTeacher,
}

impl UserType {
    /// Derive the strongest user type from a participant's Moodle roles.
    pub fn from_roles(roles: &[RoleRef]) -> Self {
        let mut best = UserType::Student;
        for role in roles {
            match role.shortname.as_deref() {
                Some("editingteacher") => return UserType::EditingTeacher,
                Some("teacher") => best = UserType::Teacher,
                _ => {}
            }
        }
        best
    }

    /// Whether this type lands in the course's teacher table.
    pub fn is_teaching(self) -> bool {
        !matches!(self, UserType::Student)
    }
}

/// A user's connection state, flipped by login/logout webhooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Field payload for a `Moodle User` document.
#[derive(Debug, Clone, Serialize)]
pub struct MoodleUserDoc {
    /// Numeric Moodle user id.
    pub user_id: i64,
    /// Login name on the Moodle site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moodle_user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_surname: Option<String>,
    pub user_fullname: Option<String>,
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    /// Institution identifier (idnumber in Moodle).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_dni: Option<String>,
    /// `YYYY-MM-DD`, only present in enrolment payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_birthdate: Option<String>,
    pub user_instance: String,
    /// Omitted on updates that must preserve the stored type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    /// Only set on newly created documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_connection_status: Option<ConnectionStatus>,
}

/// Child-table row linking a student (and optionally a group) to a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRow {
    pub user_student: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_group: Option<String>,
}

/// Child-table row linking a teacher to a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherRow {
    pub user_teacher: String,
}

/// Child-table row linking a group document to a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRow {
    pub course_group: String,
}

/// Field payload for a `Moodle Course` document.
#[derive(Debug, Clone, Serialize)]
pub struct MoodleCourseDoc {
    pub course_name: Option<String>,
    /// Numeric Moodle course id.
    pub course_code: i64,
    pub course_instance: String,
    pub course_start_date: Option<String>,
    pub course_end_date: Option<String>,
    pub course_students: Vec<StudentRow>,
    pub course_teachers: Vec<TeacherRow>,
    pub course_groups: Vec<GroupRow>,
}

/// Field payload for a `Moodle Course Group` document.
#[derive(Debug, Clone, Serialize)]
pub struct CourseGroupDoc {
    pub group_name: String,
    pub group_instance: String,
    /// Name of the owning `Moodle Course` document.
    pub group_course: String,
    pub group_moodle_id: String,
}

/// Child-table row linking a subcategory document to its parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubcategoryRow {
    pub coursecat_subcat: String,
}

/// Field payload for a `Moodle Course Category` document.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDoc {
    /// Numeric Moodle category id, stored as text.
    pub coursecat_id: String,
    pub coursecat_name: Option<String>,
    pub coursecat_description: Option<String>,
    /// Name of the parent category document, when mirrored. Serialized even
    /// when `None` so a vanished parent clears the stored link.
    pub coursecat_parent: Option<String>,
    pub coursecat_instance: String,
    /// Omitted when empty: subcategory upserts must not clobber the target's
    /// own child table. The owning flow rewrites the table explicitly.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coursecat_subcat: Vec<SubcategoryRow>,
}

/// Name-only projection used for filtered lookups.
#[derive(Debug, Deserialize)]
pub(crate) struct NamedRow {
    pub name: String,
}

/// Field payload for a `Moodle User Role` document.
#[derive(Debug, Clone, Serialize)]
pub struct UserRoleDoc {
    pub role_id: i64,
    pub role_name: String,
    pub role_shortname: String,
    pub role_description: String,
    pub role_instance: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(shortname: &str) -> RoleRef {
        serde_json::from_value(serde_json::json!({ "shortname": shortname })).unwrap()
    }

    #[test]
    fn test_user_type_precedence_editing_teacher_wins() {
        let roles = vec![role("student"), role("editingteacher"), role("teacher")];
        assert_eq!(UserType::from_roles(&roles), UserType::EditingTeacher);
    }

    #[test]
    fn test_user_type_precedence_teacher_over_student() {
        let roles = vec![role("student"), role("teacher")];
        assert_eq!(UserType::from_roles(&roles), UserType::Teacher);
    }

    #[test]
    fn test_user_type_defaults_to_student() {
        assert_eq!(UserType::from_roles(&[]), UserType::Student);
        assert_eq!(UserType::from_roles(&[role("manager")]), UserType::Student);
    }

    #[test]
    fn test_user_type_serializes_with_space() {
        assert_eq!(
            serde_json::to_value(UserType::EditingTeacher).unwrap(),
            "Editing Teacher"
        );
        assert_eq!(serde_json::to_value(UserType::Student).unwrap(), "Student");
    }

    #[test]
    fn test_doc_names() {
        assert_eq!(user_doc_name("Campus 42", 7), "Campus 42 7");
        assert_eq!(course_doc_name("Campus 42", 9), "Campus 42 9");
        assert_eq!(group_doc_name("Campus 42 9", "Group A"), "Campus 42 9 Group A");
        assert_eq!(category_doc_name("Campus 42", 4), "Campus 42 4");
    }

    #[test]
    fn test_user_doc_omits_preserved_fields() {
        let doc = MoodleUserDoc {
            user_id: 7,
            moodle_user_id: Some("student1".to_string()),
            user_name: Some("Eva".to_string()),
            user_surname: Some("Ruiz".to_string()),
            user_fullname: Some("Eva Ruiz".to_string()),
            user_email: Some("eva@example.org".to_string()),
            user_phone: None,
            user_dni: None,
            user_birthdate: None,
            user_instance: "Campus 42".to_string(),
            user_type: None,
            user_connection_status: None,
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("user_type").is_none());
        assert!(value.get("user_connection_status").is_none());
        assert!(value.get("user_phone").is_none());
    }
}
