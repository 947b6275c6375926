// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Response types for the Moodle web-service functions used by the sync flows.
//!
//! Moodle returns many more fields than the bridge consumes; everything not
//! listed here is ignored during deserialization.

use serde::Deserialize;

/// A user record from `core_user_get_users`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoodleUser {
    /// Numeric Moodle user id.
    pub id: i64,
    /// Login name on the site.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Primary phone number.
    #[serde(default)]
    pub phone1: Option<String>,
    /// Institution-assigned identifier (national id in the deployments this
    /// bridge serves).
    #[serde(default)]
    pub idnumber: Option<String>,
}

/// A course record from `core_course_get_courses` /
/// `core_course_get_courses_by_field`.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseSummary {
    /// Numeric Moodle course id.
    pub id: i64,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub shortname: Option<String>,
    /// Course start as Unix seconds; 0 means unset.
    #[serde(default)]
    pub startdate: i64,
    /// Course end as Unix seconds; 0 means unset.
    #[serde(default)]
    pub enddate: i64,
}

/// A role attached to an enrolled user.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRef {
    #[serde(default)]
    pub shortname: Option<String>,
}

/// A group membership attached to an enrolled user.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRef {
    pub id: i64,
}

/// A participant record from `core_enrol_get_enrolled_users`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrolledUser {
    /// Numeric Moodle user id.
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub idnumber: Option<String>,
    #[serde(default)]
    pub phone1: Option<String>,
    /// Date of birth as Unix seconds; a custom profile field the served sites
    /// expose in their enrolment payloads.
    #[serde(default)]
    pub birthdate: Option<i64>,
    #[serde(default)]
    pub roles: Vec<RoleRef>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

/// A group record from `core_group_get_course_groups`.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseGroup {
    /// Numeric Moodle group id.
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A category record from `core_course_get_categories`.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    /// Numeric Moodle category id.
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Parent category id; 0 for top-level categories.
    #[serde(default)]
    pub parent: i64,
}

/// A role record from `local_wsgetroles_get_roles`.
#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    /// Numeric Moodle role id.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Wrapper for `core_user_get_users` responses.
#[derive(Debug, Deserialize)]
pub(crate) struct UsersResponse {
    #[serde(default)]
    pub users: Vec<MoodleUser>,
}

/// Wrapper for `core_course_get_courses_by_field` responses.
#[derive(Debug, Deserialize)]
pub(crate) struct CoursesByFieldResponse {
    #[serde(default)]
    pub courses: Vec<CourseSummary>,
}
