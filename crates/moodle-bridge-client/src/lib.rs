// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Typed client for the Moodle REST web-service API.
//!
//! Every operation is an HTTP GET against a site's
//! `/webservice/rest/server.php` endpoint, authenticated with a `wstoken`
//! query parameter and requesting `moodlewsrestformat=json`. The client wraps
//! the web-service functions the sync flows depend on:
//!
//! | Method | ws function |
//! |--------|-------------|
//! | [`MoodleClient::get_user_by_id`] | `core_user_get_users` |
//! | [`MoodleClient::get_course`] | `core_course_get_courses` |
//! | [`MoodleClient::get_enrolled_users`] | `core_enrol_get_enrolled_users` |
//! | [`MoodleClient::get_course_groups`] | `core_group_get_course_groups` |
//! | [`MoodleClient::get_categories_by_id`] | `core_course_get_categories` |
//! | [`MoodleClient::get_categories_by_parent`] | `core_course_get_categories` |
//! | [`MoodleClient::get_courses_in_category`] | `core_course_get_courses_by_field` |
//! | [`MoodleClient::get_roles`] | `local_wsgetroles_get_roles` |
//!
//! Moodle reports web-service failures as HTTP 200 with an
//! `{"exception", "errorcode", "message"}` body, so the client inspects every
//! response body for that envelope in addition to checking the HTTP status.

pub mod client;
pub mod error;
pub mod types;

pub use client::MoodleClient;
pub use error::{MoodleError, Result};
pub use types::{
    Category, CourseGroup, CourseSummary, EnrolledUser, GroupRef, MoodleUser, Role, RoleRef,
};
