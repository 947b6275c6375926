// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP client for a single Moodle site's REST web-service endpoint.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{MoodleError, Result};
use crate::types::{
    Category, CourseGroup, CourseSummary, CoursesByFieldResponse, EnrolledUser, MoodleUser, Role,
    UsersResponse,
};

/// Client for one Moodle site, bound to its ws endpoint and token.
///
/// The endpoint is the full `https://{site}/webservice/rest/server.php` URL;
/// callers resolve it from the configured site record before constructing the
/// client.
pub struct MoodleClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

// The wstoken grants full web-service access; keep it out of Debug output.
impl fmt::Debug for MoodleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoodleClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl MoodleClient {
    /// Create a client for the given ws endpoint and token.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// Issue one ws function call and return the raw JSON body.
    ///
    /// Checks the HTTP status and the Moodle exception envelope; a 200 body
    /// shaped like `{"exception": …, "errorcode": …, "message": …}` is a
    /// failure, not a result.
    async fn call(&self, wsfunction: &str, params: &[(&str, String)]) -> Result<Value> {
        let mut query: Vec<(&str, String)> = vec![
            ("wstoken", self.token.clone()),
            ("wsfunction", wsfunction.to_string()),
            ("moodlewsrestformat", "json".to_string()),
        ];
        query.extend(params.iter().map(|(k, v)| (*k, v.clone())));

        debug!(wsfunction, endpoint = %self.endpoint, "calling Moodle web service");

        let response = self.http.get(&self.endpoint).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MoodleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body)?;

        if let Some(obj) = value.as_object() {
            if obj.contains_key("exception") {
                let field = |key: &str| {
                    obj.get(key)
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string()
                };
                return Err(MoodleError::WebService {
                    errorcode: field("errorcode"),
                    message: field("message"),
                });
            }
        }

        Ok(value)
    }

    /// Fetch a single user by numeric id via `core_user_get_users`.
    pub async fn get_user_by_id(&self, user_id: i64) -> Result<MoodleUser> {
        let value = self
            .call(
                "core_user_get_users",
                &[
                    ("criteria[0][key]", "id".to_string()),
                    ("criteria[0][value]", user_id.to_string()),
                ],
            )
            .await?;
        let response: UsersResponse = serde_json::from_value(value)?;
        response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| MoodleError::NotFound(format!("no user with id {user_id}")))
    }

    /// Fetch a single course by id via `core_course_get_courses`.
    pub async fn get_course(&self, course_id: i64) -> Result<CourseSummary> {
        let value = self
            .call(
                "core_course_get_courses",
                &[("options[ids][0]", course_id.to_string())],
            )
            .await?;
        let courses: Vec<CourseSummary> = serde_json::from_value(value)?;
        courses
            .into_iter()
            .next()
            .ok_or_else(|| MoodleError::NotFound(format!("no course with id {course_id}")))
    }

    /// Fetch all participants of a course via `core_enrol_get_enrolled_users`.
    pub async fn get_enrolled_users(&self, course_id: i64) -> Result<Vec<EnrolledUser>> {
        let value = self
            .call(
                "core_enrol_get_enrolled_users",
                &[("courseid", course_id.to_string())],
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch a course's groups via `core_group_get_course_groups`.
    pub async fn get_course_groups(&self, course_id: i64) -> Result<Vec<CourseGroup>> {
        let value = self
            .call(
                "core_group_get_course_groups",
                &[("courseid", course_id.to_string())],
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch categories matching an id via `core_course_get_categories`.
    pub async fn get_categories_by_id(&self, category_id: i64) -> Result<Vec<Category>> {
        self.get_categories("id", category_id).await
    }

    /// Fetch the direct children of a category via `core_course_get_categories`.
    pub async fn get_categories_by_parent(&self, parent_id: i64) -> Result<Vec<Category>> {
        self.get_categories("parent", parent_id).await
    }

    async fn get_categories(&self, key: &str, value: i64) -> Result<Vec<Category>> {
        let body = self
            .call(
                "core_course_get_categories",
                &[
                    ("criteria[0][key]", key.to_string()),
                    ("criteria[0][value]", value.to_string()),
                ],
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fetch the courses belonging to a category via
    /// `core_course_get_courses_by_field`.
    pub async fn get_courses_in_category(&self, category_id: i64) -> Result<Vec<CourseSummary>> {
        let value = self
            .call(
                "core_course_get_courses_by_field",
                &[
                    ("field", "category".to_string()),
                    ("value", category_id.to_string()),
                ],
            )
            .await?;
        let response: CoursesByFieldResponse = serde_json::from_value(value)?;
        Ok(response.courses)
    }

    /// Fetch the site's role table via `local_wsgetroles_get_roles`.
    ///
    /// Requires the `wsgetroles` local plugin on the site; without it Moodle
    /// answers with an `invalidfunction` web-service error.
    pub async fn get_roles(&self) -> Result<Vec<Role>> {
        let value = self.call("local_wsgetroles_get_roles", &[]).await?;
        Ok(serde_json::from_value(value)?)
    }
}
