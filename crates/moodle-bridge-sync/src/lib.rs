// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Entity sync flows mirroring Moodle records into Frappe documents.
//!
//! Each flow is a stateless, single-request sequence: resolve the configured
//! site, read from Moodle's web-service API, upsert the mirrored Frappe
//! documents, and return a [`report::SyncReport`] describing the outcome.
//! Flows never panic on remote failures; errors are folded into the report
//! and the accumulated log trail is flushed to Frappe's Error Log, matching
//! the audit behavior of the scripts this service replaces.
//!
//! # Flows
//!
//! | Flow | Mirrors |
//! |------|---------|
//! | [`users::sync_user`] | one user by Moodle id |
//! | [`courses::sync_course`] | a course, its groups, and its enrolment |
//! | [`categories::sync_category`] | a category, its children, and its courses' links |
//! | [`roles::sync_roles`] | the site-wide role table |
//! | [`presence::update_connection_status`] | a user's connect/disconnect state |

pub mod categories;
pub mod courses;
pub mod error;
pub mod presence;
pub mod records;
pub mod report;
pub mod roles;
pub mod site;
pub mod users;

pub use error::{Result, SyncError};
pub use report::{SyncReport, SyncStatus};
pub use site::SiteContext;
