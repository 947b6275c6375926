// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Webhook routes and dispatch.
//!
//! Entity webhooks land on a single endpoint and are routed by the suffix of
//! their `action` string (`user_created`, `course_updated`, …): `*_user` runs
//! the user flow, `*_course` the course flow, `*_category` the category flow.
//! Each entity kind reads its id from a different payload key, mirroring what
//! the Moodle event observers send.

use std::collections::HashMap;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use moodle_bridge_sync::{SyncReport, categories, courses, presence, roles, site, users};

use crate::state::AppState;

/// Build the webhook router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/moodle/events", post(handle_event))
        .route("/api/moodle/presence", post(handle_presence))
        .route("/api/moodle/roles", post(handle_roles))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "version": state.version }))
}

/// Entity webhook payload. Moodle event observers send the entity id under a
/// key that depends on the event family, so unknown keys are collected and
/// looked up after the action is classified.
#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    moodle_url: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Copy)]
enum EntityKind {
    User,
    Course,
    Category,
}

impl EntityKind {
    fn from_action(action: &str) -> Option<Self> {
        if action.ends_with("_user") {
            Some(Self::User)
        } else if action.ends_with("_course") {
            Some(Self::Course)
        } else if action.ends_with("_category") {
            Some(Self::Category)
        } else {
            None
        }
    }

    fn payload_key(self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::Course => "course_id",
            Self::Category => "object_id",
        }
    }

    fn flow_name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Course => "course",
            Self::Category => "category",
        }
    }
}

/// Read a numeric entity id that may arrive as a JSON number or string.
fn entity_id(extra: &HashMap<String, Value>, key: &str) -> Option<i64> {
    match extra.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

async fn handle_event(
    State(state): State<AppState>,
    Json(payload): Json<EventPayload>,
) -> Json<SyncReport> {
    let mut trail = Vec::new();

    let Some(moodle_url) = payload.moodle_url.as_deref().filter(|u| !u.is_empty()) else {
        return Json(SyncReport::error("missing 'moodle_url' in payload", trail));
    };
    let Some(action) = payload.action.as_deref().filter(|a| !a.is_empty()) else {
        return Json(SyncReport::error("missing 'action' in payload", trail));
    };

    if let Ok(domain) = site::domain_of(moodle_url) {
        trail.push(format!("Detected domain {domain}."));
    }

    let resolved = match site::resolve_site(&state.frappe, moodle_url).await {
        Ok(site) => site,
        Err(err) => {
            trail.push(format!("[ERROR] {err}"));
            return Json(SyncReport::error(err.to_string(), trail));
        }
    };
    trail.push(format!(
        "Matched Moodle instance {} ({}).",
        resolved.instance, resolved.site_url
    ));

    let Some(kind) = EntityKind::from_action(action) else {
        trail.push(format!("[ERROR] unrecognized action '{action}'."));
        return Json(SyncReport::error(
            format!("unrecognized action: '{action}'"),
            trail,
        ));
    };
    let Some(id) = entity_id(&payload.extra, kind.payload_key()) else {
        let key = kind.payload_key();
        trail.push(format!("[ERROR] missing '{key}' in payload."));
        return Json(SyncReport::error(format!("missing '{key}' in payload"), trail));
    };

    info!(action, kind = kind.flow_name(), id, instance = %resolved.instance, "dispatching webhook");
    trail.push(format!(
        "Dispatching '{action}' to the {} flow (id {id}).",
        kind.flow_name()
    ));

    let moodle = match state.moodle_client(&resolved) {
        Ok(client) => client,
        Err(err) => {
            trail.push(format!("[ERROR] {err}"));
            return Json(SyncReport::error(err.to_string(), trail));
        }
    };

    let report = match kind {
        EntityKind::User => users::sync_user(&state.frappe, &resolved, &moodle, id).await,
        EntityKind::Course => courses::sync_course(&state.frappe, &resolved, &moodle, id).await,
        EntityKind::Category => {
            categories::sync_category(&state.frappe, &resolved, &moodle, id).await
        }
    };

    Json(report.with_preamble(trail))
}

/// Presence webhook payload (login/logout events).
#[derive(Debug, Deserialize)]
struct PresencePayload {
    #[serde(default)]
    moodle_url: Option<String>,
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    action: Option<String>,
}

async fn handle_presence(
    State(state): State<AppState>,
    Json(payload): Json<PresencePayload>,
) -> Json<SyncReport> {
    let (Some(moodle_url), Some(action)) = (
        payload.moodle_url.as_deref().filter(|u| !u.is_empty()),
        payload.action.as_deref().filter(|a| !a.is_empty()),
    ) else {
        return Json(SyncReport::error(
            "insufficient parameters: 'moodle_url', 'user_id', and 'action' are required",
            Vec::new(),
        ));
    };
    let user_id = match payload.user_id.as_ref() {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    let Some(user_id) = user_id else {
        return Json(SyncReport::error(
            "insufficient parameters: 'moodle_url', 'user_id', and 'action' are required",
            Vec::new(),
        ));
    };

    info!(user_id, action, "presence webhook");
    Json(presence::update_connection_status(&state.frappe, moodle_url, user_id, action).await)
}

/// Role sync payload.
#[derive(Debug, Deserialize)]
struct RolesPayload {
    #[serde(default)]
    moodle_url: Option<String>,
}

async fn handle_roles(
    State(state): State<AppState>,
    Json(payload): Json<RolesPayload>,
) -> Json<SyncReport> {
    let Some(moodle_url) = payload.moodle_url.as_deref().filter(|u| !u.is_empty()) else {
        return Json(SyncReport::error(
            "missing 'moodle_url' in payload",
            Vec::new(),
        ));
    };

    let resolved = match site::resolve_site(&state.frappe, moodle_url).await {
        Ok(site) => site,
        Err(err) => return Json(SyncReport::error(err.to_string(), Vec::new())),
    };
    let moodle = match state.moodle_client(&resolved) {
        Ok(client) => client,
        Err(err) => return Json(SyncReport::error(err.to_string(), Vec::new())),
    };

    info!(instance = %resolved.instance, "role sync webhook");
    Json(roles::sync_roles(&state.frappe, &resolved, &moodle).await)
}
