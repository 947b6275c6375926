// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Webhook server bridging Moodle event callbacks into Frappe documents.
//!
//! Moodle sites POST event payloads here; the server resolves which
//! configured site sent the event, runs the matching sync flow, and answers
//! with the flow's `{status, message, logs}` envelope. Flow failures are part
//! of the envelope, never HTTP errors; only malformed requests are rejected
//! at the transport level.
//!
//! # Endpoints
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/moodle/events` | entity webhooks, dispatched by action suffix |
//! | `POST /api/moodle/presence` | connect/disconnect status updates |
//! | `POST /api/moodle/roles` | site-wide role table sync |
//! | `GET /health` | liveness and version |
//!
//! # Configuration
//!
//! Loaded from environment variables:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `BRIDGE_FRAPPE_URL` | Yes | - | Base URL of the Frappe site |
//! | `BRIDGE_FRAPPE_API_KEY` | Yes | - | Frappe API key |
//! | `BRIDGE_FRAPPE_API_SECRET` | Yes | - | Frappe API secret |
//! | `BRIDGE_HTTP_PORT` | No | `8010` | Webhook listen port |
//! | `BRIDGE_MOODLE_TIMEOUT_SECS` | No | `30` | Moodle request timeout |

pub mod config;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use state::AppState;
