// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! REST client for the Frappe/ERPNext document API.
//!
//! The bridge runs outside the Frappe process, so every document operation
//! goes through Frappe's public resource API:
//!
//! | Method | HTTP call |
//! |--------|-----------|
//! | [`FrappeClient::list`] | `GET /api/resource/{doctype}?filters=…&fields=…` |
//! | [`FrappeClient::get`] | `GET /api/resource/{doctype}/{name}` |
//! | [`FrappeClient::insert`] | `POST /api/resource/{doctype}` |
//! | [`FrappeClient::update`] | `PUT /api/resource/{doctype}/{name}` |
//! | [`FrappeClient::upsert`] | update when the named doc exists, insert otherwise |
//! | [`FrappeClient::set_value`] | single-field `PUT` |
//! | [`FrappeClient::log_error`] | best-effort `Error Log` insert |
//!
//! Requests authenticate with an API key/secret pair in the
//! `Authorization: token {key}:{secret}` header. Response bodies arrive
//! wrapped in Frappe's `{"data": …}` envelope and are unwrapped here.

pub mod client;
pub mod error;

pub use client::FrappeClient;
pub use error::{FrappeError, Result};
