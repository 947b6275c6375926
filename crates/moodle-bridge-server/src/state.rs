// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared state for the webhook handlers.

use std::time::Duration;

use moodle_bridge_client::MoodleClient;
use moodle_bridge_frappe::FrappeClient;
use moodle_bridge_sync::SiteContext;

use crate::config::Config;

/// State shared across all webhook handlers.
///
/// The Frappe client is long-lived; Moodle clients are built per request from
/// the resolved site's endpoint and token.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Client for the Frappe site holding the mirrored documents.
    pub frappe: FrappeClient,
    /// Timeout applied to Moodle web-service requests.
    pub moodle_timeout: Duration,
    /// Server version string.
    pub version: &'static str,
}

impl AppState {
    /// Build the shared state from loaded configuration.
    pub fn new(config: &Config) -> Result<Self, moodle_bridge_frappe::FrappeError> {
        let frappe = FrappeClient::new(
            &config.frappe_url,
            &config.frappe_api_key,
            &config.frappe_api_secret,
            Duration::from_secs(30),
        )?;
        Ok(Self {
            frappe,
            moodle_timeout: config.moodle_timeout,
            version: env!("CARGO_PKG_VERSION"),
        })
    }

    /// Build a Moodle client for a resolved site.
    pub fn moodle_client(
        &self,
        site: &SiteContext,
    ) -> Result<MoodleClient, moodle_bridge_client::MoodleError> {
        MoodleClient::new(site.ws_endpoint(), &site.token, self.moodle_timeout)
    }
}
