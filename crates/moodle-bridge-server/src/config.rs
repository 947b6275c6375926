// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

/// Webhook server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Frappe site holding the mirrored documents.
    pub frappe_url: String,
    /// Frappe API key.
    pub frappe_api_key: String,
    /// Frappe API secret.
    pub frappe_api_secret: String,
    /// Webhook listen address.
    pub http_addr: SocketAddr,
    /// Timeout for Moodle web-service requests.
    pub moodle_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `BRIDGE_FRAPPE_URL`: base URL of the Frappe site
    /// - `BRIDGE_FRAPPE_API_KEY` / `BRIDGE_FRAPPE_API_SECRET`: API credentials
    ///
    /// Optional (with defaults):
    /// - `BRIDGE_HTTP_PORT`: webhook listen port (default: 8010)
    /// - `BRIDGE_MOODLE_TIMEOUT_SECS`: Moodle request timeout (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let frappe_url = std::env::var("BRIDGE_FRAPPE_URL")
            .map_err(|_| ConfigError::Missing("BRIDGE_FRAPPE_URL"))?;
        let frappe_api_key = std::env::var("BRIDGE_FRAPPE_API_KEY")
            .map_err(|_| ConfigError::Missing("BRIDGE_FRAPPE_API_KEY"))?;
        let frappe_api_secret = std::env::var("BRIDGE_FRAPPE_API_SECRET")
            .map_err(|_| ConfigError::Missing("BRIDGE_FRAPPE_API_SECRET"))?;

        let port: u16 = std::env::var("BRIDGE_HTTP_PORT")
            .unwrap_or_else(|_| "8010".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("BRIDGE_HTTP_PORT", "must be a valid port number"))?;

        let timeout_secs: u64 = std::env::var("BRIDGE_MOODLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("BRIDGE_MOODLE_TIMEOUT_SECS", "must be a positive integer")
            })?;

        Ok(Self {
            frappe_url,
            frappe_api_key,
            frappe_api_secret,
            http_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            moodle_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
