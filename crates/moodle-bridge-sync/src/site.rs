// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resolution of a webhook's `moodle_url` to a configured Moodle site.
//!
//! Site credentials live in Frappe as `Moodle Instance` documents mapping a
//! site URL to its web-service token. Webhooks identify their origin with a
//! (possibly percent-encoded) URL; resolution extracts the host and matches
//! it against the configured instances.

use serde::Deserialize;
use serde_json::json;
use url::Url;

use moodle_bridge_frappe::FrappeClient;

use crate::error::{Result, SyncError};
use crate::records;

/// A resolved Moodle site: instance document name plus API credentials.
#[derive(Debug, Clone)]
pub struct SiteContext {
    /// Name of the `Moodle Instance` document.
    pub instance: String,
    /// Site host as configured (no scheme).
    pub site_url: String,
    /// Web-service token for the site.
    pub token: String,
}

impl SiteContext {
    /// Full REST web-service endpoint for the site.
    ///
    /// Configured site URLs are usually bare hosts; a URL that already
    /// carries a scheme is used as-is.
    pub fn ws_endpoint(&self) -> String {
        let base = self.site_url.trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{base}/webservice/rest/server.php")
        } else {
            format!("https://{base}/webservice/rest/server.php")
        }
    }
}

/// Extract the host from a webhook `moodle_url` value.
///
/// Accepts full URLs, percent-encoded URLs, and bare hosts (Moodle event
/// payloads are inconsistent about this).
pub fn domain_of(moodle_url: &str) -> Result<String> {
    let decoded = urlencoding::decode(moodle_url)
        .map_err(|e| SyncError::Invalid(format!("moodle_url is not valid UTF-8: {e}")))?;
    let trimmed = decoded.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SyncError::Invalid("moodle_url is empty".to_string()));
    }

    match Url::parse(trimmed) {
        Ok(url) => url
            .host_str()
            .map(|host| host.to_string())
            .ok_or_else(|| SyncError::Invalid(format!("moodle_url has no host: {moodle_url}"))),
        // Bare host without a scheme.
        Err(_) => Ok(trimmed
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_matches('/')
            .to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct InstanceRow {
    name: String,
    site_url: String,
    api_key: String,
}

/// Look up the `Moodle Instance` configured for a webhook's origin URL.
pub async fn resolve_site(frappe: &FrappeClient, moodle_url: &str) -> Result<SiteContext> {
    let domain = domain_of(moodle_url)?;
    let rows: Vec<InstanceRow> = frappe
        .list(
            records::MOODLE_INSTANCE,
            json!([["site_url", "like", format!("%{}%", domain.to_lowercase())]]),
            &["name", "site_url", "api_key"],
            1,
        )
        .await?;

    rows.into_iter()
        .next()
        .map(|row| SiteContext {
            instance: row.name,
            site_url: row.site_url,
            token: row.api_key,
        })
        .ok_or_else(|| SyncError::NotFound(format!("no Moodle Instance configured for domain: {domain}")))
}
