// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP client for a Frappe site's resource API.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{FrappeError, Result};

/// Client for one Frappe site, authenticated with an API key/secret pair.
#[derive(Clone)]
pub struct FrappeClient {
    http: reqwest::Client,
    base_url: String,
    auth: String,
}

// The auth header carries the API secret; keep it out of Debug output.
impl fmt::Debug for FrappeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrappeClient")
            .field("base_url", &self.base_url)
            .field("auth", &"<redacted>")
            .finish()
    }
}

impl FrappeClient {
    /// Create a client for the given site URL and API credentials.
    pub fn new(
        base_url: impl Into<String>,
        api_key: &str,
        api_secret: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            auth: format!("token {api_key}:{api_secret}"),
        })
    }

    fn resource_url(&self, doctype: &str, name: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/resource/{}",
            self.base_url,
            urlencoding::encode(doctype)
        );
        if let Some(name) = name {
            url.push('/');
            url.push_str(&urlencoding::encode(name));
        }
        url
    }

    /// Consume a response, unwrapping Frappe's `{"data": …}` envelope.
    async fn read_data(
        &self,
        response: reqwest::Response,
        doctype: &str,
        name: Option<&str>,
    ) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() == 404 {
            if let Some(name) = name {
                return Err(FrappeError::NotFound {
                    doctype: doctype.to_string(),
                    name: name.to_string(),
                });
            }
        }
        if !status.is_success() {
            return Err(FrappeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = serde_json::from_str(&body)?;
        Ok(envelope.get("data").cloned().unwrap_or(Value::Null))
    }

    /// List documents of a doctype with Frappe filter expressions.
    ///
    /// `filters` is the usual `[["field", "op", "value"], …]` array; `fields`
    /// selects the returned columns (`["*"]` for whole documents).
    pub async fn list<T: DeserializeOwned>(
        &self,
        doctype: &str,
        filters: Value,
        fields: &[&str],
        limit: u32,
    ) -> Result<Vec<T>> {
        debug!(doctype, %filters, "listing Frappe documents");
        let response = self
            .http
            .get(self.resource_url(doctype, None))
            .header("Authorization", &self.auth)
            .query(&[
                ("filters", filters.to_string()),
                ("fields", json!(fields).to_string()),
                ("limit_page_length", limit.to_string()),
            ])
            .send()
            .await?;
        let data = self.read_data(response, doctype, None).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Fetch one document by name.
    pub async fn get<T: DeserializeOwned>(&self, doctype: &str, name: &str) -> Result<T> {
        let response = self
            .http
            .get(self.resource_url(doctype, Some(name)))
            .header("Authorization", &self.auth)
            .send()
            .await?;
        let data = self.read_data(response, doctype, Some(name)).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Check whether a named document exists.
    pub async fn exists(&self, doctype: &str, name: &str) -> Result<bool> {
        match self.get::<Value>(doctype, name).await {
            Ok(_) => Ok(true),
            Err(FrappeError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Insert a new document.
    pub async fn insert(&self, doctype: &str, doc: &Value) -> Result<Value> {
        debug!(doctype, "inserting Frappe document");
        let response = self
            .http
            .post(self.resource_url(doctype, None))
            .header("Authorization", &self.auth)
            .json(doc)
            .send()
            .await?;
        self.read_data(response, doctype, None).await
    }

    /// Update fields on an existing document.
    pub async fn update(&self, doctype: &str, name: &str, patch: &Value) -> Result<Value> {
        debug!(doctype, name, "updating Frappe document");
        let response = self
            .http
            .put(self.resource_url(doctype, Some(name)))
            .header("Authorization", &self.auth)
            .json(patch)
            .send()
            .await?;
        self.read_data(response, doctype, Some(name)).await
    }

    /// Update the named document when it exists, insert it otherwise.
    ///
    /// On insert the computed `name` is written into the document so Frappe
    /// keeps the caller's identifier instead of generating one.
    pub async fn upsert(&self, doctype: &str, name: &str, doc: &Value) -> Result<Value> {
        if self.exists(doctype, name).await? {
            self.update(doctype, name, doc).await
        } else {
            let mut doc = doc.clone();
            if let Some(obj) = doc.as_object_mut() {
                obj.insert("name".to_string(), json!(name));
            }
            self.insert(doctype, &doc).await
        }
    }

    /// Set a single field on a document.
    pub async fn set_value(
        &self,
        doctype: &str,
        name: &str,
        field: &str,
        value: Value,
    ) -> Result<()> {
        self.update(doctype, name, &json!({ field: value })).await?;
        Ok(())
    }

    /// Record an entry in Frappe's Error Log, best-effort.
    ///
    /// Sync flows call this on both completion and failure to leave the same
    /// audit trail the in-process scripts left; a logging failure must never
    /// mask the flow's own outcome.
    pub async fn log_error(&self, title: &str, message: &str) {
        let doc = json!({ "method": title, "error": message });
        if let Err(err) = self.insert("Error Log", &doc).await {
            warn!(error = %err, title, "failed to record Error Log entry");
        }
    }
}
