// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase (PostgREST) client.
//!
//! Talks to `{project_url}/rest/v1/{table}` with the project API key sent as
//! both the `apikey` header and a bearer token. Writes ask for
//! `return=representation` so callers get the stored rows back (the sync log
//! needs the generated `id`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use crate::db::{Destination, Filter};
use crate::error::{Result, SyncError};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PREFER_RETURN: &str = "return=representation";
const PREFER_MERGE: &str = "resolution=merge-duplicates,return=representation";

/// Supabase REST client.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    rest_url: String,
}

impl SupabaseClient {
    /// Create a client for the project at `project_url`.
    pub fn new(project_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| SyncError::Destination("API key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| SyncError::Destination("API key is not a valid header value".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SyncError::Destination(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            rest_url: rest_url(project_url),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    /// Send a request and parse the returned rows.
    async fn send_rows(&self, request: reqwest::RequestBuilder) -> Result<Vec<Value>> {
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Destination(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Destination(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            if status.as_u16() == 401 {
                tracing::warn!("Supabase rejected the API key (401)");
            }
            return Err(SyncError::Destination(format!("HTTP {}: {}", status, body)));
        }

        parse_rows(&body)
    }
}

#[async_trait]
impl Destination for SupabaseClient {
    async fn insert(&self, table: &str, rows: &Value) -> Result<Vec<Value>> {
        let request = self
            .http
            .post(self.table_url(table))
            .header("Prefer", PREFER_RETURN)
            .json(rows);
        self.send_rows(request).await
    }

    async fn upsert(&self, table: &str, rows: &Value, on_conflict: &str) -> Result<Vec<Value>> {
        let request = self
            .http
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", PREFER_MERGE)
            .json(rows);
        self.send_rows(request).await
    }

    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>> {
        let request = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(filters);
        self.send_rows(request).await
    }

    async fn patch(&self, table: &str, fields: &Value, filters: &[Filter]) -> Result<Vec<Value>> {
        let request = self
            .http
            .patch(self.table_url(table))
            .query(filters)
            .header("Prefer", PREFER_RETURN)
            .json(fields);
        self.send_rows(request).await
    }
}

/// REST endpoint root for a project URL.
fn rest_url(project_url: &str) -> String {
    format!("{}/rest/v1", project_url.trim_end_matches('/'))
}

/// Normalize a PostgREST response body into a list of rows.
///
/// An empty body (e.g. `return=minimal`) yields no rows; a single object is
/// treated as one row.
fn parse_rows(body: &str) -> Result<Vec<Value>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SyncError::Destination(format!("JSON parse error: {}", e)))?;
    match value {
        Value::Array(rows) => Ok(rows),
        Value::Object(_) => Ok(vec![value]),
        Value::Null => Ok(Vec::new()),
        other => Err(SyncError::Internal(anyhow::anyhow!(
            "Unexpected Supabase response: {}",
            other
        ))),
    }
}
