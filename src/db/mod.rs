// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Supabase REST).

pub mod supabase;

pub use supabase::SupabaseClient;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Table names as constants.
pub mod tables {
    pub const ACTIVITY: &str = "bailey_fi_activity";
    pub const WALKS: &str = "bailey_walks";
    pub const SLEEP: &str = "bailey_fi_sleep";
    /// One row per sync invocation
    pub const SYNC_LOG: &str = "bailey_fi_sync_log";

    /// Every table the sync job reads or writes.
    pub const ALL: [&str; 4] = [ACTIVITY, WALKS, SLEEP, SYNC_LOG];
}

/// A PostgREST query parameter, e.g. `("fi_walk_id", "eq.w123")`.
pub type Filter = (String, String);

/// Equality filter on `column`.
pub fn eq(column: &str, value: impl std::fmt::Display) -> Filter {
    (column.to_string(), format!("eq.{}", value))
}

/// Row limit.
pub fn limit(n: u32) -> Filter {
    ("limit".to_string(), n.to_string())
}

/// Serialize a record into a JSON row for the destination.
pub fn to_row<T: Serialize>(record: &T) -> Result<Value> {
    Ok(serde_json::to_value(record).map_err(anyhow::Error::from)?)
}

/// Table-oriented REST sink the sync job writes to.
///
/// Every call returns the rows the backend reports as written or matched.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Insert one row (object) or several (array).
    async fn insert(&self, table: &str, rows: &Value) -> Result<Vec<Value>>;

    /// Insert, or update the existing row whose `on_conflict` column matches.
    async fn upsert(&self, table: &str, rows: &Value, on_conflict: &str) -> Result<Vec<Value>>;

    /// Rows matching all filters.
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>>;

    /// Apply `fields` to every row matching all filters.
    async fn patch(&self, table: &str, fields: &Value, filters: &[Filter]) -> Result<Vec<Value>>;
}
