// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Walk row (`bailey_walks`).
//!
//! The walks table is shared with manually logged walks, so Fi-sourced rows
//! carry the Fi walk ID and a `synced_from_fi` flag.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::source::WalkEntry;

/// Note attached to every walk written by the sync job.
pub const WALK_SYNC_NOTE: &str = "Synced from Fi collar";

/// Stored walk record. Written at most once per `external_walk_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkRecord {
    #[serde(rename = "fi_walk_id")]
    pub external_walk_id: String,
    pub date: NaiveDate,
    pub duration_minutes: i64,
    pub steps: i64,
    pub distance_meters: f64,
    pub calories: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "avg_speed_mph")]
    pub avg_speed: f64,
    pub location: String,
    pub notes: String,
    #[serde(rename = "synced_from_fi")]
    pub synced_from_source: bool,
}

impl WalkRecord {
    /// Column holding the external walk ID, used for the existence check.
    pub const EXTERNAL_ID_COLUMN: &'static str = "fi_walk_id";

    /// Map a collar walk to a stored record.
    ///
    /// Returns `None` when the walk has no ID, since such a walk could not be
    /// de-duplicated on later runs.
    pub fn from_entry(date: NaiveDate, walk: &WalkEntry) -> Option<Self> {
        let external_walk_id = walk.id.clone().filter(|id| !id.is_empty())?;
        Some(Self {
            external_walk_id,
            date,
            duration_minutes: walk.duration_seconds / 60,
            steps: walk.steps,
            distance_meters: walk.distance_meters,
            calories: walk.calories,
            start_time: walk.start_time,
            end_time: walk.end_time,
            avg_speed: walk.avg_speed,
            location: walk.location.clone(),
            notes: WALK_SYNC_NOTE.to_string(),
            synced_from_source: true,
        })
    }
}
