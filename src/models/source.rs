// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Records returned by the collar data source.
//!
//! Every field here is already resolved: the Fi client fills in defaults
//! when it converts raw API responses, so sync logic never has to check for
//! missing values.

use chrono::{DateTime, Utc};

use crate::models::activity::DEFAULT_DAILY_GOAL_STEPS;
use crate::models::sleep::SleepType;

/// A pet visible to the authenticated account.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: String,
    pub name: String,
}

/// One day's activity totals.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub step_count: i64,
    pub distance_meters: f64,
    pub calories: f64,
    pub walk_count: i64,
    pub rest_minutes: i64,
    pub nap_minutes: i64,
    pub active_minutes: i64,
    pub play_minutes: i64,
    /// Daily step goal
    pub goal_steps: i64,
}

impl Default for DailySummary {
    fn default() -> Self {
        Self {
            step_count: 0,
            distance_meters: 0.0,
            calories: 0.0,
            walk_count: 0,
            rest_minutes: 0,
            nap_minutes: 0,
            active_minutes: 0,
            play_minutes: 0,
            goal_steps: DEFAULT_DAILY_GOAL_STEPS,
        }
    }
}

/// A single walk recorded by the collar.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WalkEntry {
    /// Fi walk ID; `None` when the API omitted it
    pub id: Option<String>,
    pub duration_seconds: i64,
    pub steps: i64,
    pub distance_meters: f64,
    pub calories: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub avg_speed: f64,
    /// Place name, "Unknown" when the API had none
    pub location: String,
}

/// A rest, nap, or sleep period.
#[derive(Debug, Clone, PartialEq)]
pub struct RestPeriod {
    pub sleep_type: SleepType,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
    pub quality: Option<f64>,
}
