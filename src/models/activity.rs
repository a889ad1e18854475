// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily activity summary row (`bailey_fi_activity`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::source::DailySummary;

/// Step goal assumed when the collar reports none.
pub const DEFAULT_DAILY_GOAL_STEPS: i64 = 10_000;

/// Stored daily activity record. Unique on `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Calendar day (YYYY-MM-DD), the upsert conflict key
    pub date: NaiveDate,
    pub total_steps: i64,
    pub total_distance_meters: f64,
    pub total_calories: f64,
    pub walk_count: i64,
    pub rest_minutes: i64,
    pub nap_minutes: i64,
    pub active_minutes: i64,
    pub play_minutes: i64,
    pub daily_goal_steps: i64,
    /// `total_steps >= daily_goal_steps`
    pub goal_achieved: bool,
    /// When this row was written (RFC3339)
    pub synced_at: String,
}

impl ActivityRecord {
    /// Build the stored record for `date` from a resolved daily summary.
    pub fn from_summary(date: NaiveDate, summary: &DailySummary, synced_at: String) -> Self {
        Self {
            date,
            total_steps: summary.step_count,
            total_distance_meters: summary.distance_meters,
            total_calories: summary.calories,
            walk_count: summary.walk_count,
            rest_minutes: summary.rest_minutes,
            nap_minutes: summary.nap_minutes,
            active_minutes: summary.active_minutes,
            play_minutes: summary.play_minutes,
            daily_goal_steps: summary.goal_steps,
            goal_achieved: goal_achieved(summary.step_count, summary.goal_steps),
            synced_at,
        }
    }
}

/// Whether the step goal was met. Hitting it exactly counts.
pub fn goal_achieved(steps: i64, goal: i64) -> bool {
    steps >= goal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_goal_boundary() {
        assert!(goal_achieved(10_000, 10_000));
        assert!(goal_achieved(12_000, 10_000));
        assert!(!goal_achieved(9_999, 10_000));
    }

    #[test]
    fn test_from_summary_maps_fields() {
        let summary = DailySummary {
            step_count: 12_000,
            distance_meters: 8_500.5,
            calories: 410.0,
            walk_count: 3,
            rest_minutes: 600,
            nap_minutes: 90,
            active_minutes: 120,
            play_minutes: 15,
            goal_steps: 10_000,
        };
        let record = ActivityRecord::from_summary(day(), &summary, "2024-01-01T23:00:00Z".into());

        assert_eq!(record.total_steps, 12_000);
        assert_eq!(record.daily_goal_steps, 10_000);
        assert!(record.goal_achieved);
        assert_eq!(record.walk_count, 3);
        assert_eq!(record.play_minutes, 15);
    }

    #[test]
    fn test_default_summary_misses_goal() {
        let record =
            ActivityRecord::from_summary(day(), &DailySummary::default(), "now".to_string());
        assert_eq!(record.total_steps, 0);
        assert_eq!(record.daily_goal_steps, DEFAULT_DAILY_GOAL_STEPS);
        assert!(!record.goal_achieved);
    }

    #[test]
    fn test_serializes_date_as_plain_day() {
        let record =
            ActivityRecord::from_summary(day(), &DailySummary::default(), "now".to_string());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["goal_achieved"], false);
    }
}
