// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rest/sleep row (`bailey_fi_sleep`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::source::RestPeriod;

/// Kind of rest period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepType {
    Nap,
    #[default]
    Rest,
    DeepSleep,
}

impl SleepType {
    /// Interpret a collar activity label. Unknown labels are treated as rest.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "nap" | "ongoingnap" => SleepType::Nap,
            "deepsleep" | "sleep" => SleepType::DeepSleep,
            _ => SleepType::Rest,
        }
    }
}

/// Stored sleep record. Not de-duplicated across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub date: NaiveDate,
    pub sleep_type: SleepType,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub quality_score: Option<f64>,
}

impl SleepRecord {
    pub fn from_period(date: NaiveDate, period: &RestPeriod) -> Self {
        Self {
            date,
            sleep_type: period.sleep_type,
            start_time: period.start_time,
            end_time: period.end_time,
            duration_minutes: period.duration_seconds / 60,
            quality_score: period.quality,
        }
    }
}
