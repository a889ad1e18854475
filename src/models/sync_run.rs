// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync log row (`bailey_fi_sync_log`).
//!
//! One row per non-dry-run invocation: inserted as `running` when the job
//! starts and patched once with the outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What triggered the sync. Only used as a log label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    #[default]
    Manual,
    Auto,
    Cron,
}

impl fmt::Display for SyncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncType::Manual => "manual",
            SyncType::Auto => "auto",
            SyncType::Cron => "cron",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Running,
    Success,
    Failed,
}

/// Sync log record, as inserted. The row ID is assigned by the database and
/// read back from the insert response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncRun {
    pub sync_type: SyncType,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub status: SyncStatus,
    pub records_synced: u64,
    pub error_message: Option<String>,
}

impl SyncRun {
    /// A freshly started run.
    pub fn started(sync_type: SyncType, started_at: String) -> Self {
        Self {
            sync_type,
            started_at,
            completed_at: None,
            status: SyncStatus::Running,
            records_synced: 0,
            error_message: None,
        }
    }
}

/// Fields patched onto the sync log row when the run ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncRunCompletion {
    pub completed_at: String,
    pub status: SyncStatus,
    pub records_synced: u64,
    pub error_message: Option<String>,
}

impl SyncRunCompletion {
    pub fn success(completed_at: String, records_synced: u64) -> Self {
        Self {
            completed_at,
            status: SyncStatus::Success,
            records_synced,
            error_message: None,
        }
    }

    pub fn failed(completed_at: String, records_synced: u64, error: String) -> Self {
        Self {
            completed_at,
            status: SyncStatus::Failed,
            records_synced,
            error_message: Some(error),
        }
    }
}
