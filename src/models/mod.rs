// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod sleep;
pub mod source;
pub mod sync_run;
pub mod walk;

pub use activity::ActivityRecord;
pub use sleep::{SleepRecord, SleepType};
pub use source::{DailySummary, RestPeriod, Subject, WalkEntry};
pub use sync_run::{SyncRun, SyncRunCompletion, SyncStatus, SyncType};
pub use walk::WalkRecord;
