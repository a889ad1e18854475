// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fi → Supabase sync job.
//!
//! Handles the core workflow:
//! 1. Open a sync log row (`running`)
//! 2. Log in to Fi and find the configured pet
//! 3. For each day in the window: upsert the activity summary, insert new
//!    walks, insert rest periods
//! 4. Close the sync log row with the outcome and record count
//! 5. Log out of Fi, whatever happened

use std::collections::HashSet;

use chrono::{Local, NaiveDate, Utc};
use serde_json::Value;

use crate::config::Config;
use crate::db::{self, tables, Destination};
use crate::error::{Result, SyncError};
use crate::models::{
    ActivityRecord, SleepRecord, Subject, SyncRun, SyncRunCompletion, SyncType, WalkRecord,
};
use crate::services::fi::DeviceSource;
use crate::time_utils::{format_utc_rfc3339, sync_window, window_start};

/// Conflict column for the daily activity upsert.
const ACTIVITY_CONFLICT_KEY: &str = "date";

/// Per-kind counters for one run.
///
/// In dry-run mode the write counters hold what would have been written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub activities: u64,
    pub walks: u64,
    pub sleep_records: u64,
    /// Walks already present in the destination
    pub skipped: u64,
    /// Records or days dropped because of a recoverable error
    pub failed: u64,
}

impl SyncStats {
    /// Records written (the sync log's `records_synced`).
    pub fn total(&self) -> u64 {
        self.activities + self.walks + self.sleep_records
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Sync log row ID; `None` in dry-run mode
    pub run_id: Option<String>,
    pub stats: SyncStats,
    pub dry_run: bool,
}

/// What happened to a single walk.
enum WalkOutcome {
    Inserted,
    AlreadyExists,
}

/// Syncs one pet's collar data into the destination tables.
pub struct SyncJob<S, D> {
    source: S,
    destination: D,
    config: Config,
}

impl<S, D> SyncJob<S, D>
where
    S: DeviceSource,
    D: Destination,
{
    pub fn new(source: S, destination: D, config: Config) -> Self {
        Self {
            source,
            destination,
            config,
        }
    }

    /// Run the sync over the window ending today (local time).
    pub async fn run(&self, sync_type: SyncType) -> Result<SyncReport> {
        self.run_for(Local::now().date_naive(), sync_type).await
    }

    /// Run the sync over the window ending at `today`.
    pub async fn run_for(&self, today: NaiveDate, sync_type: SyncType) -> Result<SyncReport> {
        let dry_run = self.config.dry_run;

        let run_id = if dry_run {
            None
        } else {
            Some(self.start_run(sync_type).await?)
        };

        tracing::info!(
            sync_type = %sync_type,
            days = self.config.sync_days,
            dry_run,
            "Sync started"
        );

        let mut stats = SyncStats::default();
        let outcome = self.sync_with_session(today, &mut stats).await;

        if let Some(id) = &run_id {
            let completed_at = format_utc_rfc3339(Utc::now());
            let completion = match &outcome {
                Ok(()) => SyncRunCompletion::success(completed_at, stats.total()),
                Err(e) => SyncRunCompletion::failed(completed_at, stats.total(), e.to_string()),
            };
            if let Err(e) = self.finish_run(id, &completion).await {
                tracing::warn!(error = %e, run_id = %id, "Failed to record sync outcome");
            }
        }

        match outcome {
            Ok(()) => {
                tracing::info!(
                    activities = stats.activities,
                    walks = stats.walks,
                    sleep_records = stats.sleep_records,
                    skipped = stats.skipped,
                    failed = stats.failed,
                    total = stats.total(),
                    dry_run,
                    "Sync complete"
                );
                Ok(SyncReport {
                    run_id,
                    stats,
                    dry_run,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Sync failed");
                Err(e)
            }
        }
    }

    // ─── Sync Log ────────────────────────────────────────────────────────────

    /// Insert the `running` sync log row and return its ID.
    async fn start_run(&self, sync_type: SyncType) -> Result<String> {
        let run = SyncRun::started(sync_type, format_utc_rfc3339(Utc::now()));
        let rows = self
            .destination
            .insert(tables::SYNC_LOG, &db::to_row(&run)?)
            .await?;

        rows.first()
            .and_then(|row| row.get("id"))
            .and_then(row_id)
            .ok_or_else(|| {
                SyncError::Internal(anyhow::anyhow!("Sync log insert returned no id"))
            })
    }

    async fn finish_run(&self, run_id: &str, completion: &SyncRunCompletion) -> Result<()> {
        self.destination
            .patch(
                tables::SYNC_LOG,
                &db::to_row(completion)?,
                &[db::eq("id", run_id)],
            )
            .await
            .map_err(|e| SyncError::RunLog(e.to_string()))?;
        Ok(())
    }

    // ─── Source Session ──────────────────────────────────────────────────────

    /// Log in, sync every day, and always log out again.
    async fn sync_with_session(&self, today: NaiveDate, stats: &mut SyncStats) -> Result<()> {
        let session = self
            .source
            .authenticate(&self.config.fi_email, &self.config.fi_password)
            .await
            .map_err(|e| match e {
                SyncError::Authentication(_) => e,
                other => SyncError::Authentication(other.to_string()),
            })?;

        let result = self.sync_days(&session, today, stats).await;

        if let Err(e) = self.source.logout(session).await {
            tracing::debug!(error = %e, "Fi logout failed (ignored)");
        }

        result
    }

    async fn sync_days(
        &self,
        session: &S::Session,
        today: NaiveDate,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let subjects = self.source.list_subjects(session).await?;
        let subject = find_subject(subjects, &self.config.pet_name)?;
        tracing::info!(pet = %subject.name, "Found pet");

        if let Some(first) = window_start(today, self.config.sync_days) {
            tracing::info!(from = %first, to = %today, "Syncing date window");
        }

        // Walk IDs written (or, in a dry run, planned) so far this run
        let mut seen_walks = HashSet::new();

        for date in sync_window(today, self.config.sync_days) {
            let result = self.sync_activity(session, &subject, date, stats).await;
            recover(result, stats)?;

            let result = self
                .sync_walks(session, &subject, date, &mut seen_walks, stats)
                .await;
            recover(result, stats)?;

            let result = self.sync_sleep(session, &subject, date, stats).await;
            recover(result, stats)?;
        }

        Ok(())
    }

    // ─── Per-Day Sections ────────────────────────────────────────────────────

    async fn sync_activity(
        &self,
        session: &S::Session,
        subject: &Subject,
        date: NaiveDate,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let Some(summary) = self
            .source
            .get_daily_activity(session, subject, date)
            .await?
        else {
            tracing::info!(date = %date, "No activity data for day");
            return Ok(());
        };

        let record = ActivityRecord::from_summary(date, &summary, format_utc_rfc3339(Utc::now()));

        if self.config.dry_run {
            tracing::info!(date = %date, record = ?record, "[DRY RUN] Would upsert activity");
        } else {
            self.destination
                .upsert(
                    tables::ACTIVITY,
                    &db::to_row(&record)?,
                    ACTIVITY_CONFLICT_KEY,
                )
                .await
                .map_err(|e| record_error("activity", date, e))?;
            tracing::info!(
                date = %date,
                steps = record.total_steps,
                goal_achieved = record.goal_achieved,
                "Activity synced"
            );
        }
        stats.activities += 1;
        Ok(())
    }

    async fn sync_walks(
        &self,
        session: &S::Session,
        subject: &Subject,
        date: NaiveDate,
        seen_walks: &mut HashSet<String>,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let walks = self.source.get_walks(session, subject, date).await?;

        for walk in &walks {
            let result = match WalkRecord::from_entry(date, walk) {
                Some(record) => self.sync_walk(&record, seen_walks).await,
                None => Err(SyncError::Record {
                    kind: "walk",
                    date: date.to_string(),
                    message: "walk has no Fi ID".to_string(),
                }),
            };

            match result {
                Ok(WalkOutcome::Inserted) => stats.walks += 1,
                Ok(WalkOutcome::AlreadyExists) => stats.skipped += 1,
                Err(e) => recover(Err(e), stats)?,
            }
        }
        Ok(())
    }

    /// Insert a walk unless one with the same Fi ID is already stored or was
    /// already handled earlier in this run.
    async fn sync_walk(
        &self,
        record: &WalkRecord,
        seen_walks: &mut HashSet<String>,
    ) -> Result<WalkOutcome> {
        let date = record.date;
        if seen_walks.contains(&record.external_walk_id) {
            tracing::info!(walk_id = %record.external_walk_id, "Walk already synced this run");
            return Ok(WalkOutcome::AlreadyExists);
        }

        let existing = self
            .destination
            .select(
                tables::WALKS,
                &[db::eq(
                    WalkRecord::EXTERNAL_ID_COLUMN,
                    &record.external_walk_id,
                )],
            )
            .await
            .map_err(|e| record_error("walk", date, e))?;

        if !existing.is_empty() {
            tracing::info!(walk_id = %record.external_walk_id, "Walk already exists");
            return Ok(WalkOutcome::AlreadyExists);
        }

        if self.config.dry_run {
            tracing::info!(date = %date, record = ?record, "[DRY RUN] Would insert walk");
        } else {
            self.destination
                .insert(tables::WALKS, &db::to_row(record)?)
                .await
                .map_err(|e| record_error("walk", date, e))?;
            tracing::info!(
                walk_id = %record.external_walk_id,
                minutes = record.duration_minutes,
                steps = record.steps,
                "Walk synced"
            );
        }
        seen_walks.insert(record.external_walk_id.clone());
        Ok(WalkOutcome::Inserted)
    }

    /// Rest periods are inserted without a duplicate check; re-running over
    /// the same day stores them again.
    async fn sync_sleep(
        &self,
        session: &S::Session,
        subject: &Subject,
        date: NaiveDate,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let periods = self.source.get_sleep(session, subject, date).await?;

        for period in &periods {
            let record = SleepRecord::from_period(date, period);

            if self.config.dry_run {
                tracing::info!(date = %date, record = ?record, "[DRY RUN] Would insert sleep");
                stats.sleep_records += 1;
                continue;
            }

            let result = match db::to_row(&record) {
                Ok(row) => self
                    .destination
                    .insert(tables::SLEEP, &row)
                    .await
                    .map_err(|e| record_error("sleep", date, e)),
                Err(e) => Err(e),
            };

            match result {
                Ok(_) => {
                    stats.sleep_records += 1;
                    tracing::info!(
                        date = %date,
                        sleep_type = ?record.sleep_type,
                        minutes = record.duration_minutes,
                        "Sleep synced"
                    );
                }
                Err(e) => recover(Err(e), stats)?,
            }
        }
        Ok(())
    }
}

/// Pick the pet whose name matches `name`, ignoring case.
pub fn find_subject(subjects: Vec<Subject>, name: &str) -> Result<Subject> {
    let wanted = name.to_lowercase();
    let available: Vec<String> = subjects.iter().map(|s| s.name.clone()).collect();

    subjects
        .into_iter()
        .find(|s| s.name.to_lowercase() == wanted)
        .ok_or_else(|| SyncError::SubjectNotFound {
            name: name.to_string(),
            available,
        })
}

/// Let fatal errors through; log and count the rest.
fn recover(result: Result<()>, stats: &mut SyncStats) -> Result<()> {
    match result {
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping record");
            stats.failed += 1;
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}

fn record_error(kind: &'static str, date: NaiveDate, err: SyncError) -> SyncError {
    SyncError::Record {
        kind,
        date: date.to_string(),
        message: err.to_string(),
    }
}

/// Render a row ID (numeric or UUID) for use in a filter.
fn row_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
