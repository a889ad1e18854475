// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory stand-ins for the Fi API and Supabase.

use async_trait::async_trait;
use chrono::NaiveDate;
use fi_sync::config::Config;
use fi_sync::db::{Destination, Filter};
use fi_sync::models::{DailySummary, RestPeriod, Subject, WalkEntry};
use fi_sync::services::DeviceSource;
use fi_sync::{Result, SyncError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Parse a `YYYY-MM-DD` date.
#[allow(dead_code)]
pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Config pointing nowhere, with the given window.
#[allow(dead_code)]
pub fn test_config(days: u32) -> Config {
    Config {
        sync_days: days,
        ..Config::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Destination
// ─────────────────────────────────────────────────────────────────────────────

/// A destination call, recorded in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Insert(String),
    Upsert { table: String, on_conflict: String },
    Select(String),
    Patch(String),
}

#[derive(Default)]
struct DbState {
    tables: HashMap<String, Vec<Value>>,
    calls: Vec<Call>,
    next_id: u64,
    failing_inserts: HashSet<String>,
    missing_tables: HashSet<String>,
    fail_patch: bool,
}

/// Table store that behaves like PostgREST for the calls the job makes.
#[derive(Clone, Default)]
pub struct MemoryDestination {
    state: Arc<Mutex<DbState>>,
}

#[allow(dead_code)]
impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a row.
    pub fn seed(&self, table: &str, row: Value) {
        let mut state = self.state.lock().unwrap();
        state.tables.entry(table.to_string()).or_default().push(row);
    }

    /// Make every insert into `table` fail.
    pub fn fail_inserts_into(&self, table: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_inserts.insert(table.to_string());
    }

    /// Make selects against `table` fail as if it did not exist.
    pub fn drop_table(&self, table: &str) {
        let mut state = self.state.lock().unwrap();
        state.missing_tables.insert(table.to_string());
    }

    pub fn fail_patches(&self) {
        self.state.lock().unwrap().fail_patch = true;
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that would change data.
    pub fn write_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Select(_)))
            .collect()
    }
}

fn rendered(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches_filters(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|(column, expr)| match expr.strip_prefix("eq.") {
        Some(expected) => row.get(column).map(rendered).as_deref() == Some(expected),
        None => true,
    })
}

fn as_rows(rows: &Value) -> Vec<Value> {
    match rows {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

#[async_trait]
impl Destination for MemoryDestination {
    async fn insert(&self, table: &str, rows: &Value) -> Result<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Insert(table.to_string()));
        if state.failing_inserts.contains(table) {
            return Err(SyncError::Destination("HTTP 500: insert failed".to_string()));
        }

        let mut written = Vec::new();
        for mut row in as_rows(rows) {
            state.next_id += 1;
            let id = state.next_id;
            if let Value::Object(map) = &mut row {
                map.entry("id").or_insert(Value::from(id));
            }
            written.push(row);
        }
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(written.iter().cloned());
        Ok(written)
    }

    async fn upsert(&self, table: &str, rows: &Value, on_conflict: &str) -> Result<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Upsert {
            table: table.to_string(),
            on_conflict: on_conflict.to_string(),
        });

        let mut written = Vec::new();
        for row in as_rows(rows) {
            let key = row.get(on_conflict).cloned();
            let stored = state.tables.entry(table.to_string()).or_default();
            match stored
                .iter_mut()
                .find(|r| key.is_some() && r.get(on_conflict) == key.as_ref())
            {
                Some(existing) => *existing = row.clone(),
                None => stored.push(row.clone()),
            }
            written.push(row);
        }
        Ok(written)
    }

    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Select(table.to_string()));
        if state.missing_tables.contains(table) {
            return Err(SyncError::Destination(format!(
                "HTTP 404: relation \"{}\" does not exist",
                table
            )));
        }

        Ok(state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches_filters(r, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn patch(&self, table: &str, fields: &Value, filters: &[Filter]) -> Result<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Patch(table.to_string()));
        if state.fail_patch {
            return Err(SyncError::Destination("HTTP 503: unavailable".to_string()));
        }

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches_filters(r, filters)) {
                if let (Value::Object(target), Value::Object(patch)) = (&mut *row, fields) {
                    for (k, v) in patch {
                        target.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Source
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SourceState {
    pets: Vec<Subject>,
    activity: HashMap<NaiveDate, DailySummary>,
    walks: HashMap<NaiveDate, Vec<WalkEntry>>,
    sleep: HashMap<NaiveDate, Vec<RestPeriod>>,
    reject_login: bool,
    session_expires_on: Option<NaiveDate>,
    failing_walk_dates: HashSet<NaiveDate>,
    logins: usize,
    logouts: usize,
    reads: usize,
}

/// Scripted Fi account.
#[derive(Clone, Default)]
pub struct FakeSource {
    state: Arc<Mutex<SourceState>>,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn with_pets(names: &[&str]) -> Self {
        let source = Self::default();
        source.state.lock().unwrap().pets = names
            .iter()
            .enumerate()
            .map(|(i, name)| Subject {
                id: format!("pet-{}", i + 1),
                name: name.to_string(),
            })
            .collect();
        source
    }

    pub fn add_activity(&self, date: NaiveDate, summary: DailySummary) {
        self.state.lock().unwrap().activity.insert(date, summary);
    }

    pub fn add_walk(&self, date: NaiveDate, walk: WalkEntry) {
        let mut state = self.state.lock().unwrap();
        state.walks.entry(date).or_default().push(walk);
    }

    pub fn add_sleep(&self, date: NaiveDate, period: RestPeriod) {
        let mut state = self.state.lock().unwrap();
        state.sleep.entry(date).or_default().push(period);
    }

    pub fn reject_login(&self) {
        self.state.lock().unwrap().reject_login = true;
    }

    /// Answer reads for `date` and later with an expired-session error.
    pub fn expire_session_on(&self, date: NaiveDate) {
        self.state.lock().unwrap().session_expires_on = Some(date);
    }

    /// Make the walk query fail (non-fatally) for `date`.
    pub fn fail_walks_on(&self, date: NaiveDate) {
        self.state.lock().unwrap().failing_walk_dates.insert(date);
    }

    pub fn logins(&self) -> usize {
        self.state.lock().unwrap().logins
    }

    pub fn logouts(&self) -> usize {
        self.state.lock().unwrap().logouts
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    fn read(&self, date: NaiveDate) -> Result<std::sync::MutexGuard<'_, SourceState>> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        if state.session_expires_on.is_some_and(|d| date >= d) {
            return Err(SyncError::Authentication("session expired".to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl DeviceSource for FakeSource {
    type Session = String;

    async fn authenticate(&self, email: &str, _password: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        if state.reject_login {
            return Err(SyncError::Authentication("HTTP 401: bad credentials".into()));
        }
        state.logins += 1;
        Ok(format!("session-for-{}", email))
    }

    async fn list_subjects(&self, _session: &String) -> Result<Vec<Subject>> {
        Ok(self.state.lock().unwrap().pets.clone())
    }

    async fn get_daily_activity(
        &self,
        _session: &String,
        _subject: &Subject,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>> {
        Ok(self.read(date)?.activity.get(&date).cloned())
    }

    async fn get_walks(
        &self,
        _session: &String,
        _subject: &Subject,
        date: NaiveDate,
    ) -> Result<Vec<WalkEntry>> {
        let state = self.read(date)?;
        if state.failing_walk_dates.contains(&date) {
            return Err(SyncError::Source("HTTP 502: bad gateway".to_string()));
        }
        Ok(state.walks.get(&date).cloned().unwrap_or_default())
    }

    async fn get_sleep(
        &self,
        _session: &String,
        _subject: &Subject,
        date: NaiveDate,
    ) -> Result<Vec<RestPeriod>> {
        Ok(self.read(date)?.sleep.get(&date).cloned().unwrap_or_default())
    }

    async fn logout(&self, _session: String) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.logouts += 1;
        Err(SyncError::Source("logout endpoint unavailable".to_string()))
    }
}
