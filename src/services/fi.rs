// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fi collar API client.
//!
//! Handles:
//! - Session login/logout (session cookie kept by the HTTP client)
//! - Pet listing across the account's households
//! - Per-day activity, walk, and rest queries over GraphQL
//!
//! Raw responses are loosely populated; they are resolved into the records
//! in [`crate::models::source`] here, with defaults applied once.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::models::{DailySummary, RestPeriod, SleepType, Subject, WalkEntry};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Place name used when a walk has none.
const UNKNOWN_LOCATION: &str = "Unknown";

/// Read side of the collar data source.
///
/// `authenticate` opens a session that the other calls borrow; `logout`
/// consumes it.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    type Session: Send + Sync;

    async fn authenticate(&self, email: &str, password: &str) -> Result<Self::Session>;

    async fn list_subjects(&self, session: &Self::Session) -> Result<Vec<Subject>>;

    /// Activity totals for `date`, or `None` if the collar has no data that day.
    async fn get_daily_activity(
        &self,
        session: &Self::Session,
        subject: &Subject,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>>;

    async fn get_walks(
        &self,
        session: &Self::Session,
        subject: &Subject,
        date: NaiveDate,
    ) -> Result<Vec<WalkEntry>>;

    async fn get_sleep(
        &self,
        session: &Self::Session,
        subject: &Subject,
        date: NaiveDate,
    ) -> Result<Vec<RestPeriod>>;

    async fn logout(&self, session: Self::Session) -> Result<()>;
}

/// Authenticated Fi session. The session cookie itself lives in the
/// client's cookie store.
#[derive(Debug, Clone)]
pub struct FiSession {
    pub user_id: String,
}

/// Fi API client.
#[derive(Clone)]
pub struct FiClient {
    http: reqwest::Client,
    base_url: String,
}

impl FiClient {
    /// Create a client against `base_url` (e.g. `https://api.tryfi.com`).
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SyncError::Source(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run a GraphQL query and return its `data`.
    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}/graphql", self.base_url);
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Source(e.to_string()))?;

        let response: GraphQlResponse<T> = check_response_json(response).await?;
        response.into_data()
    }

    async fn pet_query<T: DeserializeOwned>(
        &self,
        query: &str,
        subject: &Subject,
        date: NaiveDate,
    ) -> Result<Option<T>> {
        let data: PetData<T> = self
            .graphql(
                query,
                serde_json::json!({
                    "petId": subject.id,
                    "date": date.format("%Y-%m-%d").to_string(),
                }),
            )
            .await?;
        Ok(data.pet)
    }
}

#[async_trait]
impl DeviceSource for FiClient {
    type Session = FiSession;

    async fn authenticate(&self, email: &str, password: &str) -> Result<FiSession> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .map_err(|e| SyncError::Authentication(format!("Login request failed: {}", e)))?;

        let login: LoginResponse = check_response_json(response).await.map_err(|e| match e {
            SyncError::Source(msg) => SyncError::Authentication(msg),
            other => other,
        })?;

        let session = login.into_session()?;
        tracing::info!(user_id = %session.user_id, "Logged in to Fi");
        Ok(session)
    }

    async fn list_subjects(&self, _session: &FiSession) -> Result<Vec<Subject>> {
        let data: PetsData = self
            .graphql(PETS_QUERY, serde_json::Value::Null)
            .await?;
        Ok(data.into_subjects())
    }

    async fn get_daily_activity(
        &self,
        _session: &FiSession,
        subject: &Subject,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>> {
        let pet: Option<PetDailyActivity> =
            self.pet_query(DAILY_ACTIVITY_QUERY, subject, date).await?;
        Ok(pet
            .and_then(|p| p.daily_activity)
            .map(DailySummary::from))
    }

    async fn get_walks(
        &self,
        _session: &FiSession,
        subject: &Subject,
        date: NaiveDate,
    ) -> Result<Vec<WalkEntry>> {
        let pet: Option<PetWalks> = self.pet_query(WALKS_QUERY, subject, date).await?;
        Ok(pet
            .map(|p| p.walks.into_iter().map(WalkEntry::from).collect())
            .unwrap_or_default())
    }

    async fn get_sleep(
        &self,
        _session: &FiSession,
        subject: &Subject,
        date: NaiveDate,
    ) -> Result<Vec<RestPeriod>> {
        let pet: Option<PetRestPeriods> = self.pet_query(REST_QUERY, subject, date).await?;
        Ok(pet
            .map(|p| p.rest_periods.into_iter().map(RestPeriod::from).collect())
            .unwrap_or_default())
    }

    async fn logout(&self, session: FiSession) -> Result<()> {
        let url = format!("{}/auth/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| SyncError::Source(format!("Logout request failed: {}", e)))?;

        check_response(response).await?;
        tracing::debug!(user_id = %session.user_id, "Logged out of Fi");
        Ok(())
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    // Expired or rejected session
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(SyncError::Authentication(format!("HTTP {}: {}", status, body)));
    }

    Err(SyncError::Source(format!("HTTP {}: {}", status, body)))
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    check_response(response)
        .await?
        .json()
        .await
        .map_err(|e| SyncError::Source(format!("JSON parse error: {}", e)))
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphQL documents
// ─────────────────────────────────────────────────────────────────────────────

const PETS_QUERY: &str = r#"
query CurrentUserPets {
  currentUser {
    userHouseholds {
      household {
        pets { id name }
      }
    }
  }
}"#;

const DAILY_ACTIVITY_QUERY: &str = r#"
query DailyActivity($petId: String!, $date: Date!) {
  pet(id: $petId) {
    dailyActivity(date: $date) {
      stepCount distance calories walkCount
      restMinutes napMinutes activeMinutes playMinutes goal
    }
  }
}"#;

const WALKS_QUERY: &str = r#"
query Walks($petId: String!, $date: Date!) {
  pet(id: $petId) {
    walks(date: $date) {
      id durationSeconds steps distance calories
      startTime endTime averageSpeed placeName
    }
  }
}"#;

const REST_QUERY: &str = r#"
query RestPeriods($petId: String!, $date: Date!) {
  pet(id: $petId) {
    restPeriods(date: $date) {
      type startTime endTime durationSeconds quality
    }
  }
}"#;

// ─────────────────────────────────────────────────────────────────────────────
// Raw response shapes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    user_id: Option<String>,
    session_id: Option<String>,
    error: Option<ApiErrorBody>,
}

impl LoginResponse {
    /// A login only counts when Fi issued a session for a user.
    fn into_session(self) -> Result<FiSession> {
        match (self.user_id, self.session_id) {
            (Some(user_id), Some(_)) => Ok(FiSession { user_id }),
            _ => Err(SyncError::Authentication(
                self.error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "Login response missing session".to_string()),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ApiErrorBody>,
}

impl<T> GraphQlResponse<T> {
    fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            let lowered = message.to_ascii_lowercase();
            if lowered.contains("unauthorized") || lowered.contains("not logged in") {
                return Err(SyncError::Authentication(message));
            }
            return Err(SyncError::Source(message));
        }
        self.data
            .ok_or_else(|| SyncError::Source("GraphQL response has no data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PetsData {
    current_user: CurrentUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentUser {
    #[serde(default)]
    user_households: Vec<UserHousehold>,
}

#[derive(Debug, Deserialize)]
struct UserHousehold {
    household: Household,
}

#[derive(Debug, Deserialize)]
struct Household {
    #[serde(default)]
    pets: Vec<RawPet>,
}

#[derive(Debug, Deserialize)]
struct RawPet {
    id: String,
    name: String,
}

impl PetsData {
    fn into_subjects(self) -> Vec<Subject> {
        self.current_user
            .user_households
            .into_iter()
            .flat_map(|h| h.household.pets)
            .map(|p| Subject {
                id: p.id,
                name: p.name,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct PetData<T> {
    pet: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PetDailyActivity {
    daily_activity: Option<RawDailyActivity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDailyActivity {
    step_count: Option<i64>,
    distance: Option<f64>,
    calories: Option<f64>,
    walk_count: Option<i64>,
    rest_minutes: Option<i64>,
    nap_minutes: Option<i64>,
    active_minutes: Option<i64>,
    play_minutes: Option<i64>,
    goal: Option<i64>,
}

impl From<RawDailyActivity> for DailySummary {
    fn from(raw: RawDailyActivity) -> Self {
        let defaults = DailySummary::default();
        Self {
            step_count: raw.step_count.unwrap_or(defaults.step_count),
            distance_meters: raw.distance.unwrap_or(defaults.distance_meters),
            calories: raw.calories.unwrap_or(defaults.calories),
            walk_count: raw.walk_count.unwrap_or(defaults.walk_count),
            rest_minutes: raw.rest_minutes.unwrap_or(defaults.rest_minutes),
            nap_minutes: raw.nap_minutes.unwrap_or(defaults.nap_minutes),
            active_minutes: raw.active_minutes.unwrap_or(defaults.active_minutes),
            play_minutes: raw.play_minutes.unwrap_or(defaults.play_minutes),
            goal_steps: raw.goal.unwrap_or(defaults.goal_steps),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PetWalks {
    #[serde(default)]
    walks: Vec<RawWalk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWalk {
    id: Option<String>,
    duration_seconds: Option<i64>,
    steps: Option<i64>,
    distance: Option<f64>,
    calories: Option<f64>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    average_speed: Option<f64>,
    place_name: Option<String>,
}

impl From<RawWalk> for WalkEntry {
    fn from(raw: RawWalk) -> Self {
        Self {
            id: raw.id,
            duration_seconds: raw.duration_seconds.unwrap_or(0),
            steps: raw.steps.unwrap_or(0),
            distance_meters: raw.distance.unwrap_or(0.0),
            calories: raw.calories.unwrap_or(0.0),
            start_time: raw.start_time,
            end_time: raw.end_time,
            avg_speed: raw.average_speed.unwrap_or(0.0),
            location: raw
                .place_name
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PetRestPeriods {
    #[serde(default)]
    rest_periods: Vec<RawRestPeriod>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRestPeriod {
    #[serde(rename = "type")]
    kind: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    duration_seconds: Option<i64>,
    quality: Option<f64>,
}

impl From<RawRestPeriod> for RestPeriod {
    fn from(raw: RawRestPeriod) -> Self {
        Self {
            sleep_type: raw
                .kind
                .as_deref()
                .map(SleepType::from_label)
                .unwrap_or_default(),
            start_time: raw.start_time,
            end_time: raw.end_time,
            duration_seconds: raw.duration_seconds.unwrap_or(0),
            quality: raw.quality,
        }
    }
}
