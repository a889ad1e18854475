// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Job configuration loaded from environment variables.
//!
//! Values are resolved once at startup into a [`Config`] that is handed to
//! the sync job. Nothing below `main` reads the environment.

use std::env;

/// Default trailing window, in days.
pub const DEFAULT_SYNC_DAYS: u32 = 7;

/// Default pet to sync when `FI_PET_NAME` is not set.
pub const DEFAULT_PET_NAME: &str = "Bailey";

/// Largest accepted trailing window, in days.
pub const MAX_SYNC_DAYS: u32 = 3650;

/// Default Fi API base URL.
pub const DEFAULT_FI_API_URL: &str = "https://api.tryfi.com";

/// Job configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Fi collar API ---
    /// Fi account email
    pub fi_email: String,
    /// Fi account password
    pub fi_password: String,
    /// Fi API base URL
    pub fi_api_url: String,
    /// Name of the pet to sync (matched case-insensitively)
    pub pet_name: String,

    // --- Supabase ---
    /// Supabase project URL (without the `/rest/v1` suffix)
    pub supabase_url: String,
    /// Supabase API key, sent as both `apikey` and bearer token
    pub supabase_key: String,

    // --- Job behavior ---
    /// Number of trailing days to sync
    pub sync_days: u32,
    /// Read and map everything, write nothing
    pub dry_run: bool,
}

/// Supabase connection settings, all that `--check` needs.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (without the `/rest/v1` suffix or a trailing slash)
    pub url: String,
    /// API key, sent as both `apikey` and bearer token
    pub key: String,
}

impl SupabaseConfig {
    /// Load Supabase settings from environment variables, ignoring the Fi
    /// credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build Supabase settings from an arbitrary key lookup.
    ///
    /// The `NEXT_PUBLIC_` variants are used when the plain names are unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = non_blank(&lookup);
        let url = get("SUPABASE_URL")
            .or_else(|| get("NEXT_PUBLIC_SUPABASE_URL"))
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let key = get("SUPABASE_ANON_KEY")
            .or_else(|| get("NEXT_PUBLIC_SUPABASE_ANON_KEY"))
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            key,
        })
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            fi_email: "test@example.com".to_string(),
            fi_password: "test_password".to_string(),
            fi_api_url: "http://localhost:9999".to_string(),
            pet_name: DEFAULT_PET_NAME.to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_key: "test_anon_key".to_string(),
            sync_days: DEFAULT_SYNC_DAYS,
            dry_run: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `.env.local` and then `.env` are loaded first if present; variables
    /// already set in the process environment win.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty or whitespace-only values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let supabase = SupabaseConfig::from_lookup(&lookup)?;

        let get = non_blank(&lookup);
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let sync_days = match get("FI_SYNC_DAYS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(days) if days <= MAX_SYNC_DAYS => days,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "FI_SYNC_DAYS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_SYNC_DAYS,
        };

        Ok(Self {
            fi_email: require("FI_EMAIL")?,
            fi_password: require("FI_PASSWORD")?,
            fi_api_url: get("FI_API_URL").unwrap_or_else(|| DEFAULT_FI_API_URL.to_string()),
            pet_name: get("FI_PET_NAME").unwrap_or_else(|| DEFAULT_PET_NAME.to_string()),
            supabase_url: supabase.url,
            supabase_key: supabase.key,
            sync_days,
            dry_run: get("DRY_RUN").is_some_and(|v| v.eq_ignore_ascii_case("true")),
        })
    }
}

/// Load `.env.local` and then `.env` if present. Variables already set in
/// the process environment win.
fn load_dotenv() {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
}

/// Wrap a lookup so that empty or whitespace-only values count as missing.
fn non_blank<F>(lookup: &F) -> impl Fn(&str) -> Option<String> + '_
where
    F: Fn(&str) -> Option<String>,
{
    move |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
