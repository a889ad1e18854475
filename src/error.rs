// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the sync job.

use crate::config::ConfigError;

/// Sync job error type.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fi authentication failed: {0}")]
    Authentication(String),

    #[error("Pet {name:?} not found. Available pets: {available:?}")]
    SubjectNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Fi API error: {0}")]
    Source(String),

    #[error("Supabase error: {0}")]
    Destination(String),

    #[error("Failed to sync {kind} for {date}: {message}")]
    Record {
        kind: &'static str,
        date: String,
        message: String,
    },

    #[error("Failed to update sync log: {0}")]
    RunLog(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SyncError {
    /// Whether this error aborts the whole run.
    ///
    /// Everything else is logged and the offending record or day is skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Config(_) | SyncError::Authentication(_) | SyncError::SubjectNotFound { .. }
        )
    }
}

/// Result type alias for the sync job
pub type Result<T> = std::result::Result<T, SyncError>;
