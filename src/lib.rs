// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fi-Sync: copy Fi collar activity into Supabase
//!
//! This crate provides the batch job that pulls daily activity, walks, and
//! rest periods for one pet from the Fi collar API and writes them to the
//! dashboard's Supabase tables.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

pub use config::Config;
pub use error::{Result, SyncError};
pub use services::{SyncJob, SyncReport};
