// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod check;
pub mod fi;
pub mod sync;

pub use check::{check_tables, TableStatus};
pub use fi::{DeviceSource, FiClient, FiSession};
pub use sync::{SyncJob, SyncReport, SyncStats};
