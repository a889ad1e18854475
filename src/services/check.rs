// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pre-flight check that the sync tables exist in the destination.

use crate::db::{self, tables, Destination};

/// Reachability of one table.
#[derive(Debug, Clone)]
pub struct TableStatus {
    pub table: &'static str,
    /// `None` when the lookup succeeded
    pub error: Option<String>,
}

impl TableStatus {
    pub fn exists(&self) -> bool {
        self.error.is_none()
    }
}

/// Check every sync table with a one-row select. Never writes.
pub async fn check_tables<D: Destination>(destination: &D) -> Vec<TableStatus> {
    let mut statuses = Vec::with_capacity(tables::ALL.len());

    for table in tables::ALL {
        let error = match destination.select(table, &[db::limit(1)]).await {
            Ok(_) => {
                tracing::info!(table, "Table exists");
                None
            }
            Err(e) => {
                tracing::warn!(table, error = %e, "Table missing or unreachable");
                Some(e.to_string())
            }
        };
        statuses.push(TableStatus { table, error });
    }

    statuses
}
