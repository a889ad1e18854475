// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fi-Sync command line entry point.
//!
//! Syncs a trailing window of Fi collar data into Supabase. Exits 0 on
//! success and 1 on any fatal failure.

use std::process::ExitCode;

use clap::Parser;
use fi_sync::{
    config::{Config, SupabaseConfig, MAX_SYNC_DAYS},
    db::SupabaseClient,
    models::SyncType,
    services::{check_tables, FiClient, SyncJob},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "fi-sync",
    version,
    about = "Sync Fi collar data to Supabase"
)]
struct Cli {
    /// Sync type recorded in the sync log
    #[arg(long = "type", value_enum, default_value_t = SyncType::Manual)]
    sync_type: SyncType,

    /// Number of days to sync, at most 3650 (overrides FI_SYNC_DAYS)
    #[arg(long, value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_SYNC_DAYS)))]
    days: Option<u32>,

    /// Read from Fi but write nothing to Supabase
    #[arg(long)]
    dry_run: bool,

    /// Pet to sync (overrides FI_PET_NAME)
    #[arg(long)]
    pet: Option<String>,

    /// Only check that the Supabase tables exist
    #[arg(long)]
    check: bool,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if cli.check {
        return check().await;
    }

    // Load configuration from environment
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(days) = cli.days {
        config.sync_days = days;
    }
    if let Some(pet) = cli.pet {
        config.pet_name = pet;
    }
    config.dry_run |= cli.dry_run;

    let destination = match SupabaseClient::new(&config.supabase_url, &config.supabase_key) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create Supabase client");
            return ExitCode::FAILURE;
        }
    };

    let source = match FiClient::new(&config.fi_api_url) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create Fi client");
            return ExitCode::FAILURE;
        }
    };

    let job = SyncJob::new(source, destination, config);
    match job.run(cli.sync_type).await {
        Ok(report) => {
            if report.dry_run {
                tracing::warn!("Dry run: nothing was saved");
            }
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}

/// `--check`: verify the Supabase tables exist. Needs no Fi credentials.
async fn check() -> ExitCode {
    let settings = match SupabaseConfig::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let destination = match SupabaseClient::new(&settings.url, &settings.key) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create Supabase client");
            return ExitCode::FAILURE;
        }
    };

    let statuses = check_tables(&destination).await;
    let missing = statuses.iter().filter(|s| !s.exists()).count();
    if missing > 0 {
        tracing::error!(missing, "Some tables are missing; apply the schema first");
        return ExitCode::FAILURE;
    }
    tracing::info!("All tables exist");
    ExitCode::SUCCESS
}

/// Initialize logging: human-readable by default, JSON for cron runs.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fi_sync=debug,info"));

    if json {
        let format = tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true);
        tracing_subscriber::registry().with(filter).with(format).init();
    } else {
        let format = tracing_subscriber::fmt::layer().with_target(false);
        tracing_subscriber::registry().with(filter).with(format).init();
    }
}
