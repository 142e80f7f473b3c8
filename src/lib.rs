pub mod charts;
pub mod client;
pub mod db;
pub mod errors;
pub mod export;
pub mod features;
pub mod models;
pub mod runner;

pub use client::ApiClient;
pub use errors::{AppError, AppResult, FetchError, StoreError};
pub use runner::AnalyticsCore;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Wires daily-rolling JSON logs under `data_dir/logs`. Call once at startup;
/// the writer guard is held for the life of the process.
pub fn init_tracing(data_dir: &Path) -> AppResult<()> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| AppError::Internal(error.to_string()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "insights.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}
