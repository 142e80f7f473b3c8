use crate::charts;
use crate::client::ApiClient;
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::export;
use crate::features;
use crate::models::{
    ChartOutput, ChartRequest, DatasetOverview, EnrichedUserRecord, ExportedFile, LoadSummary,
    RefreshSummary, BASE_COLUMNS,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const DB_FILE_NAME: &str = "usuarios.db";

struct LoadedData {
    records: Vec<EnrichedUserRecord>,
    loaded_at: DateTime<Utc>,
}

/// Session-scoped pipeline core behind the interactive surface. Holds the
/// store, the remote client, and the currently loaded record set (absent
/// until a load succeeds, droppable via [`AnalyticsCore::clear_loaded`]).
/// Each action runs to completion before the next is accepted.
pub struct AnalyticsCore {
    db: Database,
    client: ApiClient,
    loaded: Mutex<Option<LoadedData>>,
}

impl AnalyticsCore {
    pub fn new(data_dir: &Path) -> AppResult<Self> {
        Self::with_client(data_dir, ApiClient::new())
    }

    pub fn with_client(data_dir: &Path, client: ApiClient) -> AppResult<Self> {
        let db = Database::new(&data_dir.join(DB_FILE_NAME))?;
        Ok(Self {
            db,
            client,
            loaded: Mutex::new(None),
        })
    }

    /// Fetches the remote user list and replaces the stored table with it.
    /// A fetch failure leaves the store untouched. The in-memory session is
    /// not refreshed until the next explicit load.
    pub async fn refresh_from_source(&self) -> AppResult<RefreshSummary> {
        let users = self.client.fetch_users().await.map_err(|error| {
            tracing::warn!(error = %error, "refresh from source failed");
            error
        })?;
        let stored = self.db.replace_all(&users)?;
        tracing::info!(fetched = users.len(), stored, "user table refreshed from source");
        Ok(RefreshSummary {
            fetched: users.len(),
            stored,
        })
    }

    /// Reads the stored table, derives the computed columns, and makes the
    /// result the current session set. An empty store loads nothing and
    /// leaves the session as it was.
    pub fn load_from_store(&self) -> AppResult<LoadSummary> {
        let records = self.db.read_all()?;
        if records.is_empty() {
            tracing::info!("store is empty, nothing to load");
            return Ok(LoadSummary { loaded: 0 });
        }

        let enriched = features::derive(&records);
        let loaded = enriched.len();
        *self.lock_loaded()? = Some(LoadedData {
            records: enriched,
            loaded_at: Utc::now(),
        });
        tracing::info!(loaded, "records loaded from store");
        Ok(LoadSummary { loaded })
    }

    pub fn overview(&self) -> AppResult<DatasetOverview> {
        let guard = self.lock_loaded()?;
        let data = guard.as_ref().ok_or(AppError::NoDataLoaded)?;
        let unique_domains: HashSet<&str> = data
            .records
            .iter()
            .filter_map(|record| record.email_domain.as_deref())
            .collect();
        Ok(DatasetOverview {
            record_count: data.records.len(),
            column_count: BASE_COLUMNS.len(),
            unique_domains: unique_domains.len(),
            loaded_at: data.loaded_at,
        })
    }

    pub fn render_chart(&self, request: &ChartRequest) -> AppResult<ChartOutput> {
        let guard = self.lock_loaded()?;
        let data = guard.as_ref().ok_or(AppError::NoDataLoaded)?;
        Ok(charts::render(&data.records, request))
    }

    /// Current session set, for tabular display by the rendering layer.
    pub fn loaded_records(&self) -> AppResult<Vec<EnrichedUserRecord>> {
        let guard = self.lock_loaded()?;
        let data = guard.as_ref().ok_or(AppError::NoDataLoaded)?;
        Ok(data.records.clone())
    }

    pub fn export_records(&self) -> AppResult<ExportedFile> {
        let guard = self.lock_loaded()?;
        let data = guard.as_ref().ok_or(AppError::NoDataLoaded)?;
        Ok(ExportedFile {
            file_name: export::RECORDS_FILE_NAME.to_string(),
            content: export::records_csv(&data.records)?,
        })
    }

    pub fn export_stats(&self) -> AppResult<ExportedFile> {
        let guard = self.lock_loaded()?;
        let data = guard.as_ref().ok_or(AppError::NoDataLoaded)?;
        Ok(ExportedFile {
            file_name: export::STATS_FILE_NAME.to_string(),
            content: export::stats_csv(&data.records)?,
        })
    }

    /// Drops the session set. Reports whether data was present. The stored
    /// table is unaffected.
    pub fn clear_loaded(&self) -> AppResult<bool> {
        let mut guard = self.lock_loaded()?;
        Ok(guard.take().is_some())
    }

    fn lock_loaded(&self) -> AppResult<MutexGuard<'_, Option<LoadedData>>> {
        self.loaded
            .lock()
            .map_err(|_| AppError::Internal("session mutex poisoned".to_string()))
    }
}
