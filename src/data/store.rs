//! In-memory snapshot of the displayed tables

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tracing::{error, info};

use super::db::Database;
use super::tables::{Table, TableKind};
use super::transform::shape_table;
use super::update_info::UpdateInfo;
use crate::errors::Result;

/// Tables and update info loaded together
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub projects: Table,
    pub samples: Table,
    pub sequencing: Table,
    pub update_info: UpdateInfo,
    pub loaded_at: DateTime<Local>,
}

impl Snapshot {
    /// Placeholder used until the first successful load
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            projects: Table::default(),
            samples: Table::default(),
            sequencing: Table::default(),
            update_info: UpdateInfo::from_error(reason),
            loaded_at: Local::now(),
        }
    }

    pub fn table(&self, kind: TableKind) -> &Table {
        match kind {
            TableKind::Projects => &self.projects,
            TableKind::Samples => &self.samples,
            TableKind::Sequencing => &self.sequencing,
        }
    }
}

/// Holds the current snapshot; readers never wait for a refresh
pub struct DataStore {
    db: Database,
    ui_url: String,
    snapshot: ArcSwap<Snapshot>,
    refresh_lock: tokio::sync::Mutex<()>,
    last_error: Mutex<Option<String>>,
}

impl DataStore {
    /// Load the first snapshot; fails when the database cannot be read
    pub async fn load(db: Database, ui_url: impl Into<String>) -> Result<Self> {
        let ui_url = ui_url.into();
        let snapshot = fetch_snapshot(&db, &ui_url).await?;
        Ok(Self::with_snapshot(db, ui_url, snapshot))
    }

    /// Start without data, e.g. when the pin board is unreachable at startup
    pub fn unloaded(db: Database, ui_url: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let store = Self::with_snapshot(db, ui_url.into(), Snapshot::empty(reason.clone()));
        *store.last_error.lock() = Some(reason);
        store
    }

    fn with_snapshot(db: Database, ui_url: String, snapshot: Snapshot) -> Self {
        Self {
            db,
            ui_url,
            snapshot: ArcSwap::from_pointee(snapshot),
            refresh_lock: tokio::sync::Mutex::new(()),
            last_error: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Error of the most recent failed load, cleared by a successful one
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    /// Download the pin again and reload every table
    ///
    /// The previous snapshot stays in place when the reload fails.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        let _guard = self.refresh_lock.lock().await;
        info!("Refreshing database connection...");
        self.db.refresh().await;

        match fetch_snapshot(&self.db, &self.ui_url).await {
            Ok(snapshot) => {
                self.snapshot.store(Arc::new(snapshot));
                *self.last_error.lock() = None;
                info!("Datasets updated successfully");
                Ok(self.snapshot())
            }
            Err(e) => {
                error!("Refresh failed, keeping previous data: {}", e);
                *self.last_error.lock() = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Read and shape one table
pub async fn fetch_table(db: &Database, kind: TableKind, ui_url: &str) -> Result<Table> {
    let raw = db.query_table(kind.sql_table()).await?;
    Ok(shape_table(kind, &raw.columns, raw.rows, ui_url))
}

async fn fetch_snapshot(db: &Database, ui_url: &str) -> Result<Snapshot> {
    let projects = fetch_table(db, TableKind::Projects, ui_url).await?;
    info!("Projects data fetched ({} rows)", projects.len());

    let samples = fetch_table(db, TableKind::Samples, ui_url).await?;
    info!("Samples data fetched ({} rows)", samples.len());

    let sequencing = fetch_table(db, TableKind::Sequencing, ui_url).await?;
    info!("Seq data fetched ({} rows)", sequencing.len());

    let update_info = UpdateInfo::load(db).await;

    Ok(Snapshot {
        projects,
        samples,
        sequencing,
        update_info,
        loaded_at: Local::now(),
    })
}
