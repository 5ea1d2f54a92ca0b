//! When the pinned database was last updated
//!
//! Prefers the `update_log` table written by the export scripts and falls
//! back to the file modification time.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDateTime};
use sea_orm::{DbBackend, FromQueryResult, Statement};
use serde::Serialize;
use tracing::warn;

use super::db::Database;
use crate::errors::Result;

/// Tables listed in the update tooltip, with their labels
pub const TRACKED_TABLES: [(&str, &str); 3] = [
    ("projects", "Projects"),
    ("samples", "Samples"),
    ("ilmn_sequencing", "Sequencing"),
];

const LATEST_PER_TABLE_SQL: &str = r#"
WITH ranked AS (
    SELECT script_name, timestamp, status, records_affected, tables_affected,
           execution_time_s, error_message,
           ROW_NUMBER() OVER (PARTITION BY tables_affected ORDER BY timestamp DESC) AS rn
    FROM update_log
    WHERE status = 'success'
)
SELECT script_name,
       CAST(timestamp AS TEXT) AS timestamp,
       status,
       CAST(records_affected AS INTEGER) AS records_affected,
       tables_affected,
       CAST(execution_time_s AS REAL) AS execution_time_s,
       error_message
FROM ranked
WHERE rn = 1
ORDER BY timestamp DESC
"#;

const RECENT_SQL: &str = r#"
SELECT script_name,
       CAST(timestamp AS TEXT) AS timestamp,
       status,
       CAST(records_affected AS INTEGER) AS records_affected,
       tables_affected,
       CAST(execution_time_s AS REAL) AS execution_time_s,
       error_message
FROM update_log
ORDER BY timestamp DESC
LIMIT 5
"#;

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct UpdateRecord {
    pub script_name: Option<String>,
    pub timestamp: Option<String>,
    pub status: Option<String>,
    pub records_affected: Option<i64>,
    pub tables_affected: Option<String>,
    pub execution_time_s: Option<f64>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMethod {
    UpdateLog,
    FileTimestamp,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateInfo {
    pub last_update: Option<String>,
    pub method: UpdateMethod,
    /// Latest successful update keyed by `tables_affected`
    pub table_updates: BTreeMap<String, UpdateRecord>,
    pub recent_updates: Vec<UpdateRecord>,
    pub error: Option<String>,
}

/// Display strings for the navbar tooltip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedUpdateInfo {
    pub tables: Vec<(String, String)>,
    pub last_update: String,
    pub app_refresh: String,
}

impl UpdateInfo {
    /// Read update information; failures are reported inside the result
    pub async fn load(db: &Database) -> Self {
        match Self::try_load(db).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Error getting database update info: {}", e);
                Self::from_error(e.to_string())
            }
        }
    }

    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            last_update: Some(Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S").to_string()),
            method: UpdateMethod::Error,
            table_updates: BTreeMap::new(),
            recent_updates: Vec::new(),
            error: Some(message.into()),
        }
    }

    async fn try_load(db: &Database) -> Result<Self> {
        if !db.table_exists("update_log").await? {
            let conn = db.current().await?;
            let modified = std::fs::metadata(&conn.path)?.modified()?;
            let modified: DateTime<Local> = modified.into();
            return Ok(Self {
                last_update: Some(modified.naive_local().format("%Y-%m-%dT%H:%M:%S").to_string()),
                method: UpdateMethod::FileTimestamp,
                table_updates: BTreeMap::new(),
                recent_updates: Vec::new(),
                error: None,
            });
        }

        let orm = db.current().await?.orm();
        let latest = UpdateRecord::find_by_statement(Statement::from_string(
            DbBackend::Sqlite,
            LATEST_PER_TABLE_SQL,
        ))
        .all(&orm)
        .await?;
        let recent_updates = UpdateRecord::find_by_statement(Statement::from_string(
            DbBackend::Sqlite,
            RECENT_SQL,
        ))
        .all(&orm)
        .await?;

        Ok(Self::from_log(latest, recent_updates))
    }

    /// Combine per-table latest rows and the recent history
    pub fn from_log(latest: Vec<UpdateRecord>, recent_updates: Vec<UpdateRecord>) -> Self {
        let table_updates: BTreeMap<String, UpdateRecord> = latest
            .into_iter()
            .filter_map(|r| r.tables_affected.clone().map(|t| (t, r)))
            .collect();
        let last_update = table_updates
            .values()
            .filter_map(|r| r.timestamp.clone())
            .max();

        Self {
            last_update,
            method: UpdateMethod::UpdateLog,
            table_updates,
            recent_updates,
            error: None,
        }
    }

    /// Per-table `YYYY-MM-DD HH:MM` (or `Unknown`) and the app refresh time
    pub fn formatted(&self, app_refreshed: DateTime<Local>) -> FormattedUpdateInfo {
        let tables = TRACKED_TABLES
            .iter()
            .map(|(table, label)| {
                let stamp = match self.method {
                    UpdateMethod::UpdateLog => self
                        .table_updates
                        .get(*table)
                        .and_then(|r| r.timestamp.as_deref()),
                    _ => self.last_update.as_deref(),
                };
                (label.to_string(), format_stamp(stamp))
            })
            .collect();

        FormattedUpdateInfo {
            tables,
            last_update: format_stamp(self.last_update.as_deref()),
            app_refresh: app_refreshed.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn format_stamp(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "Unknown".to_string();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}
