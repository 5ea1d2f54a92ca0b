//! Read-only access to the pinned SQLite database

use std::path::PathBuf;
use std::sync::Arc;

use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sea_orm::sqlx::{Row, TypeInfo, ValueRef};
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::tables::CellValue;
use crate::errors::{LimsError, Result};
use crate::pins::{PinBoard, PinRef};

/// Rows of one table with database column names
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// An open database file
#[derive(Clone)]
pub struct Connection {
    pub path: PathBuf,
    pub pool: SqlitePool,
}

impl Connection {
    /// sea-orm view of the same pool
    pub fn orm(&self) -> DatabaseConnection {
        SqlxSqliteConnector::from_sqlx_sqlite_pool(self.pool.clone())
    }
}

/// The database pin, downloaded on first use
///
/// `refresh` drops the connection so the next access downloads the pin
/// again and picks up a newer version.
pub struct Database {
    board: Arc<dyn PinBoard>,
    pin: PinRef,
    current: Mutex<Option<Connection>>,
}

impl Database {
    pub fn new(board: Arc<dyn PinBoard>, pin: PinRef) -> Self {
        Self {
            board,
            pin,
            current: Mutex::new(None),
        }
    }

    pub fn pin(&self) -> &PinRef {
        &self.pin
    }

    pub fn board(&self) -> &Arc<dyn PinBoard> {
        &self.board
    }

    /// Current connection, downloading and opening the pin if needed
    pub async fn current(&self) -> Result<Connection> {
        let mut guard = self.current.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        info!("Downloading database pin {}", self.pin);
        let path = self.board.pin_download(&self.pin).await?;
        if !path.is_file() {
            return Err(LimsError::file_operation(format!(
                "Downloaded file path {} does not exist",
                path.display()
            )));
        }

        let pool = open_read_only(&path).await?;
        let conn = Connection { path, pool };
        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Forget the downloaded file and close the pool
    pub async fn refresh(&self) {
        let previous = self.current.lock().await.take();
        if let Some(conn) = previous {
            debug!("Closing database {}", conn.path.display());
            conn.pool.close().await;
        }
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let conn = self.current().await?;
        let found = sea_orm::sqlx::query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?",
        )
        .bind(table)
        .fetch_optional(&conn.pool)
        .await?;
        Ok(found.is_some())
    }

    /// Every column of every row of `table`
    pub async fn query_table(&self, table: &str) -> Result<RawTable> {
        if !self.table_exists(table).await? {
            return Err(LimsError::not_found(format!(
                "Table '{}' does not exist in the database",
                table
            )));
        }
        let conn = self.current().await?;
        let quoted = quote_identifier(table);

        let columns: Vec<String> = sea_orm::sqlx::query("SELECT name FROM pragma_table_info(?)")
            .bind(table)
            .fetch_all(&conn.pool)
            .await?
            .iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<std::result::Result<_, _>>()?;

        let rows: Vec<Vec<CellValue>> = sea_orm::sqlx::query(&format!("SELECT * FROM {}", quoted))
            .fetch_all(&conn.pool)
            .await?
            .iter()
            .map(|row| read_row(row, columns.len()))
            .collect();

        debug!("Read {} rows from {}", rows.len(), table);
        Ok(RawTable { columns, rows })
    }
}

async fn open_read_only(path: &std::path::Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .busy_timeout(std::time::Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(|e| {
            LimsError::database_connection(format!(
                "Unable to open SQLite database {}: {}",
                path.display(),
                e
            ))
        })
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn read_row(row: &SqliteRow, width: usize) -> Vec<CellValue> {
    (0..width).map(|i| read_value(row, i)).collect()
}

/// Decode a column by its storage class
fn read_value(row: &SqliteRow, index: usize) -> CellValue {
    let kind = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return CellValue::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return CellValue::Null,
    };

    match kind.as_str() {
        "INTEGER" => row
            .try_get::<i64, _>(index)
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Null),
        "REAL" => row
            .try_get::<f64, _>(index)
            .map(CellValue::Real)
            .unwrap_or(CellValue::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|b| CellValue::Text(String::from_utf8_lossy(&b).into_owned()))
            .unwrap_or(CellValue::Null),
        _ => row
            .try_get::<String, _>(index)
            .map(CellValue::Text)
            .unwrap_or(CellValue::Null),
    }
}
