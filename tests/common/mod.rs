//! Shared fixtures: a folder pin board holding a small LIMS database

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use limsmeta::data::Database;
use limsmeta::pins::{FolderBoard, PinCache, PinRef};
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

pub const PIN_NAME: &str = "vi2172/clarity_lims_sqlite";
pub const UI_URL: &str = "https://lims.example.org/clarity";

pub const SCHEMA: &str = r#"
CREATE TABLE projects (
    project_limsid TEXT, project_name TEXT, open_date TEXT, comment TEXT, sample_count INTEGER
);
INSERT INTO projects VALUES
    ('NVI1', 'Old project', '2023-01-10 09:00:00', NULL, 3),
    ('NVI2', 'New project', '2024-06-01T12:00:00', 'line one
line two', 12),
    ('NVI3', 'Undated project', NULL, 'pending', 1);

CREATE TABLE samples (
    limsid TEXT, name TEXT, received_date TEXT, species_name TEXT, project_account TEXT,
    nird_filename TEXT, prep_limsid TEXT
);
INSERT INTO samples VALUES
    ('S1', 'Salmon 1', '2024-02-01', 'Salmo salar', 'ACC-1', 'salmon_1.fastq.gz', '24-101, 24-102'),
    ('S2', 'Cod 1', '2024-03-01', 'Gadus morhua', 'ACC-2', NULL, 'broken');

CREATE TABLE ilmn_sequencing (
    run_id TEXT, run_number REAL, seq_date TEXT, cluster_density REAL, comment TEXT
);
INSERT INTO ilmn_sequencing VALUES
    ('RUN1', 41.6, '2024-05-05', 1234.4, NULL);
"#;

pub const UPDATE_LOG: &str = r#"
CREATE TABLE update_log (
    script_name TEXT, timestamp TEXT, status TEXT, records_affected INTEGER,
    tables_affected TEXT, execution_time_s REAL, error_message TEXT
);
INSERT INTO update_log VALUES
    ('projects.py', '2024-06-02T08:00:00', 'success', 3, 'projects', 1.5, NULL),
    ('samples.py', '2024-06-02T09:30:00', 'success', 2, 'samples', 2.0, NULL),
    ('samples.py', '2024-06-03T09:30:00', 'failed', 0, 'samples', 0.1, 'timeout');
"#;

/// Temp dir with `pins/{PIN_NAME}/{version}/` and a cache dir
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub async fn new(with_update_log: bool) -> Self {
        let fixture = Self {
            dir: TempDir::new().expect("temp dir"),
        };
        let mut sql = SCHEMA.to_string();
        if with_update_log {
            sql.push_str(UPDATE_LOG);
        }
        fixture.add_version("20240601T120000Z", &sql).await;
        fixture
    }

    pub fn board_root(&self) -> PathBuf {
        self.dir.path().join("pins")
    }

    pub fn cache_root(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    /// Write one pin version holding a database built from `sql`
    pub async fn add_version(&self, version: &str, sql: &str) -> PathBuf {
        let version_dir = self.board_root().join(PIN_NAME).join(version);
        std::fs::create_dir_all(&version_dir).expect("version dir");

        let db_path = version_dir.join("clarity.db");
        create_database(&db_path, sql).await;
        let size = std::fs::metadata(&db_path).expect("db metadata").len();

        std::fs::write(
            version_dir.join("data.txt"),
            format!(
                "file: clarity.db\nfile_size: {}\npin_hash: abc123\ntype: file\ntitle: clarity_lims_sqlite\ncreated: {}\napi_version: 1\n",
                size, version
            ),
        )
        .expect("data.txt");
        version_dir
    }

    pub fn database(&self) -> Database {
        let board = FolderBoard::new(self.board_root(), PinCache::new(self.cache_root()));
        Database::new(Arc::new(board), PinRef::parse(PIN_NAME).expect("pin name"))
    }
}

pub async fn create_database(path: &Path, sql: &str) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("create sqlite");
    sea_orm::sqlx::raw_sql(sql)
        .execute(&pool)
        .await
        .expect("fixture sql");
    pool.close().await;
}

pub mod canned;
