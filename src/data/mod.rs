//! Pinned LIMS database: access, table shaping and the loaded snapshot

pub mod db;
pub mod store;
pub mod tables;
pub mod transform;
pub mod update_info;

pub use db::{Connection, Database, RawTable};
pub use store::{DataStore, Snapshot, fetch_table};
pub use tables::{Cell, CellValue, LEFT_ALIGNED_COLUMN, SAGA_COLUMNS, Table, TableKind};
pub use update_info::{FormattedUpdateInfo, UpdateInfo, UpdateMethod};
