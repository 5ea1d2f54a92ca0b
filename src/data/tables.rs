//! Table model shared by the pages, the JSON API and the CSV export

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use strum::{EnumIter, IntoEnumIterator};

use crate::errors::LimsError;

/// The three tables the app displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Projects,
    Samples,
    Sequencing,
}

const PROJECT_RENAMES: &[(&str, &str)] = &[
    ("open_date", "Open Date"),
    ("project_name", "Project Name"),
    ("sample_count", "Samples"),
    ("submitting_lab", "Submitting Lab"),
    ("comment", "Comment"),
    ("status", "Status"),
    ("submitter", "Submitter"),
    ("species", "Species"),
    ("project_limsid", "Project LIMS ID"),
];

const SAMPLE_RENAMES: &[(&str, &str)] = &[
    ("limsid", "LIMS ID"),
    ("project_limsid", "Project LIMS ID"),
    ("received_date", "Received Date"),
    ("species_name", "Species"),
    ("name", "Sample Name"),
    ("project_name", "Project Name"),
    ("project_account", "Project Account"),
    ("experiment_name", "Experiment Name"),
    ("invoice_id", "Invoice ID"),
    ("extraction_number", "Extraction Number"),
    ("concentration_absorbance", "Absorbance"),
    ("a260_280_ratio", "A260/280 ratio"),
    ("a260_230_ratio", "A260/230 ratio"),
    ("concentration_fluorescence", "Fluorescence"),
    ("storage_box", "Storage Box Name"),
    ("storage_well", "Storage Well"),
    ("billing_description", "Billing Description"),
    ("reagent_label", "Reagent Label"),
    ("increased_pooling", "Increased Pooling (%)"),
    ("nird_filename", "NIRD Filename"),
];

const SEQUENCING_RENAMES: &[(&str, &str)] = &[
    ("run_id", "Run ID"),
    ("instrument", "Instrument"),
    ("run_number", "Run Number"),
    ("seq_date", "Seq Date"),
    ("operator", "Operator"),
    ("species", "Species"),
    ("experiment_name", "Experiment Name"),
    ("casette_type", "Casette Type"),
    ("read_length", "Read Length"),
    ("index_cycles", "Index Cycles"),
    ("sample_count", "Sample Count"),
    ("loading_pm", "Loading pM"),
    ("diluted_denatured_ul", "Diluted Denatured (uL)"),
    ("avg_fragment_size", "Avg Fragment Size"),
    ("combined_pool", "Combined Pool"),
    ("phix_loaded_percent", "Phix Loaded (%)"),
    ("phix_aligned_percent", "Phix Aligned (%)"),
    ("cluster_density", "Cluster Density"),
    ("yield_total", "Yield Total"),
    ("qv30_r1", "QV30 R1"),
    ("qv30_r2", "QV30 R2"),
    ("pf_reads", "PF Reads"),
    ("comment", "Comment"),
];

/// Columns of the samples table holding comma separated LIMS ids
pub const LIMSID_LINK_COLUMNS: [&str; 4] = ["seq_limsid", "nd_limsid", "qubit_limsid", "prep_limsid"];

/// Column set of the Saga CSV export
pub const SAGA_COLUMNS: [&str; 5] = [
    "LIMS ID",
    "Sample Name",
    "Species",
    "Project Account",
    "NIRD Filename",
];

/// Column rendered left-aligned; everything else is centered
pub const LEFT_ALIGNED_COLUMN: &str = "Comment";

impl TableKind {
    pub fn all() -> impl Iterator<Item = TableKind> {
        TableKind::iter()
    }

    pub fn slug(&self) -> &'static str {
        match self {
            TableKind::Projects => "projects",
            TableKind::Samples => "samples",
            TableKind::Sequencing => "sequencing",
        }
    }

    pub fn sql_table(&self) -> &'static str {
        match self {
            TableKind::Projects => "projects",
            TableKind::Samples => "samples",
            TableKind::Sequencing => "ilmn_sequencing",
        }
    }

    pub fn date_column(&self) -> &'static str {
        match self {
            TableKind::Projects => "Open Date",
            TableKind::Samples => "Received Date",
            TableKind::Sequencing => "Seq Date",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TableKind::Projects => "Projects",
            TableKind::Samples => "Samples",
            TableKind::Sequencing => "Illumina Sequencing",
        }
    }

    fn renames(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            TableKind::Projects => PROJECT_RENAMES,
            TableKind::Samples => SAMPLE_RENAMES,
            TableKind::Sequencing => SEQUENCING_RENAMES,
        }
    }

    /// Display label of a database column; unknown columns keep their name
    pub fn display_label(&self, db_column: &str) -> String {
        self.renames()
            .iter()
            .find(|(from, _)| *from == db_column)
            .map(|(_, to)| to.to_string())
            .unwrap_or_else(|| db_column.to_string())
    }

    /// Columns whose numeric values are shown rounded to an integer
    pub fn rounded_columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::Sequencing => &["Run Number", "Cluster Density"],
            _ => &[],
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for TableKind {
    type Err = LimsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "projects" => Ok(TableKind::Projects),
            "samples" => Ok(TableKind::Samples),
            "sequencing" | "ilmn_sequencing" => Ok(TableKind::Sequencing),
            _ => Err(LimsError::not_found(format!(
                "Unknown table '{}'. Valid: projects, samples, sequencing",
                s
            ))),
        }
    }
}

/// A single SQLite value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Real(r) => Some(*r),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Null => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Real(r) => serializer.serialize_f64(*r),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// A table cell; `html` marks markup produced by the transforms
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub html: bool,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self { value, html: false }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::new(CellValue::Text(s.into()))
    }

    pub fn html(s: impl Into<String>) -> Self {
        Self {
            value: CellValue::Text(s.into()),
            html: true,
        }
    }

    /// Text without markup, as exported to CSV
    pub fn plain_text(&self) -> String {
        let text = self.value.to_string();
        if !self.html {
            return text;
        }
        let text = text.replace("<br>", "\n");
        html_unescape(&HTML_TAG.replace_all(&text, ""))
    }

    fn matches(&self, needle: &str) -> bool {
        self.plain_text().to_lowercase().contains(needle)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Rows read from one database table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rows where any cell contains `query` (case-insensitive)
    pub fn filter(&self, query: &str) -> Table {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.iter().any(|cell| cell.matches(&needle)))
                .cloned()
                .collect(),
        }
    }

    /// Keep the named columns that exist, in the given order
    ///
    /// Returns the full table when none of them exist.
    pub fn select(&self, names: &[&str]) -> Table {
        let indices: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        if indices.is_empty() {
            return self.clone();
        }
        Table {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Write the table as CSV with markup stripped
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> crate::errors::Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.columns)?;
        for row in &self.rows {
            csv.write_record(row.iter().map(Cell::plain_text))?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> crate::errors::Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| LimsError::serialization(e.to_string()))
    }
}
