//! Shaping of raw database rows into display tables

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::tables::{Cell, CellValue, LIMSID_LINK_COLUMNS, Table, TableKind};
use crate::utils::html::escape;

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parse a date the way the LIMS exports write them
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// `YYYY-MM-DD`, or empty when the value is not a date
pub fn normalize_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Turn comma separated `XX-NNN` ids into links to the Clarity UI
///
/// Ids that do not split into exactly two parts are kept as text.
pub fn limsid_links(raw: &str, ui_url: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let base = ui_url.trim_end_matches('/');
    raw.split(',')
        .map(str::trim)
        .map(|id| {
            let parts: Vec<&str> = id.split('-').collect();
            if parts.len() == 2 {
                format!(
                    r#"<a href="{}/work-complete/{}" target="_blank">{}</a>"#,
                    base,
                    escape(parts[1]),
                    escape(id)
                )
            } else {
                escape(id)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Line breaks in comments become `<br>`
pub fn comment_to_html(raw: &str) -> String {
    escape(raw).replace('\n', "<br>")
}

/// Apply the per-table shaping to rows read from the database
///
/// `columns` are database column names; the result carries display labels.
pub fn shape_table(kind: TableKind, columns: &[String], rows: Vec<Vec<CellValue>>, ui_url: &str) -> Table {
    let labels: Vec<String> = columns.iter().map(|c| kind.display_label(c)).collect();
    let date_idx = labels.iter().position(|l| l == kind.date_column());

    let link_cols: Vec<bool> = columns
        .iter()
        .map(|c| kind == TableKind::Samples && LIMSID_LINK_COLUMNS.contains(&c.as_str()))
        .collect();
    let comment_cols: Vec<bool> = labels
        .iter()
        .map(|l| l.to_lowercase().contains("comment"))
        .collect();

    let mut shaped: Vec<Vec<Cell>> = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(i, value)| {
                    let value = match value {
                        CellValue::Null => CellValue::Text(String::new()),
                        other => other,
                    };

                    if Some(i) == date_idx {
                        return Cell::text(normalize_date(&value.to_string()));
                    }
                    match value {
                        CellValue::Text(s) if link_cols[i] && !s.is_empty() => {
                            Cell::html(limsid_links(&s, ui_url))
                        }
                        CellValue::Text(s) if comment_cols[i] && !s.is_empty() => {
                            Cell::html(comment_to_html(&s))
                        }
                        other => Cell::new(other),
                    }
                })
                .collect()
        })
        .collect();

    if let Some(idx) = date_idx {
        sort_by_date_desc(&mut shaped, idx);
    }

    Table::new(labels, shaped)
}

/// Newest first; rows without a date go last, keeping their order
pub fn sort_by_date_desc(rows: &mut [Vec<Cell>], date_idx: usize) {
    rows.sort_by(|a, b| {
        let a = a.get(date_idx).map(|c| c.value.to_string()).unwrap_or_default();
        let b = b.get(date_idx).map(|c| c.value.to_string()).unwrap_or_default();
        match (a.is_empty(), b.is_empty()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => b.cmp(&a),
        }
    });
}

/// Display text of a numeric cell in a rounded column
pub fn rounded_display(value: &CellValue) -> Option<String> {
    value.as_f64().map(|v| format!("{}", v.round() as i64))
}
