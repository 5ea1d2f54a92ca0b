//! Data table pages

use std::fmt::Write;

use crate::data::{Cell, LEFT_ALIGNED_COLUMN, Table, TableKind};
use crate::data::transform::rounded_display;
use crate::utils::html::escape;

pub const PAGE_LENGTH: usize = 200;
pub const LENGTH_MENU: &str = r#"[[200, 500, 1000, 2000, -1], [200, 500, 1000, 2000, "All"]]"#;

fn cell_html(kind: TableKind, column: &str, cell: &Cell) -> String {
    if kind.rounded_columns().contains(&column) {
        if let Some(rounded) = rounded_display(&cell.value) {
            return rounded;
        }
    }
    if cell.html {
        cell.value.to_string()
    } else {
        escape(&cell.value.to_string())
    }
}

/// `<table>` with DataTables options as data attributes
pub fn render_table(kind: TableKind, table: &Table) -> String {
    let mut out = String::new();

    let order = table
        .column_index(kind.date_column())
        .map(|idx| {
            format!(
                r#" data-order-column="{idx}" data-order='[[{idx}, "desc"]]'"#,
                idx = idx
            )
        })
        .unwrap_or_else(|| r#" data-order="[]""#.to_string());

    let _ = write!(
        out,
        r#"<div class="table-wrapper"><table class="data-table" id="{}-table" data-page-length="{}" data-length-menu='{}'{}>"#,
        kind.slug(),
        PAGE_LENGTH,
        LENGTH_MENU,
        order
    );

    out.push_str("<thead><tr>");
    for column in &table.columns {
        let _ = write!(out, "<th>{}</th>", escape(column));
    }
    out.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        out.push_str("<tr>");
        for (column, cell) in table.columns.iter().zip(row) {
            let class = if column == LEFT_ALIGNED_COLUMN {
                r#" class="left-column""#
            } else {
                ""
            };
            let _ = write!(out, "<td{}>{}</td>", class, cell_html(kind, column, cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></div>");
    out
}

/// Search box, export links and the table
pub fn render_table_body(kind: TableKind, table: &Table, query: &str, total: usize) -> String {
    let export = format!("/api/v1/tables/{}/export.csv", kind.slug());
    let mut toolbar = format!(
        r#"<div class="toolbar"><form method="get" action="/{slug}" class="inline-form"><input type="search" name="q" value="{q}" placeholder="Filter rows"><button type="submit" class="btn">Filter</button></form><a class="btn btn-secondary" href="{export}{qs}">Download CSV</a>"#,
        slug = kind.slug(),
        q = escape(query),
        export = export,
        qs = if query.is_empty() {
            String::new()
        } else {
            format!("?q={}", urlencoding::encode(query))
        },
    );
    if kind == TableKind::Samples {
        let _ = write!(
            toolbar,
            r#"<a class="btn btn-secondary" href="{}?preset=saga">Saga export</a>"#,
            export
        );
    }
    let _ = write!(
        toolbar,
        r#"<span class="row-count">{} of {} rows</span></div>"#,
        table.len(),
        total
    );

    toolbar + &render_table(kind, table)
}
