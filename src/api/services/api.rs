//! JSON API under `/api/v1`

use actix_web::{HttpResponse, http::header, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::pages::SearchQuery;
use crate::api::AppState;
use crate::api::helpers::{
    ErrorCode, api_result, error_from_lims, error_response, success_response,
};
use crate::data::{CellValue, FormattedUpdateInfo, SAGA_COLUMNS, Table, TableKind, UpdateInfo};

#[derive(Debug, Serialize)]
pub struct TableResponse<'a> {
    pub kind: TableKind,
    pub title: &'static str,
    pub columns: &'a [String],
    pub rows: Vec<Vec<CellValue>>,
    pub total: usize,
    pub loaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateInfoResponse<'a> {
    #[serde(flatten)]
    pub info: &'a UpdateInfo,
    pub formatted: FormattedUpdateInfo,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub q: String,
    pub preset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub reagent_type: String,
    pub set_letter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub internal_name: String,
}

fn parse_kind(raw: &str) -> Result<TableKind, HttpResponse> {
    raw.parse::<TableKind>().map_err(|e| error_from_lims(&e))
}

pub async fn get_table(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    let kind = match parse_kind(&path) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    let snapshot = state.store.snapshot();
    let full = snapshot.table(kind);
    let visible = full.filter(&query.q);

    success_response(TableResponse {
        kind,
        title: kind.title(),
        columns: &visible.columns,
        rows: visible
            .rows
            .iter()
            .map(|row| row.iter().map(|c| c.value.clone()).collect())
            .collect(),
        total: full.len(),
        loaded_at: snapshot.loaded_at.to_rfc3339(),
    })
}

/// Columns exported for a preset; unknown presets are rejected
fn export_table(table: &Table, preset: Option<&str>) -> Result<Table, HttpResponse> {
    match preset.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(table.clone()),
        Some(p) if p.eq_ignore_ascii_case("saga") => Ok(table.select(&SAGA_COLUMNS)),
        Some(other) => Err(error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &format!("Unknown export preset '{}'", other),
        )),
    }
}

pub async fn export_csv(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
) -> HttpResponse {
    let kind = match parse_kind(&path) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    let snapshot = state.store.snapshot();
    let table = match export_table(&snapshot.table(kind).filter(&query.q), query.preset.as_deref()) {
        Ok(table) => table,
        Err(resp) => return resp,
    };

    match table.to_csv_string() {
        Ok(csv) => {
            let filename = match query.preset.as_deref() {
                Some(preset) if !preset.trim().is_empty() => format!(
                    "{}_{}_{}.csv",
                    kind.slug(),
                    preset.trim().to_lowercase(),
                    Local::now().format("%Y%m%d")
                ),
                _ => format!("{}_{}.csv", kind.slug(), Local::now().format("%Y%m%d")),
            };
            debug!("Exporting {} rows to {}", table.len(), filename);
            HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .append_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ))
                .body(csv)
        }
        Err(e) => {
            error!("CSV export of {} failed: {}", kind, e);
            error_from_lims(&e)
        }
    }
}

pub async fn update_info(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.store.snapshot();
    success_response(UpdateInfoResponse {
        info: &snapshot.update_info,
        formatted: snapshot.update_info.formatted(snapshot.loaded_at),
    })
}

pub async fn reagent_preview(
    state: web::Data<AppState>,
    query: web::Query<PreviewQuery>,
) -> HttpResponse {
    api_result(
        state
            .reagents
            .preview(&query.reagent_type, query.set_letter.as_deref())
            .map(|internal_name| PreviewResponse { internal_name }),
    )
}

pub fn api_routes() -> actix_web::Scope {
    web::scope("/api/v1")
        .route("/tables/{kind}", web::get().to(get_table))
        .route("/tables/{kind}/export.csv", web::get().to(export_csv))
        .route("/update-info", web::get().to(update_info))
        .route("/reagents/preview", web::get().to(reagent_preview))
}
