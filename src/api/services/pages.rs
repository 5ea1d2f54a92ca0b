//! HTML table pages and the refresh action

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::Deserialize;
use tracing::{trace, warn};

use crate::api::AppState;
use crate::api::views::{NavItem, render_page, table::render_table_body};
use crate::data::TableKind;

pub const DEFAULT_PAGE: &str = "/projects";

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn index() -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, DEFAULT_PAGE))
        .finish()
}

pub async fn table_page(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    let kind: TableKind = match path.parse() {
        Ok(kind) => kind,
        Err(_) => return HttpResponse::NotFound().body("Page not found"),
    };
    trace!("Rendering {} page (q={:?})", kind, query.q);

    let snapshot = state.store.snapshot();
    let full = snapshot.table(kind);
    let visible = full.filter(&query.q);

    let body = render_table_body(kind, &visible, &query.q, full.len());
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_page(&state, NavItem::Table(kind), kind.title(), &body))
}

/// Path and query of a same-site `Referer`
fn redirect_target(req: &HttpRequest) -> String {
    let referer = req
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok());

    let Some(referer) = referer else {
        return DEFAULT_PAGE.to_string();
    };
    if referer.starts_with('/') && !referer.starts_with("//") {
        return referer.to_string();
    }

    let host = req.connection_info().host().to_string();
    match url::Url::parse(referer) {
        Ok(url) if url.host_str().is_some_and(|h| host.split(':').next() == Some(h)) => {
            match url.query() {
                Some(q) => format!("{}?{}", url.path(), q),
                None => url.path().to_string(),
            }
        }
        _ => DEFAULT_PAGE.to_string(),
    }
}

/// Download the pin again and reload the tables
///
/// A failed reload keeps the old data; the layout shows the error.
pub async fn refresh(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Err(e) = state.store.refresh().await {
        warn!("Manual refresh failed: {}", e);
    }
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, redirect_target(&req)))
        .finish()
}

pub fn page_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/refresh", web::post().to(refresh))
        .route(
            "/{kind:projects|samples|sequencing}",
            web::get().to(table_page),
        );
}
